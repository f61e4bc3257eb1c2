use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, List, ListItem, Padding, Paragraph},
};

use crate::app::{App, AppMode, FilterDimension};
use crate::browse::ListingStatus;
use crate::catalog::{MediaKind, MediaRecord};
use crate::constants::constants;
use crate::filter::LocalField;
use crate::format::{format_date, format_duration, format_view_count};
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded_block<'a>(theme: &Theme, title: impl Into<Line<'a>>, focused: bool) -> Block<'a> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered()
    .title(title)
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(color))
}

/// Date and view count shown after the speaker on a listing row.
fn row_meta(record: &MediaRecord) -> String {
  let mut parts = vec![format_date(&record.date)];
  if let Some(views) = record.views {
    parts.push(format!("{} views", format_view_count(views)));
  }
  parts.join("  ")
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, bar_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_filter_bar(frame, app, bar_area);
  match app.mode {
    AppMode::Detail => render_detail(frame, app, main_area),
    AppMode::Stats => render_stats(frame, app, main_area),
    AppMode::Series | AppMode::Categories => render_cards(frame, app, main_area),
    AppMode::Sidebar => {
      let [sidebar_area, list_area] =
        Layout::horizontal([Constraint::Percentage(34), Constraint::Percentage(66)]).areas(main_area);
      render_sidebar(frame, app, sidebar_area);
      render_listing(frame, app, list_area);
    }
    AppMode::Browse | AppMode::Search => render_listing(frame, app, main_area),
  }
  render_status(frame, app, status_area);
  render_search(frame, app, input_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let mut spans = vec![Span::styled(" ✝ pew ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))];
  for kind in MediaKind::ALL {
    let style = if kind == app.kind {
      Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.muted)
    };
    spans.push(Span::raw(" "));
    spans.push(Span::styled(format!(" {} ", kind.label()), style));
  }
  frame.render_widget(Line::from(spans), area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

/// Single-choice filters: `Year: 1995 · Location: All · …`.
fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let local = app.browse.local();
  let mut spans = vec![Span::styled(" Filters ", Style::default().fg(theme.muted))];
  for (field, key) in LocalField::ALL.into_iter().zip(["y", "l", "p", "n"]) {
    let (value, style) = match local.get(field) {
      Some(v) => (v, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
      None => ("All".to_string(), Style::default().fg(theme.fg)),
    };
    spans.push(Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)));
    spans.push(Span::styled(format!(" {}: ", field.label()), Style::default().fg(theme.muted)));
    spans.push(Span::styled(value, style));
    spans.push(Span::raw(" "));
  }
  frame.render_widget(Line::from(spans), area);
}

fn render_listing(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let browse = &app.browse;
  let status = browse.status();
  let sort_label = browse.sort().map_or("Catalog order", |k| k.label());
  let suffix = if status == ListingStatus::LoadingMore { " (loading more…)" } else { "" };
  let query = if browse.query().is_empty() { String::new() } else { format!(" · “{}”", browse.query()) };
  let title = format!(
    " {} · {} of {} · {}{}{} ",
    app.kind.label(),
    browse.visible().len(),
    browse.total(),
    sort_label,
    query,
    suffix
  );
  let block = rounded_block(theme, title, matches!(app.mode, AppMode::Browse | AppMode::Search));

  if status == ListingStatus::Empty {
    let text = vec![
      Line::from(""),
      Line::from(Span::styled("No recordings match", Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))),
      Line::from(""),
      Line::from(Span::styled("Press c to clear filters and search.", Style::default().fg(theme.muted))),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
    return;
  }

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;
  let selected = app.list_state.selected();

  let mut items: Vec<ListItem> = browse
    .visible()
    .iter()
    .enumerate()
    .map(|(i, record)| {
      let is_selected = Some(i) == selected;
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let speaker = &record.speaker;
      let meta = row_meta(record);
      let right_w = speaker.chars().count() + 2 + meta.chars().count();
      let title_max = inner_w.saturating_sub(right_w + 2);
      let title = truncate_str(&record.title, title_max.max(8));
      let gap = inner_w.saturating_sub(title.chars().count() + right_w);

      let line = Line::from(vec![
        Span::styled(title, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(speaker.clone(), Style::default().fg(theme.muted)),
        Span::raw("  "),
        Span::styled(meta, Style::default().fg(theme.muted)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  if status == ListingStatus::LoadingMore {
    let bar = "░".repeat(inner_w.saturating_sub(2).min(48));
    for _ in 0..constants().skeleton_rows {
      items.push(ListItem::new(Line::from(Span::styled(bar.clone(), Style::default().fg(theme.border)))));
    }
  }

  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let active = app.browse.selection().active_count();
  let title = if active > 0 { format!(" Filters ({}) ", active) } else { " Filters ".to_string() };
  let inner_w = area.width.saturating_sub(8) as usize;

  let items: Vec<ListItem> = app
    .sidebar
    .iter()
    .map(|entry| {
      let mark = if app.is_checked(entry) { "[x] " } else { "[ ] " };
      let tag = match entry.dimension {
        FilterDimension::Category => Span::styled("", Style::default()),
        FilterDimension::Series => Span::styled("≡ ", Style::default().fg(theme.muted)),
      };
      ListItem::new(Line::from(vec![
        Span::styled(mark, Style::default().fg(theme.accent)),
        tag,
        Span::styled(truncate_str(&entry.label, inner_w), Style::default().fg(theme.fg)),
      ]))
    })
    .collect();

  let list = List::new(items)
    .block(rounded_block(theme, title, app.mode == AppMode::Sidebar))
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg));

  frame.render_stateful_widget(list, area, &mut app.sidebar_state);
}

fn render_detail(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let [info_area, related_area] =
    Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)]).areas(area);

  let info_block = rounded_block(theme, " Recording ", true).padding(Padding::horizontal(1));
  let Some(record) = app.detail_record() else {
    frame.render_widget(info_block, info_area);
    return;
  };

  let inner_w = info_area.width.saturating_sub(4) as usize;
  let field = |label: &'static str, value: String| {
    Line::from(vec![
      Span::styled(format!("{:<10}", label), Style::default().fg(theme.muted)),
      Span::styled(truncate_str(&value, inner_w.saturating_sub(10)), Style::default().fg(theme.fg)),
    ])
  };

  let mut lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      truncate_str(&record.title, inner_w),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    field("Speaker", record.speaker.clone()),
    field("Category", record.category.clone()),
  ];
  if let Some(series) = &record.series {
    lines.push(field("Series", series.clone()));
  }
  lines.push(field("Date", format_date(&record.date)));
  if let Some(duration) = record.duration {
    lines.push(field("Duration", format_duration(duration)));
  }
  if let Some(views) = record.views {
    lines.push(field("Views", format_view_count(views)));
  }
  if let Some(language) = &record.language {
    lines.push(field("Language", language.clone()));
  }
  if let Some(location) = &record.location {
    lines.push(field("Location", location.clone()));
  }
  if !record.tags.is_empty() {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      truncate_str(&record.tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" "), inner_w),
      Style::default().fg(theme.accent),
    )));
  }
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(record.id.clone(), Style::default().fg(theme.muted))));
  frame.render_widget(Paragraph::new(lines).block(info_block), info_area);

  let related_w = related_area.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> = app
    .related()
    .iter()
    .map(|r| {
      ListItem::new(vec![
        Line::from(Span::styled(truncate_str(&r.title, related_w), Style::default().fg(theme.fg))),
        Line::from(Span::styled(
          truncate_str(&format!("{} · {}", r.speaker, format_date(&r.date)), related_w),
          Style::default().fg(theme.muted),
        )),
      ])
    })
    .collect();
  let list = List::new(items)
    .block(rounded_block(theme, " Related ", false))
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg));
  frame.render_stateful_widget(list, related_area, &mut app.related_state);
}

/// Series or category cards, each with its aggregate numbers.
fn render_cards(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let inner_w = area.width.saturating_sub(4) as usize;
  let card = |name: &str, detail: String| {
    ListItem::new(vec![
      Line::from(Span::styled(truncate_str(name, inner_w), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))),
      Line::from(Span::styled(truncate_str(&detail, inner_w), Style::default().fg(theme.muted))),
    ])
  };

  let (title, items): (String, Vec<ListItem>) = if app.mode == AppMode::Series {
    let items = app
      .series_cards
      .iter()
      .map(|s| {
        let since = s.first_year.map(|y| format!(" · since {}", y)).unwrap_or_default();
        card(
          &s.name,
          format!(
            "{} · {} episodes · {} views · {} speakers{}",
            s.category,
            s.episodes,
            format_view_count(s.total_views),
            s.speakers.len(),
            since
          ),
        )
      })
      .collect();
    (format!(" Series · {} ", app.series_cards.len()), items)
  } else {
    let items = app
      .category_cards
      .iter()
      .map(|c| {
        card(
          &c.name,
          format!("{} recordings · {} series · {} views", c.recordings, c.series_count, format_view_count(c.total_views)),
        )
      })
      .collect();
    (format!(" Categories · {} ", app.category_cards.len()), items)
  };

  if items.is_empty() {
    let text = Line::from(Span::styled("Nothing matches the current filters", Style::default().fg(theme.muted)));
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(rounded_block(theme, title, true)), area);
    return;
  }

  let list = List::new(items)
    .block(rounded_block(theme, title, true))
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg));
  frame.render_stateful_widget(list, area, &mut app.cards_state);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let stats = &app.stats;
  let [left, right] = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

  let heading = |text: &'static str| {
    Line::from(Span::styled(text, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
  };
  let row = |label: String, value: String| {
    Line::from(vec![
      Span::styled(format!("{:<14}", label), Style::default().fg(theme.muted)),
      Span::styled(value, Style::default().fg(theme.fg)),
    ])
  };

  let mut lines = vec![
    heading("Archive"),
    row("Videos".to_string(), stats.videos.to_string()),
    row("Audio".to_string(), stats.audios.to_string()),
    row("Total views".to_string(), format_view_count(stats.total_views)),
    row("Series".to_string(), stats.series.to_string()),
    row("Categories".to_string(), stats.categories.to_string()),
    row("Speakers".to_string(), stats.speakers.to_string()),
    Line::from(""),
    heading("By year (video / audio)"),
  ];
  for (year, (videos, audios)) in stats.per_year.iter().rev() {
    lines.push(row(year.to_string(), format!("{} / {}", videos, audios)));
  }
  frame.render_widget(
    Paragraph::new(lines).block(rounded_block(theme, " Statistics ", true).padding(Padding::horizontal(1))),
    left,
  );

  let bar_max = right.width.saturating_sub(28).max(4) as usize;
  let largest = stats.category_distribution.iter().map(|(_, n)| *n).max().unwrap_or(1).max(1);
  let mut lines = vec![heading("Categories")];
  for (name, count) in &stats.category_distribution {
    let bar = "█".repeat((count * bar_max).div_ceil(largest));
    lines.push(Line::from(vec![
      Span::styled(format!("{:<18}", truncate_str(name, 17)), Style::default().fg(theme.muted)),
      Span::styled(bar, Style::default().fg(theme.accent)),
      Span::styled(format!(" {}", count), Style::default().fg(theme.fg)),
    ]));
  }
  lines.push(Line::from(""));
  lines.push(heading("Top series"));
  for series in &stats.top_series {
    lines.push(row(
      truncate_str(&series.name, 13),
      format!("{} episodes · {} views", series.episodes, format_view_count(series.total_views)),
    ));
  }
  lines.push(Line::from(""));
  lines.push(heading("Most recent"));
  let recent_w = right.width.saturating_sub(6) as usize;
  for record in &stats.recent {
    lines.push(Line::from(Span::styled(
      truncate_str(&format!("{}  {}", format_date(&record.date), record.title), recent_w),
      Style::default().fg(theme.fg),
    )));
  }
  frame.render_widget(
    Paragraph::new(lines).block(rounded_block(theme, " Highlights ", false).padding(Padding::horizontal(1))),
    right,
  );
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if app.browse.is_loading() {
    (" ⏳ Loading more recordings…".to_string(), Style::default().fg(theme.status))
  } else if let Some(msg) = &app.info_message {
    (format!(" ℹ {}", msg), Style::default().fg(theme.status))
  } else {
    let filters = app.browse.active_filters();
    let mut text = format!(" {} recordings", app.browse.total());
    if filters > 0 {
      text.push_str(&format!(" · {} filters", filters));
    }
    if app.browse.has_more() {
      text.push_str(&format!(" · m for {} more", app.browse.next_page_len()));
    }
    (text, Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_search(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.mode == AppMode::Search;
  let border_color = if focused { theme.accent } else { theme.border };
  let input_block = Block::bordered()
    .title(" Search ")
    .title_style(Style::default().fg(border_color))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.search_input, app.search_cursor);

  if cursor_col < app.search_scroll {
    app.search_scroll = cursor_col;
  } else if cursor_col >= app.search_scroll + inner_w {
    app.search_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .search_input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.search_scroll)
    .take_while(|(start, _, _)| *start < app.search_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  if focused {
    let cursor_x = area.x + 2 + (cursor_col - app.search_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let mut keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Browse => vec![
      ("j/k", "Navigate"),
      ("Enter", "Details"),
      ("m", "More"),
      ("s", "Sort"),
      ("Tab", "Video/Audio"),
      ("f", "Sidebar"),
      ("2/3", "Series/Categories"),
      ("/", "Search"),
      ("i", "Stats"),
      ("q", "Quit"),
    ],
    AppMode::Sidebar => vec![("j/k", "Navigate"), ("Space", "Toggle"), ("c", "Clear"), ("Esc", "Back")],
    AppMode::Search => vec![("Enter", "Apply"), ("↑/↓", "Navigate"), ("Esc", "Clear")],
    AppMode::Detail => vec![("j/k", "Related"), ("Enter", "Open"), ("Esc", "Back")],
    AppMode::Stats => vec![("Esc", "Back")],
    AppMode::Series | AppMode::Categories => {
      vec![("j/k", "Navigate"), ("Enter", "Filter"), ("2/3", "Series/Categories"), ("Esc", "Back")]
    }
  };
  keys.push(("^t", "Theme"));

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw(" "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::app::tests::make_app;
  use ratatui::{Terminal, backend::TestBackend};

  fn draw(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
    terminal.draw(|frame| ui(frame, app)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    buffer.content.iter().map(|cell| cell.symbol()).collect()
  }

  #[test]
  fn truncate_appends_ellipsis() {
    assert_eq!(truncate_str("short", 10), "short");
    assert_eq!(truncate_str("a longer title", 6), "a lon…");
  }

  #[test]
  fn display_width_counts_wide_chars() {
    assert_eq!(display_width("abc", 2), 2);
    assert_eq!(display_width("日本", 2), 4);
  }

  #[test]
  fn renders_listing_title() {
    let mut app = make_app();
    let screen = draw(&mut app);
    assert!(screen.contains("Videos · 12 of 50"));
  }

  #[test]
  fn renders_empty_state() {
    let mut app = make_app();
    app.search_input = "zzqx".to_string();
    app.apply_search();
    let screen = draw(&mut app);
    assert!(screen.contains("No recordings match"));
  }

  #[test]
  fn renders_filter_bar_and_query() {
    let mut app = make_app();
    assert!(draw(&mut app).contains("Year: All"));
    app.cycle_local(LocalField::Year);
    let year = app.browse.local().get(LocalField::Year).unwrap();
    app.search_input = "faith".to_string();
    app.apply_search();
    let screen = draw(&mut app);
    assert!(screen.contains(&format!("Year: {}", year)));
    assert!(screen.contains("“faith”"));
  }

  #[test]
  fn renders_series_cards() {
    let mut app = make_app();
    app.open_series_cards();
    let name = app.series_cards[0].name.clone();
    let screen = draw(&mut app);
    assert!(screen.contains(&format!("Series · {}", app.series_cards.len())));
    assert!(screen.contains(&name));
    app.open_category_cards();
    assert!(draw(&mut app).contains("Categories ·"));
  }

  #[test]
  fn renders_every_mode() {
    let mut app = make_app();
    for mode in [AppMode::Sidebar, AppMode::Search, AppMode::Stats] {
      app.mode = mode;
      draw(&mut app);
    }
    app.mode = AppMode::Browse;
    app.open_detail();
    let screen = draw(&mut app);
    assert!(screen.contains("Related"));
  }
}
