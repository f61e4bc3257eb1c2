use anyhow::Result;
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::browse::Browse;
use crate::catalog::{ArchiveStats, Catalog, CategorySummary, MediaKind, MediaRecord, SeriesSummary};
use crate::config::Config;
use crate::constants::constants;
use crate::filter::{LocalField, filter_categories, filter_records};
use crate::sort::SortKey;
use crate::theme::{THEMES, Theme};

// --- Types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Browse,
  Sidebar,
  Search,
  Detail,
  Stats,
  /// Series cards for the current archive, narrowed by the sidebar.
  Series,
  /// Category cards for the current archive, narrowed by the sidebar.
  Categories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDimension {
  Category,
  Series,
}

/// One checkable row of the filter sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
  pub dimension: FilterDimension,
  pub label: String,
}

/// Startup choices from the command line. `None` defers to saved preferences.
#[derive(Debug, Clone)]
pub struct Launch {
  pub kind: Option<MediaKind>,
  pub sort: Option<String>,
  pub query: Option<String>,
  pub page_size: usize,
  pub loading_delay: Duration,
}

/// Command-line sort name first, then the saved preference, then newest first.
/// An unrecognized name leaves the listing in catalog order.
pub fn resolve_sort(cli: Option<&str>, saved: Option<SortKey>) -> Option<SortKey> {
  match cli {
    Some(name) => {
      let key = SortKey::parse(name);
      if key.is_none() {
        warn!(sort = %name, "app: unknown sort key, keeping catalog order");
      }
      key
    }
    None => Some(saved.unwrap_or(SortKey::Newest)),
  }
}

pub struct App {
  pub catalog: Catalog,
  pub kind: MediaKind,
  pub browse: Browse,
  pub mode: AppMode,
  pub theme_index: usize,
  pub list_state: ListState,
  pub sidebar: Vec<SidebarEntry>,
  pub sidebar_state: ListState,
  /// Search box contents; applied to the listing on every keystroke.
  pub search_input: String,
  /// Cursor position within the search box (char index).
  pub search_cursor: usize,
  /// Horizontal scroll offset for the search box.
  pub search_scroll: usize,
  /// Record shown in the detail pane.
  pub detail_id: Option<String>,
  pub related_state: ListState,
  pub series_cards: Vec<SeriesSummary>,
  pub category_cards: Vec<CategorySummary>,
  pub cards_state: ListState,
  pub stats: ArchiveStats,
  pub last_error: Option<String>,
  /// Informational message, lower priority than errors.
  pub info_message: Option<String>,
  pub should_quit: bool,
  /// When the last error was set, used for auto-dismiss after 5 seconds.
  error_time: Option<Instant>,
  persist_prefs: bool,
}

impl App {
  pub fn new(catalog: Catalog, config: Config, launch: Launch) -> Self {
    let theme_index =
      if let Some(ref name) = config.theme_name { THEMES.iter().position(|t| t.name == name).unwrap_or(0) } else { 0 };
    let kind = launch.kind.or(config.kind).unwrap_or(MediaKind::Video);
    let sort = resolve_sort(launch.sort.as_deref(), config.sort);
    let c = constants();
    let stats = catalog.stats(c.stats_top_series, c.stats_recent);
    let browse = Browse::new(catalog.by_kind(kind), sort, launch.page_size, launch.loading_delay);
    info!(kind = kind.label(), records = browse.total(), "app: started");

    let mut app = Self {
      catalog,
      kind,
      browse,
      mode: AppMode::Browse,
      theme_index,
      list_state: ListState::default(),
      sidebar: Vec::new(),
      sidebar_state: ListState::default(),
      search_input: String::new(),
      search_cursor: 0,
      search_scroll: 0,
      detail_id: None,
      related_state: ListState::default(),
      series_cards: Vec::new(),
      category_cards: Vec::new(),
      cards_state: ListState::default(),
      stats,
      last_error: None,
      info_message: None,
      should_quit: false,
      error_time: None,
      persist_prefs: true,
    };
    if let Some(query) = launch.query {
      app.search_cursor = query.chars().count();
      app.search_input = query;
      app.browse.set_query(&app.search_input);
    }
    app.rebuild_sidebar();
    app.listing_changed();
    app
  }

  pub fn theme(&self) -> &'static Theme {
    // Safety: theme_index is bounded by modular arithmetic in next_theme()
    // and by position() on initialization.
    &THEMES[self.theme_index]
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after 5 seconds.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(5)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  fn save_config(&mut self) {
    if !self.persist_prefs {
      return;
    }
    let config =
      Config { theme_name: Some(self.theme().name.to_string()), sort: self.browse.sort(), kind: Some(self.kind) };
    if let Err(e) = config.save() {
      warn!(err = %e, "config: failed to save preferences");
      self.set_error(format!("Preferences not saved: {:#}", e));
    }
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  // --- Listing ---

  /// Put the cursor back on the first row after the listing was rebuilt.
  fn listing_changed(&mut self) {
    self.list_state.select(if self.browse.visible().is_empty() { None } else { Some(0) });
  }

  pub fn selected_record(&self) -> Option<&MediaRecord> {
    self.list_state.selected().and_then(|i| self.browse.visible().get(i))
  }

  pub fn move_down(&mut self) {
    let count = self.browse.visible().len();
    if count == 0 {
      return;
    }
    let i = self.list_state.selected().map_or(0, |i| (i + 1) % count);
    self.list_state.select(Some(i));
    // Nearing the end of the window is the signal to load the next page.
    if i + constants().proximity_rows >= count && self.browse.request_more() {
      debug!(row = i, shown = count, "app: proximity load");
    }
  }

  pub fn move_up(&mut self) {
    let count = self.browse.visible().len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| if i == 0 { count.saturating_sub(1) } else { i - 1 });
      self.list_state.select(Some(i));
    }
  }

  /// Explicit "load more".
  pub fn load_more(&mut self) {
    if self.browse.is_loading() {
      return;
    }
    if !self.browse.request_more() {
      self.info_message = Some(format!("All {} recordings shown", self.browse.total()));
    }
  }

  pub fn cycle_sort(&mut self) {
    self.browse.cycle_sort();
    self.listing_changed();
    self.save_config();
  }

  /// Switch between the video and audio archives. Filters belong to one
  /// archive, so they are dropped.
  pub fn switch_kind(&mut self) {
    self.kind = self.kind.toggle();
    info!(kind = self.kind.label(), "app: switched archive");
    self.browse.set_selection(Default::default());
    for field in LocalField::ALL {
      self.browse.set_local(field, None);
    }
    self.browse.set_records(self.catalog.by_kind(self.kind));
    self.rebuild_sidebar();
    self.listing_changed();
    self.save_config();
  }

  // --- Sidebar ---

  fn rebuild_sidebar(&mut self) {
    let categories = self.catalog.unique_categories(Some(self.kind));
    let series = self.catalog.unique_series(Some(self.kind));
    self.sidebar = categories
      .into_iter()
      .map(|label| SidebarEntry { dimension: FilterDimension::Category, label })
      .chain(series.into_iter().map(|label| SidebarEntry { dimension: FilterDimension::Series, label }))
      .collect();
    self.sidebar_state.select(if self.sidebar.is_empty() { None } else { Some(0) });
  }

  pub fn is_checked(&self, entry: &SidebarEntry) -> bool {
    let selection = self.browse.selection();
    match entry.dimension {
      FilterDimension::Category => selection.categories.contains(&entry.label),
      FilterDimension::Series => selection.series.contains(&entry.label),
    }
  }

  pub fn sidebar_down(&mut self) {
    let count = self.sidebar.len();
    if count > 0 {
      let i = self.sidebar_state.selected().map_or(0, |i| (i + 1) % count);
      self.sidebar_state.select(Some(i));
    }
  }

  pub fn sidebar_up(&mut self) {
    let count = self.sidebar.len();
    if count > 0 {
      let i = self.sidebar_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.sidebar_state.select(Some(i));
    }
  }

  /// Tick or untick the highlighted sidebar label.
  pub fn toggle_sidebar_entry(&mut self) {
    let Some(entry) = self.sidebar_state.selected().and_then(|i| self.sidebar.get(i)).cloned() else { return };
    match entry.dimension {
      FilterDimension::Category => self.browse.toggle_category(&entry.label),
      FilterDimension::Series => self.browse.toggle_series(&entry.label),
    }
    self.listing_changed();
  }

  pub fn clear_filters(&mut self) {
    self.browse.clear_filters();
    self.search_input.clear();
    self.search_cursor = 0;
    self.search_scroll = 0;
    self.listing_changed();
  }

  // --- Filter bar ---

  /// Step `field` to its next choice for the current archive; past the last
  /// choice it returns to "all".
  pub fn cycle_local(&mut self, field: LocalField) {
    let options = self.catalog.local_options(field, Some(self.kind));
    let current = self.browse.local().get(field);
    let next = match current.and_then(|c| options.iter().position(|o| *o == c)) {
      Some(i) => options.get(i + 1),
      None => options.first(),
    };
    self.browse.set_local(field, next.map(String::as_str));
    self.listing_changed();
  }

  // --- Series and category cards ---

  pub fn open_series_cards(&mut self) {
    self.series_cards = filter_records(&self.catalog.series_summaries(Some(self.kind)), self.browse.selection());
    self.cards_state.select(if self.series_cards.is_empty() { None } else { Some(0) });
    self.mode = AppMode::Series;
  }

  pub fn open_category_cards(&mut self) {
    let series = self.catalog.series_summaries(Some(self.kind));
    self.category_cards =
      filter_categories(&self.catalog.category_summaries(Some(self.kind)), &series, self.browse.selection());
    self.cards_state.select(if self.category_cards.is_empty() { None } else { Some(0) });
    self.mode = AppMode::Categories;
  }

  fn card_count(&self) -> usize {
    match self.mode {
      AppMode::Series => self.series_cards.len(),
      AppMode::Categories => self.category_cards.len(),
      _ => 0,
    }
  }

  pub fn cards_down(&mut self) {
    let count = self.card_count();
    if count > 0 {
      let i = self.cards_state.selected().map_or(0, |i| (i + 1) % count);
      self.cards_state.select(Some(i));
    }
  }

  pub fn cards_up(&mut self) {
    let count = self.card_count();
    if count > 0 {
      let i = self.cards_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.cards_state.select(Some(i));
    }
  }

  /// Filter the listing by the highlighted card and go back to it.
  pub fn select_card(&mut self) {
    let Some(i) = self.cards_state.selected() else { return };
    match self.mode {
      AppMode::Series => {
        let Some(name) = self.series_cards.get(i).map(|s| s.name.clone()) else { return };
        self.browse.select_series(&name);
      }
      AppMode::Categories => {
        let Some(name) = self.category_cards.get(i).map(|c| c.name.clone()) else { return };
        self.browse.select_category(&name);
      }
      _ => return,
    }
    self.listing_changed();
    self.mode = AppMode::Browse;
  }

  // --- Search ---

  pub fn apply_search(&mut self) {
    self.browse.set_query(&self.search_input);
    self.listing_changed();
  }

  // --- Detail ---

  pub fn open_detail(&mut self) {
    let Some(id) = self.selected_record().map(|r| r.id.clone()) else { return };
    debug!(id = %id, "app: open detail");
    self.detail_id = Some(id);
    self.related_state.select(Some(0));
    self.mode = AppMode::Detail;
  }

  pub fn detail_record(&self) -> Option<&MediaRecord> {
    self.detail_id.as_deref().and_then(|id| self.catalog.by_id(id))
  }

  pub fn related(&self) -> Vec<&MediaRecord> {
    match self.detail_id.as_deref() {
      Some(id) => self.catalog.related(id, constants().related_limit),
      None => Vec::new(),
    }
  }

  pub fn related_down(&mut self) {
    let count = self.related().len();
    if count > 0 {
      let i = self.related_state.selected().map_or(0, |i| (i + 1) % count);
      self.related_state.select(Some(i));
    }
  }

  pub fn related_up(&mut self) {
    let count = self.related().len();
    if count > 0 {
      let i = self.related_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.related_state.select(Some(i));
    }
  }

  /// Follow the highlighted related record.
  pub fn open_related(&mut self) {
    let related = self.related();
    let Some(next) = self.related_state.selected().and_then(|i| related.get(i)).map(|r| r.id.clone()) else { return };
    self.detail_id = Some(next);
    self.related_state.select(Some(0));
  }

  // --- Polling ---

  pub fn check_pending(&mut self) -> Result<()> {
    if self.browse.poll() {
      debug!(shown = self.browse.visible().len(), total = self.browse.total(), "app: page arrived");
      if self.list_state.selected().is_none() && !self.browse.visible().is_empty() {
        self.list_state.select(Some(0));
      }
    }
    self.expire_error();
    Ok(())
  }
}
