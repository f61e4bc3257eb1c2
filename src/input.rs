use anyhow::Result;
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode};
use crate::filter::LocalField;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  app.info_message = None;
  app.clear_error();
  match app.mode {
    AppMode::Browse => handle_browse_key(app, key),
    AppMode::Sidebar => handle_sidebar_key(app, key),
    AppMode::Search => handle_search_key(app, key),
    AppMode::Detail => handle_detail_key(app, key),
    AppMode::Stats => handle_stats_key(app, key),
    AppMode::Series | AppMode::Categories => handle_cards_key(app, key),
  }
  Ok(())
}

fn handle_browse_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => app.move_down(),
    KeyCode::Up | KeyCode::Char('k') => app.move_up(),
    KeyCode::Enter => app.open_detail(),
    KeyCode::Char('m') => app.load_more(),
    KeyCode::Char('s') => app.cycle_sort(),
    KeyCode::Tab => app.switch_kind(),
    KeyCode::Char('f') => app.mode = AppMode::Sidebar,
    KeyCode::Char('c') => app.clear_filters(),
    KeyCode::Char('/') => app.mode = AppMode::Search,
    KeyCode::Char('i') => app.mode = AppMode::Stats,
    KeyCode::Char('y') => app.cycle_local(LocalField::Year),
    KeyCode::Char('l') => app.cycle_local(LocalField::Location),
    KeyCode::Char('p') => app.cycle_local(LocalField::Speaker),
    KeyCode::Char('n') => app.cycle_local(LocalField::Language),
    KeyCode::Char('2') => app.open_series_cards(),
    KeyCode::Char('3') => app.open_category_cards(),
    KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
    _ => {}
  }
}

fn handle_cards_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => app.cards_down(),
    KeyCode::Up | KeyCode::Char('k') => app.cards_up(),
    KeyCode::Enter => app.select_card(),
    KeyCode::Char('2') => app.open_series_cards(),
    KeyCode::Char('3') => app.open_category_cards(),
    KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('1') => app.mode = AppMode::Browse,
    _ => {}
  }
}

fn handle_sidebar_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => app.sidebar_down(),
    KeyCode::Up | KeyCode::Char('k') => app.sidebar_up(),
    KeyCode::Char(' ') | KeyCode::Enter => app.toggle_sidebar_entry(),
    KeyCode::Char('c') => app.clear_filters(),
    KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('f') => app.mode = AppMode::Browse,
    _ => {}
  }
}

fn handle_search_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.search_input, app.search_cursor);
      app.search_input.insert(byte_idx, c);
      app.search_cursor += 1;
      app.apply_search();
    }
    KeyCode::Backspace => {
      if app.search_cursor > 0 {
        app.search_cursor -= 1;
        let byte_idx = char_to_byte_index(&app.search_input, app.search_cursor);
        app.search_input.remove(byte_idx);
        app.apply_search();
      }
    }
    KeyCode::Delete => {
      if app.search_cursor < app.search_input.chars().count() {
        let byte_idx = char_to_byte_index(&app.search_input, app.search_cursor);
        app.search_input.remove(byte_idx);
        app.apply_search();
      }
    }
    KeyCode::Left => {
      app.search_cursor = app.search_cursor.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.search_cursor < app.search_input.chars().count() {
        app.search_cursor += 1;
      }
    }
    KeyCode::Home => {
      app.search_cursor = 0;
    }
    KeyCode::End => {
      app.search_cursor = app.search_input.chars().count();
    }
    // Navigate the narrowed listing while typing
    KeyCode::Down => app.move_down(),
    KeyCode::Up => app.move_up(),
    KeyCode::Enter => {
      app.mode = AppMode::Browse;
    }
    KeyCode::Esc => {
      app.search_input.clear();
      app.search_cursor = 0;
      app.search_scroll = 0;
      app.apply_search();
      app.mode = AppMode::Browse;
    }
    _ => {}
  }
}

fn handle_detail_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => app.related_down(),
    KeyCode::Up | KeyCode::Char('k') => app.related_up(),
    KeyCode::Enter => app.open_related(),
    KeyCode::Esc | KeyCode::Char('q') => {
      app.detail_id = None;
      app.mode = AppMode::Browse;
    }
    _ => {}
  }
}

fn handle_stats_key(app: &mut App, key: event::KeyEvent) {
  if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('i')) {
    app.mode = AppMode::Browse;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::app::tests::make_app;
  use ratatui::crossterm::event::KeyEvent;

  fn press(app: &mut App, code: KeyCode) {
    handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
  }

  fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      press(app, KeyCode::Char(c));
    }
  }

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日"; // a=1 byte, é=2 bytes, 日=3 bytes
    assert_eq!(char_to_byte_index(s, 0), 0);
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
    assert_eq!(char_to_byte_index(s, 3), 6);
  }

  #[test]
  fn char_to_byte_empty() {
    assert_eq!(char_to_byte_index("", 0), 0);
    assert_eq!(char_to_byte_index("", 5), 0);
  }

  // --- key handling ---

  #[test]
  fn ctrl_c_quits_from_any_mode() {
    let mut app = make_app();
    app.mode = AppMode::Search;
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();
    assert!(app.should_quit);
  }

  #[test]
  fn search_typing_narrows_and_esc_restores() {
    let mut app = make_app();
    press(&mut app, KeyCode::Char('/'));
    assert_eq!(app.mode, AppMode::Search);
    type_str(&mut app, "zzqx");
    assert_eq!(app.browse.total(), 0);
    press(&mut app, KeyCode::Backspace);
    assert_eq!(app.search_input, "zzq");
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.mode, AppMode::Browse);
    assert_eq!(app.browse.total(), 50);
  }

  #[test]
  fn sidebar_space_toggles_and_c_clears() {
    let mut app = make_app();
    press(&mut app, KeyCode::Char('f'));
    assert_eq!(app.mode, AppMode::Sidebar);
    press(&mut app, KeyCode::Char(' '));
    assert_eq!(app.browse.selection().active_count(), 1);
    press(&mut app, KeyCode::Char('c'));
    assert!(app.browse.selection().is_empty());
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.mode, AppMode::Browse);
  }

  #[test]
  fn filter_bar_keys() {
    let mut app = make_app();
    press(&mut app, KeyCode::Char('y'));
    press(&mut app, KeyCode::Char('p'));
    assert_eq!(app.browse.local().active_count(), 2);
    assert!(app.browse.local().get(LocalField::Year).is_some());
    press(&mut app, KeyCode::Char('c'));
    assert!(app.browse.local().is_empty());
  }

  #[test]
  fn card_keys() {
    let mut app = make_app();
    press(&mut app, KeyCode::Char('3'));
    assert_eq!(app.mode, AppMode::Categories);
    press(&mut app, KeyCode::Char('2'));
    assert_eq!(app.mode, AppMode::Series);
    press(&mut app, KeyCode::Char('j'));
    assert_eq!(app.cards_state.selected(), Some(1));
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.mode, AppMode::Browse);
    assert_eq!(app.browse.selection().series.len(), 1);
    press(&mut app, KeyCode::Char('2'));
    press(&mut app, KeyCode::Char('1'));
    assert_eq!(app.mode, AppMode::Browse);
  }

  #[test]
  fn browse_keys() {
    let mut app = make_app();
    press(&mut app, KeyCode::Char('m'));
    assert_eq!(app.browse.visible().len(), 24);
    press(&mut app, KeyCode::Char('s'));
    assert_eq!(app.browse.visible().len(), 12);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.mode, AppMode::Detail);
    press(&mut app, KeyCode::Esc);
    press(&mut app, KeyCode::Char('i'));
    assert_eq!(app.mode, AppMode::Stats);
    press(&mut app, KeyCode::Char('q'));
    assert_eq!(app.mode, AppMode::Browse);
    assert!(!app.should_quit);
    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit);
  }
}
