//! One browsing session over a list of records.
//!
//! `Browse` threads the user's sidebar selection, filter bar, search query and
//! sort key through `filter -> search -> sort` and owns the windowing state on top of
//! the result. Every upstream change rebuilds the result and resets the
//! loader, cancelling any pending load delay.

use std::time::Duration;
use tracing::{debug, info};

use crate::catalog::{MediaRecord, matches_query};
use crate::filter::{FilterSelection, LocalField, LocalFilters, filter_records};
use crate::loader::{IncrementalLoader, LoadTimer};
use crate::sort::{SortKey, sort_records};

/// What the list area should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
  /// Records are visible and nothing is pending.
  Ready,
  /// Records are visible and the next page is on its way.
  LoadingMore,
  /// The filters and query exclude every record.
  Empty,
}

pub struct Browse {
  records: Vec<MediaRecord>,
  selection: FilterSelection,
  local: LocalFilters,
  query: String,
  sort: Option<SortKey>,
  results: Vec<MediaRecord>,
  loader: IncrementalLoader,
  timer: LoadTimer,
  loading_delay: Duration,
}

impl Browse {
  pub fn new(records: Vec<MediaRecord>, sort: Option<SortKey>, page_size: usize, loading_delay: Duration) -> Self {
    let mut browse = Self {
      records,
      selection: FilterSelection::default(),
      local: LocalFilters::default(),
      query: String::new(),
      sort,
      results: Vec::new(),
      loader: IncrementalLoader::new(page_size, 0),
      timer: LoadTimer::default(),
      loading_delay,
    };
    browse.recompute();
    browse
  }

  // --- Upstream changes ---

  /// Replace the raw data (e.g. switching between videos and audio).
  pub fn set_records(&mut self, records: Vec<MediaRecord>) {
    self.records = records;
    self.recompute();
  }

  pub fn toggle_category(&mut self, value: &str) {
    let checked = self.selection.toggle_category(value);
    info!(category = %value, checked, "browse: category filter toggled");
    self.recompute();
  }

  pub fn toggle_series(&mut self, value: &str) {
    let checked = self.selection.toggle_series(value);
    info!(series = %value, checked, "browse: series filter toggled");
    self.recompute();
  }

  /// Tick a series label without toggling it off when already ticked.
  pub fn select_series(&mut self, value: &str) {
    if !self.selection.series.contains(value) {
      self.selection.set_series(value, true);
      info!(series = %value, "browse: series selected");
      self.recompute();
    }
  }

  pub fn select_category(&mut self, value: &str) {
    if !self.selection.categories.contains(value) {
      self.selection.set_category(value, true);
      info!(category = %value, "browse: category selected");
      self.recompute();
    }
  }

  /// Set one filter bar field; `None` is "all".
  pub fn set_local(&mut self, field: LocalField, value: Option<&str>) {
    let mut local = self.local.clone();
    local.set(field, value);
    if local != self.local {
      info!(field = field.label(), value = value.unwrap_or("all"), "browse: filter bar changed");
      self.local = local;
      self.recompute();
    }
  }

  pub fn set_selection(&mut self, selection: FilterSelection) {
    if self.selection != selection {
      self.selection = selection;
      self.recompute();
    }
  }

  /// Sidebar, filter bar and query together.
  pub fn clear_filters(&mut self) {
    if !self.selection.is_empty() || !self.local.is_empty() || !self.query.is_empty() {
      info!("browse: filters cleared");
      self.selection.clear();
      self.local.clear();
      self.query.clear();
      self.recompute();
    }
  }

  pub fn set_query(&mut self, query: &str) {
    let query = query.trim();
    if self.query != query {
      self.query = query.to_string();
      self.recompute();
    }
  }

  pub fn set_sort(&mut self, sort: Option<SortKey>) {
    if self.sort != sort {
      info!(sort = sort.map_or("none", SortKey::name), "browse: sort changed");
      self.sort = sort;
      self.recompute();
    }
  }

  /// Advance to the next sort key; an unsorted listing starts at the first key.
  pub fn cycle_sort(&mut self) {
    let next = self.sort.map_or(SortKey::ALL[0], SortKey::next);
    self.set_sort(Some(next));
  }

  fn recompute(&mut self) {
    let mut filtered = filter_records(&self.records, &self.selection);
    if !self.local.is_empty() {
      filtered.retain(|r| self.local.accepts(r));
    }
    let searched: Vec<MediaRecord> = if self.query.is_empty() {
      filtered
    } else {
      filtered.into_iter().filter(|r| matches_query(r, &self.query)).collect()
    };
    self.results = match self.sort {
      Some(key) => sort_records(searched, key),
      None => searched,
    };
    let discarded = self.timer.is_armed();
    self.timer.cancel();
    self.loader.reset(self.results.len());
    debug!(
      discarded,
      records = self.records.len(),
      results = self.results.len(),
      filters = self.selection.active_count() + self.local.active_count(),
      "browse: listing rebuilt"
    );
  }

  // --- Windowing ---

  /// Ask for the next page. Used both by the explicit "load more" key and by
  /// the cursor nearing the end of the window. A no-op while loading.
  pub fn request_more(&mut self) -> bool {
    let Some(ticket) = self.loader.request_more() else { return false };
    if self.loading_delay.is_zero() {
      self.loader.complete_load(ticket);
    } else {
      self.timer.arm(self.loading_delay, ticket);
    }
    true
  }

  /// Apply a fired load delay. Returns true when the window grew.
  pub fn poll(&mut self) -> bool {
    match self.timer.poll() {
      Some(ticket) => self.loader.complete_load(ticket),
      None => false,
    }
  }

  // --- Views ---

  pub fn visible(&self) -> &[MediaRecord] {
    self.loader.window(&self.results)
  }

  pub fn total(&self) -> usize {
    self.results.len()
  }

  pub fn has_more(&self) -> bool {
    self.loader.has_more()
  }

  pub fn is_loading(&self) -> bool {
    self.loader.is_loading()
  }

  pub fn status(&self) -> ListingStatus {
    if self.results.is_empty() {
      ListingStatus::Empty
    } else if self.loader.is_loading() {
      ListingStatus::LoadingMore
    } else {
      ListingStatus::Ready
    }
  }

  pub fn selection(&self) -> &FilterSelection {
    &self.selection
  }

  pub fn local(&self) -> &LocalFilters {
    &self.local
  }

  /// Sidebar labels plus filter bar fields in effect.
  pub fn active_filters(&self) -> usize {
    self.selection.active_count() + self.local.active_count()
  }

  pub fn query(&self) -> &str {
    &self.query
  }

  pub fn sort(&self) -> Option<SortKey> {
    self.sort
  }

  pub fn page_size(&self) -> usize {
    self.loader.page_size()
  }

  /// How many records the next page would add.
  pub fn next_page_len(&self) -> usize {
    self.page_size().min(self.total() - self.visible().len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::tests::make_record;

  /// 30 "SUNDAY SERVICE" then 20 "BIBLE STUDY", views increasing with index.
  fn fifty() -> Vec<MediaRecord> {
    (0..50)
      .map(|i| {
        let category = if i < 30 { "SUNDAY SERVICE" } else { "BIBLE STUDY" };
        MediaRecord { views: Some(i as u64 * 10), ..make_record(&format!("r{}", i), category, None) }
      })
      .collect()
  }

  fn instant(records: Vec<MediaRecord>, sort: Option<SortKey>) -> Browse {
    Browse::new(records, sort, 12, Duration::ZERO)
  }

  #[test]
  fn category_filter_sort_and_window() {
    let mut browse = instant(fifty(), Some(SortKey::MostViewed));
    browse.toggle_category("sunday-service");
    assert_eq!(browse.total(), 30);
    assert_eq!(browse.visible().len(), 12);
    assert_eq!(browse.visible()[0].id, "r29");
    assert!(browse.results.windows(2).all(|w| w[0].views >= w[1].views));

    assert!(browse.request_more());
    assert_eq!(browse.visible().len(), 24);
    assert!(browse.has_more());
    assert!(browse.request_more());
    assert_eq!(browse.visible().len(), 30);
    assert!(!browse.has_more());
    assert!(!browse.request_more());
  }

  #[test]
  fn empty_selection_and_no_sort_keeps_input() {
    let records = fifty();
    let browse = instant(records.clone(), SortKey::parse("popularity"));
    assert_eq!(browse.results, records);
    assert_eq!(browse.visible(), &records[..12]);
  }

  #[test]
  fn filter_change_resets_window() {
    let mut browse = instant(fifty(), None);
    browse.request_more();
    browse.request_more();
    assert_eq!(browse.visible().len(), 36);
    browse.toggle_category("Bible Study");
    assert_eq!(browse.total(), 20);
    assert_eq!(browse.visible().len(), 12);
    browse.toggle_category("Bible Study");
    assert_eq!(browse.total(), 50);
    assert_eq!(browse.visible().len(), 12);
  }

  #[test]
  fn sort_change_resets_window() {
    let mut browse = instant(fifty(), Some(SortKey::Newest));
    browse.request_more();
    assert_eq!(browse.visible().len(), 24);
    browse.cycle_sort();
    assert_eq!(browse.sort(), Some(SortKey::Oldest));
    assert_eq!(browse.visible().len(), 12);
  }

  #[test]
  fn query_narrows_results() {
    let mut records = fifty();
    records[3].title = "Assurance of Salvation".to_string();
    let mut browse = instant(records, None);
    browse.set_query("  salvation ");
    assert_eq!(browse.query(), "salvation");
    assert_eq!(browse.total(), 1);
    browse.clear_filters();
    assert_eq!(browse.total(), 50);
  }

  #[test]
  fn filter_bar_ands_with_sidebar_and_clears() {
    let mut records = fifty();
    for (i, r) in records.iter_mut().enumerate() {
      r.year = Some(if i % 2 == 0 { 1995 } else { 2004 });
    }
    let mut browse = instant(records, None);
    browse.toggle_category("sunday-service");
    browse.set_local(LocalField::Year, Some("1995"));
    assert_eq!(browse.total(), 15);
    assert_eq!(browse.active_filters(), 2);
    assert!(browse.visible().iter().all(|r| r.year == Some(1995) && r.category == "SUNDAY SERVICE"));

    browse.request_more();
    browse.set_local(LocalField::Speaker, Some("PASTOR W.F KUMUYI"));
    assert_eq!(browse.total(), 15);
    assert_eq!(browse.visible().len(), 12);
    assert_eq!(browse.next_page_len(), 3);

    browse.clear_filters();
    assert!(browse.local().is_empty());
    assert_eq!(browse.total(), 50);
  }

  #[test]
  fn select_series_never_unticks() {
    let mut records = fifty();
    records[7].series = Some("WORSHIP SERVICE".to_string());
    let mut browse = instant(records, None);
    browse.select_series("WORSHIP SERVICE");
    browse.select_series("WORSHIP SERVICE");
    assert_eq!(browse.total(), 1);
    browse.select_category("Bible Study");
    assert_eq!(browse.total(), 0);
    assert_eq!(browse.selection().active_count(), 2);
  }

  #[test]
  fn page_size_bounds_next_page() {
    let browse = Browse::new(fifty(), None, 20, Duration::ZERO);
    assert_eq!(browse.page_size(), 20);
    assert_eq!(browse.next_page_len(), 20);
  }

  #[test]
  fn empty_result_is_distinct_from_loading() {
    let mut browse = instant(fifty(), None);
    assert_eq!(browse.status(), ListingStatus::Ready);
    browse.toggle_series("anything");
    assert_eq!(browse.total(), 0);
    assert_eq!(browse.status(), ListingStatus::Empty);
    assert!(!browse.request_more());
  }

  #[test]
  fn set_records_rebuilds() {
    let mut browse = instant(fifty(), None);
    browse.set_records(fifty().into_iter().take(5).collect());
    assert_eq!(browse.total(), 5);
    assert_eq!(browse.visible().len(), 5);
    assert!(!browse.has_more());
  }

  #[tokio::test]
  async fn delayed_load_completes_on_poll() {
    let mut browse = Browse::new(fifty(), None, 12, Duration::from_millis(20));
    assert!(browse.request_more());
    assert_eq!(browse.status(), ListingStatus::LoadingMore);
    assert!(!browse.request_more());
    assert_eq!(browse.visible().len(), 12);

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(browse.poll());
    assert_eq!(browse.visible().len(), 24);
    assert_eq!(browse.status(), ListingStatus::Ready);
  }

  #[tokio::test]
  async fn filter_change_cancels_pending_load() {
    let mut browse = Browse::new(fifty(), None, 12, Duration::from_millis(20));
    assert!(browse.request_more());
    browse.toggle_category("sunday-service");
    assert!(!browse.is_loading());

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(!browse.poll());
    assert_eq!(browse.visible().len(), 12);
    assert_eq!(browse.total(), 30);
  }
}
