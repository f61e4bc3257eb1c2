//! Category/series filtering of catalog listings, plus the single-choice
//! year, location, minister and language refinements layered on top.

use std::collections::BTreeSet;

use crate::catalog::{CategorySummary, MediaRecord, SeriesSummary};
use crate::matcher::matches_any;

/// Anything carrying a category label and, optionally, a series label.
pub trait Labeled {
  fn category(&self) -> &str;
  fn series(&self) -> Option<&str>;
}

impl Labeled for MediaRecord {
  fn category(&self) -> &str {
    &self.category
  }

  fn series(&self) -> Option<&str> {
    self.series.as_deref()
  }
}

impl Labeled for SeriesSummary {
  fn category(&self) -> &str {
    &self.category
  }

  fn series(&self) -> Option<&str> {
    Some(&self.name)
  }
}

/// The labels the user has ticked in the sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
  pub categories: BTreeSet<String>,
  pub series: BTreeSet<String>,
}

impl FilterSelection {
  pub fn is_empty(&self) -> bool {
    self.categories.is_empty() && self.series.is_empty()
  }

  pub fn active_count(&self) -> usize {
    self.categories.len() + self.series.len()
  }

  pub fn set_category(&mut self, value: &str, checked: bool) {
    set_label(&mut self.categories, value, checked);
  }

  pub fn set_series(&mut self, value: &str, checked: bool) {
    set_label(&mut self.series, value, checked);
  }

  /// Flip a category label. Returns whether it is now selected.
  pub fn toggle_category(&mut self, value: &str) -> bool {
    let checked = !self.categories.contains(value);
    self.set_category(value, checked);
    checked
  }

  /// Flip a series label. Returns whether it is now selected.
  pub fn toggle_series(&mut self, value: &str) -> bool {
    let checked = !self.series.contains(value);
    self.set_series(value, checked);
    checked
  }

  pub fn clear(&mut self) {
    self.categories.clear();
    self.series.clear();
  }

  /// Whether a single item passes both dimensions of the selection.
  pub fn accepts<T: Labeled>(&self, item: &T) -> bool {
    if !self.categories.is_empty() && !matches_any(&self.categories, item.category()) {
      return false;
    }
    if !self.series.is_empty() {
      // An active series filter requires the field to be present.
      let Some(series) = item.series() else { return false };
      if !matches_any(&self.series, series) {
        return false;
      }
    }
    true
  }
}

fn set_label(set: &mut BTreeSet<String>, value: &str, checked: bool) {
  if checked {
    set.insert(value.to_string());
  } else {
    set.remove(value);
  }
}

/// Categories accepted by the category selection. While series are selected,
/// only categories holding one of those series remain.
pub fn filter_categories(
  categories: &[CategorySummary],
  series: &[SeriesSummary],
  selection: &FilterSelection,
) -> Vec<CategorySummary> {
  if selection.is_empty() {
    return categories.to_vec();
  }
  categories
    .iter()
    .filter(|c| selection.categories.is_empty() || matches_any(&selection.categories, &c.name))
    .filter(|c| {
      selection.series.is_empty()
        || series.iter().any(|s| s.category == c.name && matches_any(&selection.series, &s.name))
    })
    .cloned()
    .collect()
}

// --- Local filters ---

/// One single-choice field of the filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalField {
  Year,
  Location,
  Speaker,
  Language,
}

impl LocalField {
  pub const ALL: [LocalField; 4] = [LocalField::Year, LocalField::Location, LocalField::Speaker, LocalField::Language];

  pub fn label(self) -> &'static str {
    match self {
      LocalField::Year => "Year",
      LocalField::Location => "Location",
      LocalField::Speaker => "Minister",
      LocalField::Language => "Language",
    }
  }
}

/// Filter bar state. `None` means "all"; every set field must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalFilters {
  pub year: Option<i32>,
  pub location: Option<String>,
  pub speaker: Option<String>,
  pub language: Option<String>,
}

impl LocalFilters {
  pub fn is_empty(&self) -> bool {
    self.active_count() == 0
  }

  pub fn active_count(&self) -> usize {
    LocalField::ALL.iter().filter(|f| self.get(**f).is_some()).count()
  }

  /// The chosen value of `field` in display form.
  pub fn get(&self, field: LocalField) -> Option<String> {
    match field {
      LocalField::Year => self.year.map(|y| y.to_string()),
      LocalField::Location => self.location.clone(),
      LocalField::Speaker => self.speaker.clone(),
      LocalField::Language => self.language.clone(),
    }
  }

  /// Set `field` from its display form. A year that does not parse clears it.
  pub fn set(&mut self, field: LocalField, value: Option<&str>) {
    let value = value.map(str::to_string);
    match field {
      LocalField::Year => self.year = value.and_then(|v| v.parse().ok()),
      LocalField::Location => self.location = value,
      LocalField::Speaker => self.speaker = value,
      LocalField::Language => self.language = value,
    }
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }

  /// Exact comparison per field; a record missing the field fails an active filter.
  pub fn accepts(&self, record: &MediaRecord) -> bool {
    self.year.is_none_or(|y| record.year == Some(y))
      && self.location.as_deref().is_none_or(|l| record.location.as_deref() == Some(l))
      && self.speaker.as_deref().is_none_or(|s| record.speaker == s)
      && self.language.as_deref().is_none_or(|l| record.language.as_deref() == Some(l))
  }
}

/// Keep the items accepted by `selection`, in input order.
///
/// AND across the category and series dimensions, OR within each. An empty
/// selection returns the input unchanged.
pub fn filter_records<T: Labeled + Clone>(records: &[T], selection: &FilterSelection) -> Vec<T> {
  if selection.is_empty() {
    return records.to_vec();
  }
  records.iter().filter(|r| selection.accepts(*r)).cloned().collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::tests::make_record;

  fn selection(categories: &[&str], series: &[&str]) -> FilterSelection {
    FilterSelection {
      categories: categories.iter().map(|s| s.to_string()).collect(),
      series: series.iter().map(|s| s.to_string()).collect(),
    }
  }

  fn sample() -> Vec<MediaRecord> {
    vec![
      make_record("a", "Sunday Service", Some("WORSHIP SERVICE")),
      make_record("b", "Bible Study", Some("YOUTH BIBLE STUDY")),
      make_record("c", "Sunday Service", None),
      make_record("d", "Crusades", Some("GREAT MIRACLE CRUSADE")),
      make_record("e", "Bible Study", Some("MONDAY BIBLE STUDY")),
    ]
  }

  fn ids(records: &[MediaRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
  }

  #[test]
  fn empty_selection_is_identity() {
    let records = sample();
    assert_eq!(filter_records(&records, &FilterSelection::default()), records);
  }

  #[test]
  fn category_filter_uses_matcher() {
    let out = filter_records(&sample(), &selection(&["sunday-service"], &[]));
    assert_eq!(ids(&out), vec!["a", "c"]);
  }

  #[test]
  fn or_within_dimension() {
    let out = filter_records(&sample(), &selection(&["crusades", "BIBLE STUDY"], &[]));
    assert_eq!(ids(&out), vec!["b", "d", "e"]);
  }

  #[test]
  fn and_across_dimensions() {
    let out = filter_records(&sample(), &selection(&["Bible Study"], &["youth-bible-study"]));
    assert_eq!(ids(&out), vec!["b"]);
  }

  #[test]
  fn series_filter_excludes_records_without_series() {
    let out = filter_records(&sample(), &selection(&[], &["worship-service"]));
    assert_eq!(ids(&out), vec!["a"]);
    let out = filter_records(&sample(), &selection(&["Sunday Service"], &["worship service"]));
    assert_eq!(ids(&out), vec!["a"]);
  }

  #[test]
  fn no_matches_yields_empty() {
    let out = filter_records(&sample(), &selection(&["leaders-meeting"], &[]));
    assert!(out.is_empty());
  }

  #[test]
  fn filter_is_idempotent() {
    let sel = selection(&["bible-study", "crusades"], &["great-miracle-crusade", "MONDAY BIBLE STUDY"]);
    let once = filter_records(&sample(), &sel);
    let twice = filter_records(&once, &sel);
    assert_eq!(once, twice);
    assert_eq!(ids(&once), vec!["d", "e"]);
  }

  #[test]
  fn filters_series_summaries() {
    let summaries = vec![
      SeriesSummary {
        name: "YOUTH BIBLE STUDY".to_string(),
        category: "Bible Study".to_string(),
        episodes: 2,
        total_views: 0,
        first_year: None,
        speakers: Vec::new(),
      },
      SeriesSummary {
        name: "WORSHIP SERVICE".to_string(),
        category: "Sunday Service".to_string(),
        episodes: 1,
        total_views: 0,
        first_year: None,
        speakers: Vec::new(),
      },
    ];
    let out = filter_records(&summaries, &selection(&["bible-study"], &[]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].name, "YOUTH BIBLE STUDY");
  }

  #[test]
  fn categories_follow_selected_series() {
    let category = |name: &str| CategorySummary { name: name.to_string(), recordings: 1, series_count: 1, total_views: 0 };
    let series = |name: &str, category: &str| SeriesSummary {
      name: name.to_string(),
      category: category.to_string(),
      episodes: 1,
      total_views: 0,
      first_year: None,
      speakers: Vec::new(),
    };
    let categories = vec![category("Sunday Service"), category("Bible Study"), category("Crusades")];
    let all_series = vec![series("WORSHIP SERVICE", "Sunday Service"), series("YOUTH BIBLE STUDY", "Bible Study")];

    let out = filter_categories(&categories, &all_series, &FilterSelection::default());
    assert_eq!(out.len(), 3);
    let out = filter_categories(&categories, &all_series, &selection(&[], &["youth-bible-study"]));
    assert_eq!(out.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["Bible Study"]);
    let out = filter_categories(&categories, &all_series, &selection(&["crusades", "sunday-service"], &[]));
    assert_eq!(out.len(), 2);
    let out = filter_categories(&categories, &all_series, &selection(&["crusades"], &["worship-service"]));
    assert!(out.is_empty());
  }

  // --- LocalFilters ---

  #[test]
  fn local_filters_and_together() {
    let mut records = sample();
    records[0].year = Some(1995);
    records[0].location = Some("LAGOS, NIGERIA".to_string());
    records[1].year = Some(1995);
    records[1].location = Some("ABUJA, NIGERIA".to_string());

    let mut local = LocalFilters::default();
    assert!(records.iter().all(|r| local.accepts(r)));
    local.set(LocalField::Year, Some("1995"));
    assert_eq!(records.iter().filter(|r| local.accepts(r)).count(), 2);
    local.set(LocalField::Location, Some("LAGOS, NIGERIA"));
    let kept: Vec<&str> = records.iter().filter(|r| local.accepts(r)).map(|r| r.id.as_str()).collect();
    assert_eq!(kept, vec!["a"]);
    assert_eq!(local.active_count(), 2);
    assert_eq!(local.get(LocalField::Year).as_deref(), Some("1995"));
  }

  #[test]
  fn local_filter_requires_the_field() {
    let records = sample();
    let mut local = LocalFilters::default();
    local.set(LocalField::Language, Some("English"));
    assert!(records.iter().all(|r| !local.accepts(r)));
    local.set(LocalField::Language, None);
    local.set(LocalField::Speaker, Some("PASTOR W.F KUMUYI"));
    assert!(records.iter().all(|r| local.accepts(r)));
  }

  #[test]
  fn local_filters_clear() {
    let mut local = LocalFilters::default();
    local.set(LocalField::Year, Some("not a year"));
    assert!(local.is_empty());
    local.set(LocalField::Speaker, Some("PASTOR W.F KUMUYI"));
    local.set(LocalField::Year, Some("2004"));
    assert_eq!(local.active_count(), 2);
    local.clear();
    assert!(local.is_empty());
  }

  // --- FilterSelection ---

  #[test]
  fn toggle_and_clear() {
    let mut sel = FilterSelection::default();
    assert!(sel.toggle_category("Crusades"));
    assert!(sel.toggle_series("WORSHIP SERVICE"));
    assert_eq!(sel.active_count(), 2);
    assert!(!sel.toggle_category("Crusades"));
    assert_eq!(sel.active_count(), 1);
    sel.set_category("Bible Study", true);
    sel.set_category("Bible Study", true);
    assert_eq!(sel.categories.len(), 1);
    sel.set_series("WORSHIP SERVICE", false);
    assert!(sel.series.is_empty());
    sel.clear();
    assert!(sel.is_empty());
  }
}
