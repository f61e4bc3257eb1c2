//! Stable ordering of catalog listings.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::catalog::MediaRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
  Newest,
  Oldest,
  Title,
  Speaker,
  MostViewed,
}

impl SortKey {
  pub const ALL: [SortKey; 5] = [SortKey::Newest, SortKey::Oldest, SortKey::Title, SortKey::Speaker, SortKey::MostViewed];

  pub fn name(self) -> &'static str {
    match self {
      SortKey::Newest => "newest",
      SortKey::Oldest => "oldest",
      SortKey::Title => "title",
      SortKey::Speaker => "speaker",
      SortKey::MostViewed => "most-viewed",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      SortKey::Newest => "Newest",
      SortKey::Oldest => "Oldest",
      SortKey::Title => "Title",
      SortKey::Speaker => "Speaker",
      SortKey::MostViewed => "Most viewed",
    }
  }

  /// Canonical names plus the aliases older links used. Unknown names are `None`.
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "newest" | "latest" => Some(SortKey::Newest),
      "oldest" => Some(SortKey::Oldest),
      "title" => Some(SortKey::Title),
      "speaker" | "minister" => Some(SortKey::Speaker),
      "most-viewed" | "views" => Some(SortKey::MostViewed),
      _ => None,
    }
  }

  pub fn next(self) -> Self {
    // Safety: position() is always Some for a member of ALL.
    let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }

  fn compare(self, a: &MediaRecord, b: &MediaRecord) -> Ordering {
    match self {
      SortKey::Newest => chronological(b, a),
      SortKey::Oldest => chronological(a, b),
      SortKey::Title => locale_cmp(&a.title, &b.title),
      SortKey::Speaker => locale_cmp(&a.speaker, &b.speaker),
      SortKey::MostViewed => b.views.unwrap_or(0).cmp(&a.views.unwrap_or(0)),
    }
  }
}

/// The record's year, or the leading year of its date string.
fn effective_year(r: &MediaRecord) -> Option<i32> {
  r.year.or_else(|| r.date.get(..4).and_then(|y| y.parse().ok()))
}

/// Year first, then the ISO-comparable date string.
///
/// Records without a usable year compare by date string only, which for
/// ISO dates agrees with the year ordering and keeps the comparator total.
fn chronological(a: &MediaRecord, b: &MediaRecord) -> Ordering {
  effective_year(a).cmp(&effective_year(b)).then_with(|| a.date.cmp(&b.date))
}

/// Case-folded comparison, lower case first on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
  let folded = a.chars().flat_map(char::to_lowercase).cmp(b.chars().flat_map(char::to_lowercase));
  folded.then_with(|| b.cmp(a))
}

/// Stable sort by `key`; equal keys keep their input order.
pub fn sort_records(mut records: Vec<MediaRecord>, key: SortKey) -> Vec<MediaRecord> {
  records.sort_by(|a, b| key.compare(a, b));
  records
}

/// Sort by a key name. Unknown names leave the input unchanged.
pub fn sort_by_name(records: Vec<MediaRecord>, name: &str) -> Vec<MediaRecord> {
  match SortKey::parse(name) {
    Some(key) => sort_records(records, key),
    None => records,
  }
}
