//! The sermon catalog: raw archive entries, normalized records and lookups.
//!
//! The bundled catalog is embedded from `catalog.ron` at compile time. Raw
//! entries keep the archive's own encodings (`DDMMYYYY` dates, upper-case
//! category names, `"NULL"` location parts); [`Catalog::from_entries`] turns
//! them into [`MediaRecord`]s once, and the rest of the program only ever
//! sees normalized records.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

use crate::filter::LocalField;
use crate::format::parse_duration;

const BUNDLED_CATALOG: &str = include_str!("../catalog.ron");

// --- Types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
  Video,
  Audio,
}

impl MediaKind {
  pub const ALL: [MediaKind; 2] = [MediaKind::Video, MediaKind::Audio];

  pub fn label(self) -> &'static str {
    match self {
      MediaKind::Video => "Videos",
      MediaKind::Audio => "Audio",
    }
  }

  fn slug(self) -> &'static str {
    match self {
      MediaKind::Video => "video",
      MediaKind::Audio => "audio",
    }
  }

  pub fn toggle(self) -> Self {
    match self {
      MediaKind::Video => MediaKind::Audio,
      MediaKind::Audio => MediaKind::Video,
    }
  }
}

/// One catalog entry as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
  pub title: String,
  pub date: String,
  #[serde(default)]
  pub year: Option<i32>,
  #[serde(default)]
  pub language: String,
  #[serde(default)]
  pub city: String,
  #[serde(default)]
  pub state: String,
  #[serde(default)]
  pub country: String,
  pub minister: String,
  #[serde(default)]
  pub series: Option<String>,
  pub category: String,
  pub kind: MediaKind,
  #[serde(default)]
  pub views: Option<u64>,
  /// `mm:ss` or `hh:mm:ss`.
  #[serde(default)]
  pub duration: Option<String>,
}

/// One sermon recording. Never mutated after the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRecord {
  pub id: String,
  pub title: String,
  pub category: String,
  pub series: Option<String>,
  /// ISO-comparable: `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
  pub date: String,
  pub year: Option<i32>,
  pub views: Option<u64>,
  pub speaker: String,
  pub kind: MediaKind,
  pub language: Option<String>,
  pub location: Option<String>,
  /// Seconds.
  pub duration: Option<u32>,
  pub tags: Vec<String>,
}

/// Aggregate over all records sharing a series label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSummary {
  pub name: String,
  pub category: String,
  pub episodes: usize,
  pub total_views: u64,
  pub first_year: Option<i32>,
  pub speakers: Vec<String>,
}

/// Aggregate over all records sharing a category label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
  pub name: String,
  pub recordings: usize,
  pub series_count: usize,
  pub total_views: u64,
}

/// Archive-wide numbers for the statistics view.
#[derive(Debug, Clone, Default)]
pub struct ArchiveStats {
  pub videos: usize,
  pub audios: usize,
  pub total_views: u64,
  pub series: usize,
  pub categories: usize,
  pub speakers: usize,
  /// year -> (videos, audios)
  pub per_year: BTreeMap<i32, (usize, usize)>,
  pub category_distribution: Vec<(String, usize)>,
  pub top_series: Vec<SeriesSummary>,
  pub recent: Vec<MediaRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
  records: Vec<MediaRecord>,
}

// --- Loading ---

impl Catalog {
  /// Parse the catalog embedded in the binary.
  pub fn bundled() -> Result<Self> {
    let entries: Vec<RawEntry> = ron::from_str(BUNDLED_CATALOG).context("Bundled catalog.ron is not valid RON")?;
    Ok(Self::from_entries(entries))
  }

  /// Load a catalog file. `.json` is read as JSON, anything else as RON.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content =
      std::fs::read_to_string(path).with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let is_json = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let entries: Vec<RawEntry> = if is_json {
      serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON catalog {}", path.display()))?
    } else {
      ron::from_str(&content).with_context(|| format!("Failed to parse RON catalog {}", path.display()))?
    };
    if entries.is_empty() {
      return Err(anyhow!("Catalog {} contains no entries", path.display()));
    }
    info!(path = %path.display(), entries = entries.len(), "catalog: loaded from file");
    Ok(Self::from_entries(entries))
  }

  pub fn from_entries(entries: Vec<RawEntry>) -> Self {
    let records: Vec<MediaRecord> = entries.into_iter().enumerate().map(|(i, e)| normalize_entry(i, e)).collect();
    debug!(records = records.len(), "catalog: normalized entries");
    Self { records }
  }
}

/// `{kind}-{n}-{slug}` where the slug replaces every non-alphanumeric char with `-`.
fn record_id(kind: MediaKind, index: usize, title: &str) -> String {
  let slug: String =
    title.chars().map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' }).collect();
  format!("{}-{}-{}", kind.slug(), index + 1, slug)
}

fn clean_part(s: &str) -> Option<&str> {
  let s = s.trim();
  (!s.is_empty() && s != "NULL").then_some(s)
}

fn normalize_entry(index: usize, e: RawEntry) -> MediaRecord {
  let location = [e.city.as_str(), e.state.as_str(), e.country.as_str()]
    .into_iter()
    .filter_map(clean_part)
    .collect::<Vec<_>>()
    .join(", ");
  let tags = derive_tags(&e);
  let date = normalize_date(&e.date);
  let year = e.year.or_else(|| date.get(..4).and_then(|y| y.parse().ok()));

  MediaRecord {
    id: record_id(e.kind, index, &e.title),
    category: display_category(&e.category),
    series: e.series.filter(|s| clean_part(s).is_some()),
    date,
    year,
    views: e.views,
    speaker: e.minister,
    kind: e.kind,
    language: clean_part(&e.language).map(language_label),
    location: (!location.is_empty()).then_some(location),
    duration: e.duration.as_deref().map(parse_duration).filter(|d| *d > 0),
    tags,
    title: e.title,
  }
}

/// Convert the archive's date encodings to an ISO-comparable string.
///
/// `DDMMYYYY` -> `YYYY-MM-DD`, `MMYYYY` -> `YYYY-MM`, `YYYY` and ISO input are
/// kept. Anything unparseable is returned verbatim.
pub fn normalize_date(raw: &str) -> String {
  let raw = raw.trim();
  let all_digits = raw.chars().all(|c| c.is_ascii_digit());
  match raw.len() {
    8 if all_digits => match NaiveDate::parse_from_str(raw, "%d%m%Y") {
      Ok(d) => d.format("%Y-%m-%d").to_string(),
      Err(_) => raw.to_string(),
    },
    6 if all_digits => {
      let (month, year) = raw.split_at(2);
      match month.parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => format!("{}-{:02}", year, m),
        _ => raw.to_string(),
      }
    }
    _ => raw.to_string(),
  }
}

/// `SUNDAY SERVICE` -> `Sunday Service`. Mixed-case labels are left alone.
pub fn display_category(raw: &str) -> String {
  let raw = raw.trim();
  if raw.chars().any(|c| c.is_lowercase()) {
    return raw.to_string();
  }
  raw
    .split_whitespace()
    .map(|word| {
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
      }
    })
    .collect::<Vec<String>>()
    .join(" ")
}

fn language_label(code: &str) -> String {
  match code {
    "ENG" => "English",
    "ENG-YOR" => "English/Yoruba",
    "ENG-ELEME" => "English/Eleme",
    "ENG-IKWERRE" => "English/Ikwerre",
    "ENG-ITSEKIRI" => "English/Itsekiri",
    "ENG-EDO" => "English/Edo",
    other => other,
  }
  .to_string()
}

fn derive_tags(e: &RawEntry) -> Vec<String> {
  let mut tags = vec![e.category.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")];
  if e.minister.contains("KUMUYI") {
    tags.push("pastor-kumuyi".to_string());
  }
  if e.language.contains("YOR") {
    tags.push("yoruba".to_string());
  }
  if e.language.contains("ENG") {
    tags.push("english".to_string());
  }
  if let Some(country) = clean_part(&e.country) {
    tags.push(country.to_lowercase());
  }
  if let Some(series) = e.series.as_deref() {
    for (needle, tag) in [("WOMEN", "women"), ("YOUTH", "youth"), ("LEADERSHIP", "leadership"), ("CRUSADE", "crusade")]
    {
      if series.contains(needle) {
        tags.push(tag.to_string());
      }
    }
  }
  tags
}

// --- Lookups ---

/// Case-insensitive substring search over title, speaker, series, category and tags.
/// An empty query matches everything.
pub fn matches_query(record: &MediaRecord, query: &str) -> bool {
  let query = query.trim();
  if query.is_empty() {
    return true;
  }
  let needle = query.to_lowercase();
  record.title.to_lowercase().contains(&needle)
    || record.speaker.to_lowercase().contains(&needle)
    || record.category.to_lowercase().contains(&needle)
    || record.series.as_deref().is_some_and(|s| s.to_lowercase().contains(&needle))
    || record.tags.iter().any(|t| t.contains(&needle))
}

fn sorted_unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
  values.collect::<BTreeSet<_>>().into_iter().map(str::to_string).collect()
}

impl Catalog {
  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn by_kind(&self, kind: MediaKind) -> Vec<MediaRecord> {
    self.records.iter().filter(|r| r.kind == kind).cloned().collect()
  }

  pub fn by_id(&self, id: &str) -> Option<&MediaRecord> {
    self.records.iter().find(|r| r.id == id)
  }

  pub fn unique_categories(&self, kind: Option<MediaKind>) -> Vec<String> {
    sorted_unique(self.of_kind(kind).map(|r| r.category.as_str()))
  }

  pub fn unique_series(&self, kind: Option<MediaKind>) -> Vec<String> {
    sorted_unique(self.of_kind(kind).filter_map(|r| r.series.as_deref()))
  }

  pub fn unique_speakers(&self, kind: Option<MediaKind>) -> Vec<String> {
    sorted_unique(self.of_kind(kind).map(|r| r.speaker.as_str()))
  }

  /// Years, most recent first.
  pub fn unique_years(&self, kind: Option<MediaKind>) -> Vec<i32> {
    let years: BTreeSet<i32> = self.of_kind(kind).filter_map(|r| r.year).collect();
    years.into_iter().rev().collect()
  }

  pub fn unique_locations(&self, kind: Option<MediaKind>) -> Vec<String> {
    sorted_unique(self.of_kind(kind).filter_map(|r| r.location.as_deref()))
  }

  pub fn unique_languages(&self, kind: Option<MediaKind>) -> Vec<String> {
    sorted_unique(self.of_kind(kind).filter_map(|r| r.language.as_deref()))
  }

  /// Choices offered by the filter bar for `field`, in display form.
  pub fn local_options(&self, field: LocalField, kind: Option<MediaKind>) -> Vec<String> {
    match field {
      LocalField::Year => self.unique_years(kind).into_iter().map(|y| y.to_string()).collect(),
      LocalField::Location => self.unique_locations(kind),
      LocalField::Speaker => self.unique_speakers(kind),
      LocalField::Language => self.unique_languages(kind),
    }
  }

  fn of_kind(&self, kind: Option<MediaKind>) -> impl Iterator<Item = &MediaRecord> {
    self.records.iter().filter(move |r| kind.is_none_or(|k| r.kind == k))
  }

  /// Records of the same kind sharing series, category or speaker with `id`, in catalog order.
  pub fn related(&self, id: &str, limit: usize) -> Vec<&MediaRecord> {
    let Some(current) = self.by_id(id) else { return Vec::new() };
    self
      .records
      .iter()
      .filter(|r| {
        r.id != current.id
          && r.kind == current.kind
          && ((r.series.is_some() && r.series == current.series)
            || r.category == current.category
            || r.speaker == current.speaker)
      })
      .take(limit)
      .collect()
  }

  pub fn search(&self, query: &str, kind: Option<MediaKind>) -> Vec<&MediaRecord> {
    self.of_kind(kind).filter(|r| matches_query(r, query)).collect()
  }

  /// One summary per series label, in order of first appearance.
  pub fn series_summaries(&self, kind: Option<MediaKind>) -> Vec<SeriesSummary> {
    let mut out: Vec<SeriesSummary> = Vec::new();
    for r in self.of_kind(kind) {
      let Some(name) = r.series.as_deref() else { continue };
      let summary = match out.iter_mut().position(|s| s.name == name) {
        Some(idx) => &mut out[idx],
        None => {
          out.push(SeriesSummary {
            name: name.to_string(),
            category: r.category.clone(),
            episodes: 0,
            total_views: 0,
            first_year: None,
            speakers: Vec::new(),
          });
          let last = out.len() - 1;
          &mut out[last]
        }
      };
      summary.episodes += 1;
      summary.total_views = summary.total_views.saturating_add(r.views.unwrap_or(0));
      summary.first_year = match (summary.first_year, r.year) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
      };
      if !summary.speakers.contains(&r.speaker) {
        summary.speakers.push(r.speaker.clone());
      }
    }
    out
  }

  /// One summary per category label, in order of first appearance.
  pub fn category_summaries(&self, kind: Option<MediaKind>) -> Vec<CategorySummary> {
    let mut order: Vec<String> = Vec::new();
    let mut acc: BTreeMap<String, (usize, BTreeSet<String>, u64)> = BTreeMap::new();
    for r in self.of_kind(kind) {
      let entry = acc.entry(r.category.clone()).or_insert_with(|| {
        order.push(r.category.clone());
        (0, BTreeSet::new(), 0)
      });
      entry.0 += 1;
      if let Some(series) = &r.series {
        entry.1.insert(series.clone());
      }
      entry.2 = entry.2.saturating_add(r.views.unwrap_or(0));
    }
    order
      .into_iter()
      .filter_map(|name| {
        let (recordings, series, total_views) = acc.remove(&name)?;
        Some(CategorySummary { name, recordings, series_count: series.len(), total_views })
      })
      .collect()
  }

  pub fn stats(&self, top_series: usize, recent: usize) -> ArchiveStats {
    let mut stats = ArchiveStats {
      videos: self.records.iter().filter(|r| r.kind == MediaKind::Video).count(),
      audios: self.records.iter().filter(|r| r.kind == MediaKind::Audio).count(),
      total_views: self.records.iter().fold(0u64, |acc, r| acc.saturating_add(r.views.unwrap_or(0))),
      ..ArchiveStats::default()
    };

    for r in &self.records {
      let Some(year) = r.year else { continue };
      let slot = stats.per_year.entry(year).or_default();
      match r.kind {
        MediaKind::Video => slot.0 += 1,
        MediaKind::Audio => slot.1 += 1,
      }
    }

    stats.speakers = self.unique_speakers(None).len();

    let categories = self.category_summaries(None);
    stats.categories = categories.len();
    stats.category_distribution = categories.into_iter().map(|c| (c.name, c.recordings)).collect();

    let mut series = self.series_summaries(None);
    stats.series = series.len();
    series.sort_by(|a, b| b.total_views.cmp(&a.total_views));
    series.truncate(top_series);
    stats.top_series = series;

    let mut by_year: Vec<&MediaRecord> = self.records.iter().collect();
    by_year.sort_by(|a, b| b.year.cmp(&a.year));
    stats.recent = by_year.into_iter().take(recent).cloned().collect();

    stats
  }
}
