//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!`, so there is no runtime file
//! I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Catalog browsing
  pub page_size: usize,
  pub loading_delay_ms: u64,
  pub proximity_rows: usize,
  pub skeleton_rows: usize,

  // Detail pane and statistics
  pub related_limit: usize,
  pub stats_top_series: usize,
  pub stats_recent: usize,

  // Logging
  pub log_file_prefix: String,
  pub log_env_var: String,
}

impl Constants {
  pub fn loading_delay(&self) -> Duration {
    Duration::from_millis(self.loading_delay_ms)
  }
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time and covered by a unit test.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
