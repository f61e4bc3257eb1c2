use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::catalog::MediaKind;
use crate::sort::SortKey;

/// User preferences persisted to `prefs.toml` between sessions.
#[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
  pub theme_name: Option<String>,
  #[serde(deserialize_with = "lenient")]
  pub sort: Option<SortKey>,
  #[serde(deserialize_with = "lenient")]
  pub kind: Option<MediaKind>,
}

/// A stale or misspelled value reads as unset; the rest of the file survives.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let value = toml::Value::deserialize(deserializer)?;
  match value.clone().try_into() {
    Ok(parsed) => Ok(Some(parsed)),
    Err(_) => {
      warn!(value = %value, "config: ignoring unrecognized preference");
      Ok(None)
    }
  }
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "pew") {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(&config_file) {
        match Self::from_toml(&content) {
          Ok(config) => return config,
          Err(e) => warn!(path = %config_file.display(), err = %e, "config: ignoring unreadable prefs"),
        }
      }
    }
    Self::default()
  }

  pub fn from_toml(content: &str) -> Result<Self> {
    toml::from_str(content).context("Failed to parse prefs.toml")
  }

  pub fn save(&self) -> Result<()> {
    let proj_dirs = ProjectDirs::from("", "", "pew").context("Could not determine a config directory")?;
    let config_dir = proj_dirs.config_dir();
    std::fs::create_dir_all(config_dir).with_context(|| format!("Failed to create {}", config_dir.display()))?;
    let content = toml::to_string(self).context("Failed to serialize preferences")?;
    std::fs::write(config_dir.join("prefs.toml"), content).context("Failed to write prefs.toml")?;
    Ok(())
  }
}
