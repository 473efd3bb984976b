use chrono::Duration;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_TIMEOUT_SECS;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_STALE_SECS: u64 = 30;

/// Overrides `api.url` from the config file
pub const API_URL_ENV: &str = "STASHER_API_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the backend, e.g. "https://stasher.example.com/api"
  #[serde(default = "default_api_url")]
  pub url: String,
  /// Ceiling for every request
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: default_api_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_api_url() -> String {
  DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
  DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Default staleness window for cached queries
  #[serde(default = "default_stale_secs")]
  pub stale_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      stale_secs: default_stale_secs(),
    }
  }
}

impl CacheConfig {
  pub fn stale_time(&self) -> Duration {
    // chrono panics past i64::MAX milliseconds
    let secs = self.stale_secs.min(i64::MAX as u64 / 1000);
    Duration::seconds(secs as i64)
  }
}

fn default_stale_secs() -> u64 {
  DEFAULT_STALE_SECS
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
  /// SQLite file for tokens and preferences (defaults to the data directory)
  pub path: Option<PathBuf>,
  /// Keep everything in memory; nothing survives the process
  #[serde(default)]
  pub ephemeral: bool,
}

impl Config {
  /// Load configuration from file, falling back to defaults.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./stasher.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/stasher/config.yaml
  ///
  /// `STASHER_API_URL` overrides the API url afterwards.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    Ok(config.with_api_url_override(std::env::var(API_URL_ENV).ok()))
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("stasher.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("stasher").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file is a valid, all-default config
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))
  }

  fn with_api_url_override(mut self, url: Option<String>) -> Self {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
      self.api.url = url.trim().to_string();
    }
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.api.url, DEFAULT_API_URL);
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.cache.stale_time(), Duration::seconds(30));
    assert!(config.storage.path.is_none());
  }

  #[test]
  fn test_partial_file() {
    let config = Config::parse(
      "api:\n  url: https://stasher.example.com/api\ncache:\n  stale_secs: 5\n",
    )
    .unwrap();
    assert_eq!(config.api.url, "https://stasher.example.com/api");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.cache.stale_secs, 5);
  }

  #[test]
  fn test_env_override() {
    let config = Config::default().with_api_url_override(Some(" https://env/api ".to_string()));
    assert_eq!(config.api.url, "https://env/api");

    let config = Config::default().with_api_url_override(Some("".to_string()));
    assert_eq!(config.api.url, DEFAULT_API_URL);
  }

  #[test]
  fn test_load_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stasher.yaml");
    std::fs::write(&path, "storage:\n  ephemeral: true\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert!(config.storage.ephemeral);
    assert!(Config::load(Some(&dir.path().join("missing.yaml"))).is_err());
  }
}
