//! Persisted client state: session tokens and the view-mode preference.
//!
//! Everything else the client knows is either ephemeral or server-sourced.

use crate::api::error::ApiError;
use crate::api::types::TokenPair;
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const VIEW_MODE_KEY: &str = "viewMode";

/// String key/value persistence.
pub trait LocalStorage: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<String>>;

  fn set(&self, key: &str, value: &str) -> Result<()>;

  fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile storage, used in tests and with `--ephemeral`.
#[derive(Default)]
pub struct MemoryStorage {
  values: Mutex<HashMap<String, String>>,
}

impl LocalStorage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let values = self
      .values
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(values.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    let mut values = self
      .values
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    values.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    let mut values = self
      .values
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    values.remove(key);
    Ok(())
  }
}

/// SQLite-backed key/value storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

const STORAGE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SqliteStorage {
  /// Open (or create) the storage database at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create storage directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open storage database at {}: {}", path.display(), e))?;

    conn
      .execute_batch(STORAGE_SCHEMA)
      .map_err(|e| eyre!("Failed to run storage migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Default database path under the platform data directory.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("stasher").join("storage.db"))
  }
}

impl LocalStorage for SqliteStorage {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .query_row(
        "SELECT value FROM local_storage WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read {}: {}", key, e))
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO local_storage (key, value, updated_at)
         VALUES (?, ?, datetime('now'))",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to write {}: {}", key, e))?;
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute("DELETE FROM local_storage WHERE key = ?", params![key])
      .map_err(|e| eyre!("Failed to remove {}: {}", key, e))?;
    Ok(())
  }
}

/// Grid or list rendering of item listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
  #[default]
  Grid,
  List,
}

impl FromStr for ViewMode {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "grid" => Ok(ViewMode::Grid),
      "list" => Ok(ViewMode::List),
      other => Err(format!("Unknown view mode: {}", other)),
    }
  }
}

impl std::fmt::Display for ViewMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ViewMode::Grid => f.write_str("grid"),
      ViewMode::List => f.write_str("list"),
    }
  }
}

/// Typed access to the persisted session tokens and preferences.
#[derive(Clone)]
pub struct TokenStore {
  storage: Arc<dyn LocalStorage>,
}

impl TokenStore {
  pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
    Self { storage }
  }

  pub fn access_token(&self) -> std::result::Result<Option<String>, ApiError> {
    self.read(ACCESS_TOKEN_KEY)
  }

  pub fn refresh_token(&self) -> std::result::Result<Option<String>, ApiError> {
    self.read(REFRESH_TOKEN_KEY)
  }

  pub fn set_tokens(&self, tokens: &TokenPair) -> std::result::Result<(), ApiError> {
    self
      .storage
      .set(ACCESS_TOKEN_KEY, &tokens.access_token)
      .and_then(|_| self.storage.set(REFRESH_TOKEN_KEY, &tokens.refresh_token))
      .map_err(|e| ApiError::Storage(e.to_string()))
  }

  pub fn clear_tokens(&self) -> std::result::Result<(), ApiError> {
    self
      .storage
      .remove(ACCESS_TOKEN_KEY)
      .and_then(|_| self.storage.remove(REFRESH_TOKEN_KEY))
      .map_err(|e| ApiError::Storage(e.to_string()))
  }

  /// Stored view mode; unreadable or unknown values fall back to the default.
  pub fn view_mode(&self) -> ViewMode {
    self
      .read(VIEW_MODE_KEY)
      .ok()
      .flatten()
      .and_then(|s| s.parse().ok())
      .unwrap_or_default()
  }

  pub fn set_view_mode(&self, mode: ViewMode) -> std::result::Result<(), ApiError> {
    self
      .storage
      .set(VIEW_MODE_KEY, &mode.to_string())
      .map_err(|e| ApiError::Storage(e.to_string()))
  }

  fn read(&self, key: &str) -> std::result::Result<Option<String>, ApiError> {
    self
      .storage
      .get(key)
      .map(|v| v.filter(|s| !s.is_empty()))
      .map_err(|e| ApiError::Storage(e.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pair() -> TokenPair {
    TokenPair {
      access_token: "access".to_string(),
      refresh_token: "refresh".to_string(),
    }
  }

  #[test]
  fn test_sqlite_storage_persists_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("storage.db");

    {
      let storage = SqliteStorage::open(&path).unwrap();
      storage.set("k", "v1").unwrap();
      storage.set("k", "v2").unwrap();
    }

    let storage = SqliteStorage::open(&path).unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));
    storage.remove("k").unwrap();
    assert_eq!(storage.get("k").unwrap(), None);
  }

  #[test]
  fn test_token_store_round_trip() {
    let tokens = TokenStore::new(Arc::new(MemoryStorage::default()));
    assert_eq!(tokens.access_token().unwrap(), None);

    tokens.set_tokens(&pair()).unwrap();
    assert_eq!(tokens.access_token().unwrap().as_deref(), Some("access"));
    assert_eq!(tokens.refresh_token().unwrap().as_deref(), Some("refresh"));

    tokens.clear_tokens().unwrap();
    assert_eq!(tokens.access_token().unwrap(), None);
    assert_eq!(tokens.refresh_token().unwrap(), None);
  }

  #[test]
  fn test_empty_token_counts_as_absent() {
    let storage = Arc::new(MemoryStorage::default());
    storage.set(ACCESS_TOKEN_KEY, "").unwrap();
    let tokens = TokenStore::new(storage);
    assert_eq!(tokens.access_token().unwrap(), None);
  }

  #[test]
  fn test_view_mode_defaults_and_persists() {
    let storage = Arc::new(MemoryStorage::default());
    let tokens = TokenStore::new(storage.clone());
    assert_eq!(tokens.view_mode(), ViewMode::Grid);

    tokens.set_view_mode(ViewMode::List).unwrap();
    assert_eq!(tokens.view_mode(), ViewMode::List);

    storage.set(VIEW_MODE_KEY, "mosaic").unwrap();
    assert_eq!(tokens.view_mode(), ViewMode::Grid);
  }
}
