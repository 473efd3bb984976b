//! Transactional cache mutation for optimistic updates.
//!
//! `begin` cancels in-flight requests for the key and snapshots its entry,
//! `apply` writes a locally computed value, then either `commit` (invalidate so
//! the server's value replaces the guess) or `rollback` (restore the snapshot
//! exactly).

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::client::QueryClient;
use super::entry::CacheEntry;
use super::key::QueryKey;
use crate::api::client::decode;
use crate::api::error::ApiError;

/// Pre-mutation copy of one cache entry.
#[derive(Debug, Clone)]
#[must_use = "a snapshot must be committed or rolled back"]
pub struct Snapshot {
  key: QueryKey,
  entry: Option<CacheEntry>,
}

impl Snapshot {
  pub fn key(&self) -> &QueryKey {
    &self.key
  }

  pub fn entry(&self) -> Option<&CacheEntry> {
    self.entry.as_ref()
  }
}

impl QueryClient {
  /// Cancel in-flight requests for `key` and snapshot its entry.
  ///
  /// Cancelling first means a response started before the patch cannot land
  /// on top of it.
  pub fn begin(&self, key: &QueryKey) -> Snapshot {
    self.cancel_queries(key);
    Snapshot {
      key: key.clone(),
      entry: self.get_entry(key),
    }
  }

  /// Replace the cached value of `key` with `patch(current)`.
  pub fn apply<T, F>(&self, key: &QueryKey, patch: F) -> Result<(), ApiError>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce(Option<T>) -> Option<T>,
  {
    let current = match self.get_entry(key).and_then(|e| e.data) {
      Some(data) => Some(decode::<T>(data)?),
      None => None,
    };
    let next = patch(current)
      .map(serde_json::to_value)
      .transpose()?;
    self.write_data(key, next);
    Ok(())
  }

  /// Keep the patch and reconcile with the server.
  pub fn commit(&self, snapshot: Snapshot) -> usize {
    debug!("Committing optimistic update for {}", snapshot.key);
    self.invalidate_queries(&snapshot.key)
  }

  /// Put the entry back exactly as it was before `begin`.
  pub fn rollback(&self, snapshot: Snapshot) {
    debug!("Rolling back optimistic update for {}", snapshot.key);
    self.restore_entry(&snapshot.key, snapshot.entry);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::{Deserialize, Serialize};
  use serde_json::json;

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Profile {
    tags: Vec<String>,
  }

  fn seeded() -> (QueryClient, QueryKey) {
    let client = QueryClient::default();
    let key = QueryKey::new("user");
    client
      .set_query_data(&key, &json!({ "tags": ["tools", "kitchen"] }))
      .unwrap();
    (client, key)
  }

  #[test]
  fn test_apply_then_rollback_restores_exact_entry() {
    let (client, key) = seeded();
    let before = client.get_entry(&key).unwrap();
    let before_bytes = serde_json::to_vec(&before.data).unwrap();

    let snapshot = client.begin(&key);
    client
      .apply::<Profile, _>(&key, |p| {
        p.map(|mut p| {
          p.tags.push("garden".to_string());
          p
        })
      })
      .unwrap();
    assert_eq!(
      client.get_query_data::<Profile>(&key).unwrap().tags,
      vec!["tools", "kitchen", "garden"]
    );

    client.rollback(snapshot);
    let after = client.get_entry(&key).unwrap();
    assert_eq!(after, before);
    assert_eq!(serde_json::to_vec(&after.data).unwrap(), before_bytes);
  }

  #[test]
  fn test_rollback_of_missing_entry_clears_patch() {
    let client = QueryClient::default();
    let key = QueryKey::new("user");
    let snapshot = client.begin(&key);
    client
      .apply::<Profile, _>(&key, |_| {
        Some(Profile {
          tags: vec!["x".to_string()],
        })
      })
      .unwrap();

    client.rollback(snapshot);
    assert_eq!(client.get_query_data::<Profile>(&key), None);
  }

  #[test]
  fn test_apply_with_mismatched_shape_fails_without_writing() {
    let client = QueryClient::default();
    let key = QueryKey::new("user");
    client.set_query_data(&key, &json!("not a profile")).unwrap();

    let result = client.apply::<Profile, _>(&key, |p| p);
    assert!(matches!(result, Err(ApiError::Decode(_))));
    assert_eq!(
      client.get_query_data::<serde_json::Value>(&key),
      Some(json!("not a profile"))
    );
  }

  #[tokio::test]
  async fn test_commit_invalidates() {
    let (client, key) = seeded();
    let snapshot = client.begin(&key);
    client.commit(snapshot);
    assert!(client.get_entry(&key).unwrap().is_invalidated);
  }
}
