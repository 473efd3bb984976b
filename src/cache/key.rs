//! Structural query keys.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::warn;

/// Identifies one cached result set.
///
/// A key is an ordered tuple of JSON values, e.g. `["items", {"page": 2}]`.
/// Two keys are equal iff their tuples are deeply equal; object field order
/// never matters because objects serialize with sorted keys.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryKey(Vec<Value>);

impl QueryKey {
  /// Start a key with its resource name.
  pub fn new(root: &str) -> Self {
    Self(vec![Value::String(root.to_string())])
  }

  /// Append one structural component.
  pub fn with(mut self, part: impl Serialize) -> Self {
    let value = serde_json::to_value(part).unwrap_or_else(|e| {
      warn!("Query key component is not serializable: {}", e);
      Value::Null
    });
    self.0.push(value);
    self
  }

  pub fn parts(&self) -> &[Value] {
    &self.0
  }

  /// True when `prefix` matches the leading components of this key.
  pub fn starts_with(&self, prefix: &QueryKey) -> bool {
    self.0.starts_with(&prefix.0)
  }

  /// Compact JSON with sorted object keys.
  pub fn canonical(&self) -> String {
    serde_json::to_string(&self.0).unwrap_or_default()
  }

  /// SHA256 of the canonical form, used to address cache slots.
  pub fn cache_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.canonical().as_bytes());
    hex::encode(hasher.finalize())
  }
}

impl fmt::Display for QueryKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.canonical())
  }
}
