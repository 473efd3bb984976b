//! Cache entries and their status.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::api::error::ApiError;

/// Lifecycle of one cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
  /// Never fetched
  Idle,
  /// A request is in flight (previous data, if any, is kept)
  Loading,
  /// Last request succeeded
  Success,
  /// Last request failed (previous data, if any, is kept)
  Error,
}

/// What the cache knows about one query key.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
  pub data: Option<Value>,
  pub status: QueryStatus,
  pub last_fetched_at: Option<DateTime<Utc>>,
  pub error: Option<ApiError>,
  /// Marked stale by an invalidation; cleared by the next successful fetch
  pub is_invalidated: bool,
}

impl Default for CacheEntry {
  fn default() -> Self {
    Self {
      data: None,
      status: QueryStatus::Idle,
      last_fetched_at: None,
      error: None,
      is_invalidated: false,
    }
  }
}

impl CacheEntry {
  /// Check if the data is older than `stale_time` or was invalidated.
  pub fn is_stale(&self, stale_time: Duration) -> bool {
    if self.is_invalidated {
      return true;
    }
    match self.last_fetched_at {
      Some(fetched_at) => Utc::now() - fetched_at >= stale_time,
      None => true,
    }
  }

  /// Data that can be served without touching the network.
  pub fn fresh_data(&self, stale_time: Duration) -> Option<&Value> {
    match &self.data {
      Some(data) if !self.is_stale(stale_time) => Some(data),
      _ => None,
    }
  }

  pub(crate) fn succeed(&mut self, data: Value) {
    self.data = Some(data);
    self.status = QueryStatus::Success;
    self.last_fetched_at = Some(Utc::now());
    self.error = None;
  }

  pub(crate) fn fail(&mut self, error: ApiError) {
    self.status = QueryStatus::Error;
    self.error = Some(error);
  }

  /// Status to fall back to when an in-flight request is dropped.
  pub(crate) fn settle_idle(&mut self) {
    if self.status == QueryStatus::Loading {
      self.status = if self.data.is_some() {
        QueryStatus::Success
      } else {
        QueryStatus::Idle
      };
    }
  }
}
