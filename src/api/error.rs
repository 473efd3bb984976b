//! Error type shared by the transport, resource modules and hooks.

use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::error_message::server_message;

/// Errors surfaced by the API layer.
///
/// Cloneable so a single in-flight request can hand the same failure to every
/// caller that joined it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
  /// The request did not complete within the configured ceiling
  #[error("Request timed out after {}s", .0.as_secs())]
  Timeout(Duration),

  /// Connection-level failure (DNS, refused, reset)
  #[error("Network error: {0}")]
  Network(String),

  /// Non-success HTTP status
  #[error("{message}")]
  Http {
    status: u16,
    message: String,
    body: Option<Value>,
  },

  /// The response did not match the expected shape
  #[error("Failed to decode response: {0}")]
  Decode(String),

  /// Rejected locally before any request was made
  #[error("{0}")]
  Validation(String),

  /// AI credits exhausted for today
  #[error("{0}")]
  QuotaExceeded(String),

  /// Persisted client state could not be read or written
  #[error("Storage error: {0}")]
  Storage(String),

  /// The request was superseded before it settled
  #[error("Request was cancelled")]
  Cancelled,
}

impl ApiError {
  /// Build an HTTP error from a status and the (possibly empty) parsed body.
  pub fn from_response(status: u16, body: Option<Value>) -> Self {
    let message = body
      .as_ref()
      .and_then(server_message)
      .unwrap_or_else(|| format!("request failed with status {}", status));

    ApiError::Http {
      status,
      message,
      body,
    }
  }

  pub fn status(&self) -> Option<u16> {
    match self {
      ApiError::Http { status, .. } => Some(*status),
      _ => None,
    }
  }

  pub fn is_unauthorized(&self) -> bool {
    self.status() == Some(401)
  }

  /// Loosely-typed view of this error, in the shape the message extractor
  /// understands. Server errors carry only `response.data`, so a body without
  /// a usable message falls through to the caller's fallback.
  pub fn to_value(&self) -> Value {
    match self {
      ApiError::Http { status, body, .. } => json!({
        "response": { "status": status, "data": body.clone().unwrap_or(Value::Null) },
      }),
      other => json!({ "message": other.to_string() }),
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      ApiError::Timeout(Duration::from_secs(crate::api::DEFAULT_TIMEOUT_SECS))
    } else if e.is_decode() {
      ApiError::Decode(e.to_string())
    } else {
      ApiError::Network(e.to_string())
    }
  }
}

impl From<serde_json::Error> for ApiError {
  fn from(e: serde_json::Error) -> Self {
    ApiError::Decode(e.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error_message::extract_error_message;

  #[test]
  fn test_body_message_is_used() {
    let err = ApiError::from_response(400, Some(json!({ "message": "Name is required" })));
    assert_eq!(err.to_string(), "Name is required");
    assert_eq!(err.status(), Some(400));
  }

  #[test]
  fn test_list_message_is_joined() {
    let err = ApiError::from_response(422, Some(json!({ "message": ["a", "b"] })));
    assert_eq!(err.to_string(), "a, b");
  }

  #[test]
  fn test_missing_body_uses_generic_message() {
    let err = ApiError::from_response(502, None);
    assert_eq!(err.to_string(), "request failed with status 502");
  }

  #[test]
  fn test_to_value_keeps_server_body() {
    let err = ApiError::from_response(409, Some(json!({ "error": "Tag exists" })));
    let value = err.to_value();
    assert_eq!(value["response"]["data"]["error"], "Tag exists");
    assert!(value.get("message").is_none());
  }

  #[test]
  fn test_nested_body_message_reaches_extractor() {
    let err = ApiError::from_response(
      400,
      Some(json!({ "message": { "message": "Tag 'misc' is not configured" } })),
    );
    assert_eq!(err.to_string(), "Tag 'misc' is not configured");
    assert_eq!(
      extract_error_message(&err.to_value(), "Failed to add item"),
      "Tag 'misc' is not configured"
    );
  }

  #[test]
  fn test_string_body_reaches_extractor() {
    let err = ApiError::from_response(502, Some(json!("Upstream unavailable")));
    assert_eq!(err.to_string(), "Upstream unavailable");
    assert_eq!(
      extract_error_message(&err.to_value(), "Failed to load items"),
      "Upstream unavailable"
    );
  }

  #[test]
  fn test_opaque_body_uses_caller_fallback() {
    let err = ApiError::from_response(500, Some(json!({ "statusCode": 500 })));
    assert_eq!(err.to_string(), "request failed with status 500");
    assert_eq!(
      extract_error_message(&err.to_value(), "Failed to load items"),
      "Failed to load items"
    );
  }
}
