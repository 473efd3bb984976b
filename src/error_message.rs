//! Turn an error of unknown shape into one line of display text.
//!
//! The backend wraps errors inconsistently: a plain string, `{message}`,
//! `{message: {message}}`, a list of validation messages, or the same shapes
//! nested under `response.data`. Recognized shapes, first match wins:
//!
//! 1. a string
//! 2. `message` (string, nested `message.message`, or list)
//! 3. `response.data.message`, then `response.data.error`, unwrapped the same way
//! 4. top-level `error`
//! 5. the caller's fallback

use serde_json::Value;

pub fn extract_error_message(error: &Value, fallback: &str) -> String {
  if let Value::String(s) = error {
    return non_empty(s).unwrap_or_else(|| fallback.to_string());
  }

  if let Some(message) = error.get("message").and_then(unwrap_message) {
    return message;
  }

  if let Some(message) = error
    .get("response")
    .and_then(|r| r.get("data"))
    .and_then(server_message)
  {
    return message;
  }

  if let Some(message) = error.get("error").and_then(unwrap_message) {
    return message;
  }

  fallback.to_string()
}

/// Message carried by a server response body: `message`, then `error`, each
/// unwrapped like a top-level message. Some endpoints answer with a bare string.
pub fn server_message(body: &Value) -> Option<String> {
  if let Value::String(s) = body {
    return non_empty(s);
  }
  ["message", "error"]
    .iter()
    .find_map(|field| body.get(field).and_then(unwrap_message))
}

/// A string, an object carrying its own `message` string, or a list of strings.
fn unwrap_message(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => non_empty(s),
    Value::Object(_) => value
      .get("message")
      .and_then(Value::as_str)
      .and_then(non_empty),
    Value::Array(items) => {
      let parts: Vec<String> = items.iter().filter_map(unwrap_message).collect();
      (!parts.is_empty()).then(|| parts.join(", "))
    }
    _ => None,
  }
}

fn non_empty(s: &str) -> Option<String> {
  let trimmed = s.trim();
  (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  const FALLBACK: &str = "Failed to add item";

  #[test]
  fn test_plain_string() {
    assert_eq!(
      extract_error_message(&json!("plain string error"), FALLBACK),
      "plain string error"
    );
  }

  #[test]
  fn test_message_field() {
    assert_eq!(
      extract_error_message(&json!({ "message": "simple" }), FALLBACK),
      "simple"
    );
  }

  #[test]
  fn test_nested_message() {
    assert_eq!(
      extract_error_message(&json!({ "message": { "message": "nested" } }), FALLBACK),
      "nested"
    );
  }

  #[test]
  fn test_response_data_list_message() {
    let error = json!({ "response": { "data": { "message": ["a", "b"] } } });
    assert_eq!(extract_error_message(&error, FALLBACK), "a, b");
  }

  #[test]
  fn test_response_data_error() {
    let error = json!({ "response": { "data": { "error": "Tag limit reached" } } });
    assert_eq!(extract_error_message(&error, FALLBACK), "Tag limit reached");
  }

  #[test]
  fn test_response_data_nested_message() {
    let error = json!({ "response": { "data": { "message": { "message": "deep" } } } });
    assert_eq!(extract_error_message(&error, FALLBACK), "deep");
  }

  #[test]
  fn test_top_level_error() {
    assert_eq!(
      extract_error_message(&json!({ "error": "Forbidden" }), FALLBACK),
      "Forbidden"
    );
  }

  #[test]
  fn test_fallback() {
    assert_eq!(extract_error_message(&json!({}), FALLBACK), FALLBACK);
    assert_eq!(extract_error_message(&json!(null), FALLBACK), FALLBACK);
    assert_eq!(extract_error_message(&json!(""), FALLBACK), FALLBACK);
    assert_eq!(
      extract_error_message(&json!({ "message": 42 }), FALLBACK),
      FALLBACK
    );
  }

  #[test]
  fn test_server_message_shapes() {
    assert_eq!(server_message(&json!("Bad gateway")).as_deref(), Some("Bad gateway"));
    assert_eq!(
      server_message(&json!({ "message": { "message": "nested" } })).as_deref(),
      Some("nested")
    );
    assert_eq!(
      server_message(&json!({ "error": ["x", "y"] })).as_deref(),
      Some("x, y")
    );
    assert_eq!(server_message(&json!({ "statusCode": 500 })), None);
  }

  #[test]
  fn test_message_wins_over_response_body() {
    let error = json!({
      "message": "outer",
      "response": { "data": { "message": "inner" } }
    });
    assert_eq!(extract_error_message(&error, FALLBACK), "outer");
  }
}
