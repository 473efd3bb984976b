//! Transport and per-resource API modules.
//!
//! Resource modules are flat functions that map one backend operation to
//! exactly one transport call. They never cache, retry or apply business
//! rules; that is the job of [`crate::hooks`].

pub mod ai;
pub mod auth;
pub mod client;
pub mod collections;
pub mod error;
pub mod items;
pub mod locations;
#[cfg(test)]
pub mod mock;
pub mod share;
pub mod stats;
pub mod tags;
pub mod types;
pub mod uploads;
pub mod users;

pub use client::{ApiClient, ApiRequest, Body, Method, Transport, Upload};
pub use error::ApiError;

/// Request ceiling used when the configuration does not override it
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Percent-encode a single path segment (tag and location names may contain spaces).
pub(crate) fn encode_segment(segment: &str) -> String {
  url::form_urlencoded::byte_serialize(segment.as_bytes())
    .collect::<String>()
    .replace('+', "%20")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::mock::MockTransport;
  use crate::api::types::{ItemListParams, NewItem, ReorderEntry};
  use serde_json::json;

  #[test]
  fn test_encode_segment() {
    assert_eq!(encode_segment("Living Room"), "Living%20Room");
    assert_eq!(encode_segment("a/b"), "a%2Fb");
  }

  #[tokio::test]
  async fn test_item_action_sends_note() {
    let mock = MockTransport::new();
    mock.on(Method::Post, "/items/i1/gift", Ok(json!({ "id": "i1", "name": "Vase" })));

    let item = items::gift(&mock, "i1", Some("for Alex")).await.unwrap();
    assert_eq!(item.id, "i1");

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body, Body::Json(json!({ "note": "for Alex" })));
  }

  #[tokio::test]
  async fn test_list_sends_only_set_params() {
    let mock = MockTransport::new();
    mock.on(Method::Get, "/items", Ok(json!({ "items": [], "total": 0, "totalPages": 0 })));

    let params = ItemListParams {
      tag: Some("tools".to_string()),
      page: Some(2),
      ..Default::default()
    };
    items::list(&mock, &params).await.unwrap();

    assert_eq!(
      mock.calls()[0].query,
      vec![
        ("page".to_string(), "2".to_string()),
        ("tag".to_string(), "tools".to_string()),
      ]
    );
  }

  #[tokio::test]
  async fn test_delete_accepts_empty_and_json_bodies() {
    let mock = MockTransport::new();
    mock.on(Method::Delete, "/items/i1", Ok(serde_json::Value::Null));
    mock.on(Method::Delete, "/items/i2", Ok(json!({ "success": true })));

    items::remove(&mock, "i1").await.unwrap();
    items::remove(&mock, "i2").await.unwrap();
  }

  #[tokio::test]
  async fn test_bulk_create_wraps_items() {
    let mock = MockTransport::new();
    mock.on(Method::Post, "/items/bulk", Ok(json!([])));

    items::bulk_create(&mock, &[NewItem::named("Hammer")])
      .await
      .unwrap();
    assert_eq!(
      mock.calls()[0].body,
      Body::Json(json!({ "items": [{ "name": "Hammer", "quantity": 1 }] }))
    );
  }

  #[tokio::test]
  async fn test_reorder_sends_bare_array() {
    let mock = MockTransport::new();
    mock.on(Method::Put, "/collections/c1/items/reorder", Ok(serde_json::Value::Null));

    let order = vec![ReorderEntry {
      item_id: "a".to_string(),
      order: 0,
    }];
    collections::reorder(&mock, "c1", &order).await.unwrap();
    assert_eq!(
      mock.calls()[0].body,
      Body::Json(json!([{ "itemId": "a", "order": 0 }]))
    );
  }

  #[tokio::test]
  async fn test_shared_collection_is_anonymous() {
    let mock = MockTransport::new();
    mock.on(
      Method::Get,
      "/share/collection/s1",
      Ok(json!({ "id": "c1", "name": "Vinyl" })),
    );

    let collection = share::get_shared_collection(&mock, "s1").await.unwrap();
    assert_eq!(collection.name, "Vinyl");
    assert!(!mock.calls()[0].authenticated);
  }

  #[tokio::test]
  async fn test_upload_is_multipart() {
    let mock = MockTransport::new();
    mock.on(Method::Post, "/uploads/image", Ok(json!({ "url": "https://cdn/x.png" })));

    let url = uploads::upload_image(&mock, Upload::image("x.png", vec![0u8; 4]))
      .await
      .unwrap();
    assert_eq!(url, "https://cdn/x.png");
    assert!(matches!(mock.calls()[0].body, Body::Multipart(_)));
  }

  #[tokio::test]
  async fn test_tag_remove_tolerates_empty_body() {
    let mock = MockTransport::new();
    mock.on(Method::Delete, "/tags/garage%20shelf", Ok(serde_json::Value::Null));

    let list = tags::remove(&mock, "garage shelf").await.unwrap();
    assert!(list.tags.is_empty());
  }
}
