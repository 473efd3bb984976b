//! `/items` endpoints.

use crate::api::client::Transport;
use crate::api::error::ApiError;
use crate::api::types::{ActionNote, Item, ItemListParams, ItemPage, ItemPatch, NewItem};
use serde::de::IgnoredAny;

pub async fn list(t: &dyn Transport, params: &ItemListParams) -> Result<ItemPage, ApiError> {
  t.get("/items", params).await
}

pub async fn get(t: &dyn Transport, id: &str) -> Result<Item, ApiError> {
  t.get(&format!("/items/{}", id), &()).await
}

pub async fn create(t: &dyn Transport, item: &NewItem) -> Result<Item, ApiError> {
  t.post("/items", item).await
}

pub async fn bulk_create(t: &dyn Transport, items: &[NewItem]) -> Result<Vec<Item>, ApiError> {
  t.post("/items/bulk", &serde_json::json!({ "items": items })).await
}

pub async fn update(t: &dyn Transport, id: &str, patch: &ItemPatch) -> Result<Item, ApiError> {
  t.patch(&format!("/items/{}", id), patch).await
}

pub async fn remove(t: &dyn Transport, id: &str) -> Result<(), ApiError> {
  t.delete::<IgnoredAny>(&format!("/items/{}", id)).await?;
  Ok(())
}

pub async fn archive(t: &dyn Transport, id: &str, note: Option<&str>) -> Result<Item, ApiError> {
  action(t, id, "archive", note).await
}

pub async fn restore(t: &dyn Transport, id: &str, note: Option<&str>) -> Result<Item, ApiError> {
  action(t, id, "restore", note).await
}

pub async fn gift(t: &dyn Transport, id: &str, note: Option<&str>) -> Result<Item, ApiError> {
  action(t, id, "gift", note).await
}

/// Consume one unit.
pub async fn use_one(t: &dyn Transport, id: &str, note: Option<&str>) -> Result<Item, ApiError> {
  action(t, id, "use", note).await
}

async fn action(
  t: &dyn Transport,
  id: &str,
  action: &str,
  note: Option<&str>,
) -> Result<Item, ApiError> {
  let body = ActionNote {
    note: note.map(String::from),
  };
  t.post(&format!("/items/{}/{}", id, action), &body).await
}
