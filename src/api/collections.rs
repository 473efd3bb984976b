//! `/collections` endpoints.

use crate::api::client::Transport;
use crate::api::error::ApiError;
use crate::api::types::{
  AddCollectionItem, Collection, CollectionPatch, NewCollection, ReorderEntry, SharePatch,
  ShareSettings,
};
use serde::de::IgnoredAny;

pub async fn list(t: &dyn Transport) -> Result<Vec<Collection>, ApiError> {
  t.get("/collections", &()).await
}

pub async fn get(t: &dyn Transport, id: &str) -> Result<Collection, ApiError> {
  t.get(&format!("/collections/{}", id), &()).await
}

pub async fn create(t: &dyn Transport, collection: &NewCollection) -> Result<Collection, ApiError> {
  t.post("/collections", collection).await
}

pub async fn update(
  t: &dyn Transport,
  id: &str,
  patch: &CollectionPatch,
) -> Result<Collection, ApiError> {
  t.patch(&format!("/collections/{}", id), patch).await
}

pub async fn remove(t: &dyn Transport, id: &str) -> Result<(), ApiError> {
  t.delete::<IgnoredAny>(&format!("/collections/{}", id))
    .await?;
  Ok(())
}

pub async fn add_item(
  t: &dyn Transport,
  id: &str,
  item: &AddCollectionItem,
) -> Result<Collection, ApiError> {
  t.post(&format!("/collections/{}/items", id), item).await
}

pub async fn remove_item(t: &dyn Transport, id: &str, item_id: &str) -> Result<(), ApiError> {
  t.delete::<IgnoredAny>(&format!("/collections/{}/items/{}", id, item_id))
    .await?;
  Ok(())
}

/// Replace the order of every member in one call.
pub async fn reorder(t: &dyn Transport, id: &str, order: &[ReorderEntry]) -> Result<(), ApiError> {
  t.put::<IgnoredAny>(&format!("/collections/{}/items/reorder", id), &order)
    .await?;
  Ok(())
}

pub async fn update_share(
  t: &dyn Transport,
  id: &str,
  patch: &SharePatch,
) -> Result<ShareSettings, ApiError> {
  t.patch(&format!("/collections/{}/share", id), patch).await
}
