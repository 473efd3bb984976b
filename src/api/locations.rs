//! User-scoped location vocabulary.

use crate::api::client::Transport;
use crate::api::error::ApiError;
use crate::api::types::{LocationList, NewVocabularyEntry};

pub async fn add(t: &dyn Transport, name: &str) -> Result<LocationList, ApiError> {
  let body = NewVocabularyEntry {
    name: name.to_string(),
  };
  t.post("/locations", &body).await
}

pub async fn remove(t: &dyn Transport, name: &str) -> Result<LocationList, ApiError> {
  t.delete(&format!("/locations/{}", super::encode_segment(name)))
    .await
}
