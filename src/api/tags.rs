//! User-scoped tag vocabulary.

use crate::api::client::Transport;
use crate::api::error::ApiError;
use crate::api::types::{NewVocabularyEntry, TagList};

pub async fn add(t: &dyn Transport, name: &str) -> Result<TagList, ApiError> {
  let body = NewVocabularyEntry {
    name: name.to_string(),
  };
  t.post("/tags", &body).await
}

/// Tags are addressed by name.
pub async fn remove(t: &dyn Transport, name: &str) -> Result<TagList, ApiError> {
  t.delete(&format!("/tags/{}", super::encode_segment(name)))
    .await
}
