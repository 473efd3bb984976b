//! `/users/me` endpoints.

use crate::api::client::Transport;
use crate::api::error::ApiError;
use crate::api::types::{Preferences, ProfilePatch, UserProfile};

pub async fn me(t: &dyn Transport) -> Result<UserProfile, ApiError> {
  t.get("/users/me", &()).await
}

pub async fn update_me(t: &dyn Transport, patch: &ProfilePatch) -> Result<UserProfile, ApiError> {
  t.patch("/users/me", patch).await
}

pub async fn update_preferences(
  t: &dyn Transport,
  preferences: &Preferences,
) -> Result<UserProfile, ApiError> {
  t.patch("/users/me/preferences", preferences).await
}
