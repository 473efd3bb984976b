//! Current user profile and preferences.

use crate::api::error::ApiError;
use crate::api::types::{Preferences, ProfilePatch, UserProfile};
use crate::api::users;
use crate::context::AppContext;
use crate::query::Query;

use super::keys;
use super::mutation::{reject, run};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 30;

/// Usernames are 3-30 ASCII letters, digits or underscores.
pub fn validate_username(username: &str) -> Result<(), String> {
  let len = username.chars().count();
  if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
    return Err(format!(
      "Username must be between {} and {} characters",
      USERNAME_MIN, USERNAME_MAX
    ));
  }
  if !username
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || c == '_')
  {
    return Err("Username may only contain letters, numbers and underscores".to_string());
  }
  Ok(())
}

pub struct UserHooks<'a> {
  ctx: &'a AppContext,
}

impl<'a> UserHooks<'a> {
  pub(crate) fn new(ctx: &'a AppContext) -> Self {
    Self { ctx }
  }

  pub fn me(&self) -> Query<UserProfile> {
    let transport = self.ctx.transport.clone();
    Query::new(&self.ctx.queries, keys::user(), move || {
      let transport = transport.clone();
      async move { users::me(transport.as_ref()).await }
    })
    .enabled(self.ctx.signed_in())
  }

  pub async fn update_profile(&self, patch: ProfilePatch) -> Result<UserProfile, ApiError> {
    const FALLBACK: &str = "Failed to update profile";

    if let Some(username) = &patch.username {
      if let Err(message) = validate_username(username) {
        return reject(self.ctx, FALLBACK, message);
      }
    }

    let profile = run(
      self.ctx,
      FALLBACK,
      &[keys::user()],
      users::update_me(self.ctx.transport.as_ref(), &patch),
    )
    .await?;
    self.ctx.session.set_user(profile.clone());
    Ok(profile)
  }

  /// Currency changes how stats render totals.
  pub async fn update_preferences(&self, preferences: Preferences) -> Result<UserProfile, ApiError> {
    let profile = run(
      self.ctx,
      "Failed to update preferences",
      &[keys::user(), keys::stats()],
      users::update_preferences(self.ctx.transport.as_ref(), &preferences),
    )
    .await?;
    self.ctx.session.set_user(profile.clone());
    Ok(profile)
  }
}
