//! User-scoped tag and location lists.
//!
//! Both live on the cached user profile, so add and remove patch that entry
//! optimistically and roll it back if the server refuses.

use crate::api::error::ApiError;
use crate::api::types::UserProfile;
use crate::api::{locations, tags};
use crate::context::AppContext;

use super::keys;
use super::mutation::{reject, run_optimistic};

/// Cap on each of a user's tag and location lists
pub const MAX_VOCABULARY_ENTRIES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularyKind {
  Tags,
  Locations,
}

impl VocabularyKind {
  fn noun(self) -> &'static str {
    match self {
      VocabularyKind::Tags => "tag",
      VocabularyKind::Locations => "location",
    }
  }

  fn entries(self, profile: &UserProfile) -> &Vec<String> {
    match self {
      VocabularyKind::Tags => &profile.tags,
      VocabularyKind::Locations => &profile.locations,
    }
  }

  fn entries_mut(self, profile: &mut UserProfile) -> &mut Vec<String> {
    match self {
      VocabularyKind::Tags => &mut profile.tags,
      VocabularyKind::Locations => &mut profile.locations,
    }
  }
}

pub struct VocabularyHooks<'a> {
  ctx: &'a AppContext,
  kind: VocabularyKind,
}

impl<'a> VocabularyHooks<'a> {
  pub(crate) fn new(ctx: &'a AppContext, kind: VocabularyKind) -> Self {
    Self { ctx, kind }
  }

  /// Entries on the cached profile.
  pub fn list(&self) -> Vec<String> {
    self
      .ctx
      .queries
      .get_query_data::<UserProfile>(&keys::user())
      .map(|p| self.kind.entries(&p).clone())
      .unwrap_or_default()
  }

  pub async fn add(&self, name: &str) -> Result<Vec<String>, ApiError> {
    let fallback = format!("Failed to add {}", self.kind.noun());
    let name = name.trim().to_string();

    if name.is_empty() {
      return reject(self.ctx, &fallback, format!("{} name is required", capitalize(self.kind.noun())));
    }
    let current = self.list();
    if current.iter().any(|e| e.eq_ignore_ascii_case(&name)) {
      return reject(self.ctx, &fallback, format!("\"{}\" already exists", name));
    }
    if current.len() >= MAX_VOCABULARY_ENTRIES {
      return reject(
        self.ctx,
        &fallback,
        format!(
          "You can have at most {} {}s",
          MAX_VOCABULARY_ENTRIES,
          self.kind.noun()
        ),
      );
    }

    let kind = self.kind;
    let added = name.clone();
    run_optimistic(
      self.ctx,
      &fallback,
      &keys::user(),
      move |profile: Option<UserProfile>| {
        profile.map(|mut p| {
          kind.entries_mut(&mut p).push(added);
          p
        })
      },
      self.write(&name, true),
      &[],
    )
    .await
  }

  /// Items carrying the entry lose it server-side, so listings and stats are
  /// refreshed as well.
  pub async fn remove(&self, name: &str) -> Result<Vec<String>, ApiError> {
    let fallback = format!("Failed to remove {}", self.kind.noun());
    let kind = self.kind;
    let removed = name.to_string();

    run_optimistic(
      self.ctx,
      &fallback,
      &keys::user(),
      move |profile: Option<UserProfile>| {
        profile.map(|mut p| {
          kind.entries_mut(&mut p).retain(|e| e != &removed);
          p
        })
      },
      self.write(name, false),
      &[keys::items(), keys::stats()],
    )
    .await
  }

  async fn write(&self, name: &str, add: bool) -> Result<Vec<String>, ApiError> {
    let t = self.ctx.transport.as_ref();
    match (self.kind, add) {
      (VocabularyKind::Tags, true) => tags::add(t, name).await.map(|l| l.tags),
      (VocabularyKind::Tags, false) => tags::remove(t, name).await.map(|l| l.tags),
      (VocabularyKind::Locations, true) => locations::add(t, name).await.map(|l| l.locations),
      (VocabularyKind::Locations, false) => locations::remove(t, name).await.map(|l| l.locations),
    }
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
