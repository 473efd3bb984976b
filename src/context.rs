//! Application root: owns the transport, cache, session and notifier, and
//! hands out hook accessors that borrow them.

use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use tracing::info;

use crate::api::{ApiClient, Transport};
use crate::cache::QueryClient;
use crate::config::Config;
use crate::hooks::{
  AiHooks, CollectionHooks, ItemHooks, StatsHooks, UserHooks, VocabularyHooks, VocabularyKind,
};
use crate::notify::Notifier;
use crate::session::Session;
use crate::storage::{LocalStorage, MemoryStorage, SqliteStorage, TokenStore};

/// Shared services, cheap to clone.
#[derive(Clone)]
pub struct AppContext {
  pub transport: Arc<dyn Transport>,
  pub queries: QueryClient,
  pub notifier: Arc<dyn Notifier>,
  pub tokens: TokenStore,
  pub session: Session,
}

impl AppContext {
  pub fn new(
    transport: Arc<dyn Transport>,
    tokens: TokenStore,
    notifier: Arc<dyn Notifier>,
    queries: QueryClient,
  ) -> Self {
    let session = Session::new(transport.clone(), tokens.clone(), queries.clone());
    Self {
      transport,
      queries,
      notifier,
      tokens,
      session,
    }
  }

  /// Build the production stack: SQLite-backed storage and the HTTP client.
  pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
    let storage: Arc<dyn LocalStorage> = if config.storage.ephemeral {
      Arc::new(MemoryStorage::default())
    } else {
      let path = match &config.storage.path {
        Some(path) => path.clone(),
        None => SqliteStorage::default_path()?,
      };
      info!("Using storage at {}", path.display());
      Arc::new(SqliteStorage::open(&path)?)
    };

    let tokens = TokenStore::new(storage);
    let client = ApiClient::new(&config.api, tokens.clone())
      .map_err(|e| eyre!("Failed to create API client: {}", e))?;
    let queries = QueryClient::new(config.cache.stale_time());

    Ok(Self::new(Arc::new(client), tokens, notifier, queries))
  }

  pub fn items(&self) -> ItemHooks<'_> {
    ItemHooks::new(self)
  }

  pub fn collections(&self) -> CollectionHooks<'_> {
    CollectionHooks::new(self)
  }

  pub fn tags(&self) -> VocabularyHooks<'_> {
    VocabularyHooks::new(self, VocabularyKind::Tags)
  }

  pub fn locations(&self) -> VocabularyHooks<'_> {
    VocabularyHooks::new(self, VocabularyKind::Locations)
  }

  pub fn users(&self) -> UserHooks<'_> {
    UserHooks::new(self)
  }

  pub fn stats(&self) -> StatsHooks<'_> {
    StatsHooks::new(self)
  }

  pub fn ai(&self) -> AiHooks<'_> {
    AiHooks::new(self)
  }

  /// User-scoped queries stay disabled until someone is signed in.
  pub(crate) fn signed_in(&self) -> bool {
    self.session.is_authenticated()
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::api::mock::MockTransport;
  use crate::api::types::UserProfile;
  use crate::hooks::keys;
  use crate::notify::RecordingNotifier;
  use serde_json::json;

  pub(crate) fn sample_profile() -> UserProfile {
    serde_json::from_value(json!({
      "id": "u1",
      "name": "Sam",
      "email": "sam@example.com",
      "username": "sam",
      "tags": ["tools", "kitchen"],
      "locations": ["Garage"]
    }))
    .unwrap()
  }

  /// A signed-in context over a scripted transport, with the profile cached.
  pub(crate) fn test_context(mock: &MockTransport) -> (AppContext, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let tokens = TokenStore::new(Arc::new(MemoryStorage::default()));
    let ctx = AppContext::new(
      Arc::new(mock.clone()),
      tokens,
      Arc::new(notifier.clone()),
      QueryClient::default(),
    );
    let profile = sample_profile();
    ctx.queries.set_query_data(&keys::user(), &profile).unwrap();
    ctx.session.set_user(profile);
    (ctx, notifier)
  }

  #[test]
  fn test_from_config_with_ephemeral_storage() {
    let mut config = Config::default();
    config.storage.ephemeral = true;
    let ctx = AppContext::from_config(&config, Arc::new(RecordingNotifier::new())).unwrap();
    assert!(!ctx.signed_in());
    assert_eq!(ctx.tokens.access_token().unwrap(), None);
  }

  #[test]
  fn test_from_config_rejects_bad_url() {
    let mut config = Config::default();
    config.storage.ephemeral = true;
    config.api.url = "not a url".to_string();
    assert!(AppContext::from_config(&config, Arc::new(RecordingNotifier::new())).is_err());
  }
}
