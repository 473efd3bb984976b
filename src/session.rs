//! Authentication session lifecycle.
//!
//! `Initializing → Authenticated | Anonymous`. Front ends hold rendering until
//! [`Session::wait_ready`] resolves.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::error::ApiError;
use crate::api::types::{LoginRequest, RegisterRequest, UserProfile};
use crate::api::{auth, users, Transport};
use crate::cache::QueryClient;
use crate::hooks::keys;
use crate::hooks::users::validate_username;
use crate::storage::TokenStore;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
  Initializing,
  Authenticated(UserProfile),
  Anonymous,
}

impl SessionState {
  pub fn is_ready(&self) -> bool {
    !matches!(self, SessionState::Initializing)
  }
}

/// Explicitly owned auth state, shared by clones.
#[derive(Clone)]
pub struct Session {
  state: Arc<watch::Sender<SessionState>>,
  transport: Arc<dyn Transport>,
  tokens: TokenStore,
  queries: QueryClient,
}

impl Session {
  pub fn new(transport: Arc<dyn Transport>, tokens: TokenStore, queries: QueryClient) -> Self {
    let (state, _) = watch::channel(SessionState::Initializing);
    Self {
      state: Arc::new(state),
      transport,
      tokens,
      queries,
    }
  }

  pub fn state(&self) -> SessionState {
    self.state.borrow().clone()
  }

  pub fn user(&self) -> Option<UserProfile> {
    match &*self.state.borrow() {
      SessionState::Authenticated(user) => Some(user.clone()),
      _ => None,
    }
  }

  pub fn is_authenticated(&self) -> bool {
    matches!(&*self.state.borrow(), SessionState::Authenticated(_))
  }

  pub fn subscribe(&self) -> watch::Receiver<SessionState> {
    self.state.subscribe()
  }

  /// Resolve once the session has left `Initializing`.
  pub async fn wait_ready(&self) -> SessionState {
    let mut rx = self.state.subscribe();
    let state = match rx.wait_for(SessionState::is_ready).await {
      Ok(state) => state.clone(),
      // The sender lives as long as `self`
      Err(_) => SessionState::Anonymous,
    };
    state
  }

  /// Decide the startup state from persisted tokens.
  ///
  /// A failed profile fetch leaves the session anonymous but keeps the
  /// tokens: a transient failure must not force a new login.
  pub async fn bootstrap(&self) -> SessionState {
    let token = match self.tokens.access_token() {
      Ok(token) => token,
      Err(e) => {
        warn!("Could not read stored session: {}", e);
        None
      }
    };

    let next = match token {
      None => {
        debug!("No stored token, starting anonymous");
        SessionState::Anonymous
      }
      Some(_) => match users::me(self.transport.as_ref()).await {
        Ok(profile) => {
          info!("Restored session for {}", profile.email);
          self.cache_user(&profile);
          SessionState::Authenticated(profile)
        }
        Err(e) => {
          warn!("Failed to restore session: {}", e);
          SessionState::Anonymous
        }
      },
    };

    self.state.send_replace(next.clone());
    next
  }

  pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
    let credentials = LoginRequest {
      email: email.trim().to_string(),
      password: password.to_string(),
    };
    let response = auth::login(self.transport.as_ref(), &credentials).await?;
    self.tokens.set_tokens(&response.tokens)?;
    info!("Signed in as {}", response.user.email);
    self.set_user(response.user.clone());
    Ok(response.user)
  }

  pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, ApiError> {
    validate_username(&request.username).map_err(ApiError::Validation)?;
    let response = auth::register(self.transport.as_ref(), &request).await?;
    self.tokens.set_tokens(&response.tokens)?;
    info!("Registered {}", response.user.email);
    self.set_user(response.user.clone());
    Ok(response.user)
  }

  /// Best-effort server logout, then an unconditional local clear.
  pub async fn logout(&self) {
    let refresh = self.tokens.refresh_token().ok().flatten();
    if let Err(e) = auth::logout(self.transport.as_ref(), refresh.as_deref()).await {
      warn!("Server logout failed: {}", e);
    }
    if let Err(e) = self.tokens.clear_tokens() {
      warn!("Failed to clear stored tokens: {}", e);
    }
    self.queries.clear();
    self.state.send_replace(SessionState::Anonymous);
    info!("Signed out");
  }

  /// Replace the signed-in user (after login or a profile update).
  pub fn set_user(&self, profile: UserProfile) {
    self.cache_user(&profile);
    self.state.send_replace(SessionState::Authenticated(profile));
  }

  fn cache_user(&self, profile: &UserProfile) {
    if let Err(e) = self.queries.set_query_data(&keys::user(), profile) {
      warn!("Failed to cache user profile: {}", e);
    }
  }
}
