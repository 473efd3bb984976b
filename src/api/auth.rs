//! Session endpoints. All of them are sent without the bearer token except logout.

use crate::api::client::{decode, ApiRequest, Method, Transport};
use crate::api::error::ApiError;
use crate::api::types::{AuthResponse, LoginRequest, RegisterRequest, TokenPair};
use serde_json::json;

pub async fn login(t: &dyn Transport, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
  let request = ApiRequest::new(Method::Post, "/auth/login")
    .json(serde_json::to_value(credentials)?)
    .anonymous();
  decode(t.send(request).await?)
}

pub async fn register(
  t: &dyn Transport,
  registration: &RegisterRequest,
) -> Result<AuthResponse, ApiError> {
  let request = ApiRequest::new(Method::Post, "/auth/register")
    .json(serde_json::to_value(registration)?)
    .anonymous();
  decode(t.send(request).await?)
}

pub async fn refresh(t: &dyn Transport, refresh_token: &str) -> Result<TokenPair, ApiError> {
  let request = ApiRequest::new(Method::Post, "/auth/refresh")
    .json(json!({ "refreshToken": refresh_token }))
    .anonymous();
  decode(t.send(request).await?)
}

/// Invalidate the refresh token server-side.
pub async fn logout(t: &dyn Transport, refresh_token: Option<&str>) -> Result<(), ApiError> {
  let request =
    ApiRequest::new(Method::Post, "/auth/logout").json(json!({ "refreshToken": refresh_token }));
  t.send(request).await?;
  Ok(())
}
