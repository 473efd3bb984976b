//! Public, unauthenticated read of shared collections.

use crate::api::client::{decode, ApiRequest, Method, Transport};
use crate::api::error::ApiError;
use crate::api::types::Collection;

pub async fn get_shared_collection(t: &dyn Transport, share_id: &str) -> Result<Collection, ApiError> {
  let request = ApiRequest::new(Method::Get, format!("/share/collection/{}", share_id)).anonymous();
  decode(t.send(request).await?)
}
