use crate::api::client::Transport;
use crate::api::error::ApiError;
use crate::api::types::Stats;

/// Aggregate dashboard statistics.
pub async fn get(t: &dyn Transport) -> Result<Stats, ApiError> {
  t.get("/stats", &()).await
}
