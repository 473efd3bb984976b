//! Assistant actions, gated on the user's daily AI credits.

use chrono::Duration;

use crate::api::ai;
use crate::api::client::Upload;
use crate::api::error::ApiError;
use crate::api::types::{AiAnswer, AiCredits, CollectionSuggestion, ImageAnalysis};
use crate::context::AppContext;
use crate::notify::Notification;
use crate::query::Query;

use super::keys;
use super::mutation::report;

pub const DAILY_LIMIT_TITLE: &str = "Daily AI limit reached";

fn daily_limit_message(total: Option<u32>) -> String {
  match total {
    Some(total) => format!(
      "You've used all {} AI requests for today. Try again tomorrow.",
      total
    ),
    None => "You've used all your AI requests for today. Try again tomorrow.".to_string(),
  }
}

pub struct AiHooks<'a> {
  ctx: &'a AppContext,
}

impl<'a> AiHooks<'a> {
  pub(crate) fn new(ctx: &'a AppContext) -> Self {
    Self { ctx }
  }

  pub fn credits(&self) -> Query<AiCredits> {
    let transport = self.ctx.transport.clone();
    Query::new(&self.ctx.queries, keys::ai_credits(), move || {
      let transport = transport.clone();
      async move { ai::credits(transport.as_ref()).await }
    })
    .with_stale_time(Duration::minutes(1))
    .enabled(self.ctx.signed_in())
  }

  pub async fn ask(&self, question: &str) -> Result<AiAnswer, ApiError> {
    const FALLBACK: &str = "Failed to get an answer";
    let question = question.trim();
    if question.is_empty() {
      let error = ApiError::Validation("Ask a question first".to_string());
      report(self.ctx, FALLBACK, &error);
      return Err(error);
    }

    self
      .spend(FALLBACK, ai::ask(self.ctx.transport.as_ref(), question))
      .await
  }

  pub async fn analyze_image(&self, upload: Upload) -> Result<ImageAnalysis, ApiError> {
    self
      .spend(
        "Failed to analyze image",
        ai::analyze_image(self.ctx.transport.as_ref(), upload),
      )
      .await
  }

  pub async fn suggest_collections(&self) -> Result<Vec<CollectionSuggestion>, ApiError> {
    let list = self
      .spend(
        "Failed to suggest collections",
        ai::suggest_collections(self.ctx.transport.as_ref()),
      )
      .await?;
    Ok(list.suggestions)
  }

  /// Run a credit-consuming request.
  ///
  /// With no credits left nothing is sent and the daily-limit notice is shown
  /// in place of a generic failure; a 429 from the server is reported the same
  /// way.
  async fn spend<T, Fut>(&self, fallback: &str, request: Fut) -> Result<T, ApiError>
  where
    Fut: std::future::Future<Output = Result<T, ApiError>>,
  {
    if let Some(credits) = self.known_credits().await {
      if credits.remaining == 0 {
        return Err(self.limit_reached(Some(credits.total)));
      }
    }

    match request.await {
      Ok(value) => {
        self.ctx.queries.invalidate_queries(&keys::ai_credits());
        Ok(value)
      }
      Err(e) if e.status() == Some(429) => {
        self.ctx.queries.invalidate_queries(&keys::ai_credits());
        Err(self.limit_reached(None))
      }
      Err(e) => {
        report(self.ctx, fallback, &e);
        Err(e)
      }
    }
  }

  /// Credits from the cache, fetched once if nothing is cached. A failed
  /// lookup is not fatal; the server enforces the quota regardless.
  async fn known_credits(&self) -> Option<AiCredits> {
    if let Some(credits) = self.ctx.queries.get_query_data(&keys::ai_credits()) {
      return Some(credits);
    }
    self.credits().fetch().await.data
  }

  fn limit_reached(&self, total: Option<u32>) -> ApiError {
    let message = daily_limit_message(total);
    self
      .ctx
      .notifier
      .notify(Notification::warning(DAILY_LIMIT_TITLE, message.clone()));
    ApiError::QuotaExceeded(message)
  }
}
