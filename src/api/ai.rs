//! Natural-language assistant endpoints.

use crate::api::client::{decode, ApiRequest, Method, Transport, Upload};
use crate::api::error::ApiError;
use crate::api::types::{AiAnswer, AiCredits, AskRequest, ImageAnalysis, SuggestionList};

pub async fn ask(t: &dyn Transport, question: &str) -> Result<AiAnswer, ApiError> {
  let body = AskRequest {
    question: question.to_string(),
  };
  t.post("/ai/ask", &body).await
}

pub async fn analyze_image(t: &dyn Transport, upload: Upload) -> Result<ImageAnalysis, ApiError> {
  let request = ApiRequest::new(Method::Post, "/ai/analyze-image").multipart(upload);
  decode(t.send(request).await?)
}

/// Remaining daily AI credits.
pub async fn credits(t: &dyn Transport) -> Result<AiCredits, ApiError> {
  t.get("/ai/credits", &()).await
}

pub async fn suggest_collections(t: &dyn Transport) -> Result<SuggestionList, ApiError> {
  t.post("/ai/suggest-collections", &serde_json::json!({})).await
}
