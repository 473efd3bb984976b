//! Scripted in-memory transport for tests.

use crate::api::client::{ApiRequest, Method, Transport};
use crate::api::error::ApiError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Route = (Method, String);

#[derive(Default)]
struct Script {
  /// Queued responses per route; the last one repeats once the queue drains
  responses: HashMap<Route, VecDeque<Result<Value, ApiError>>>,
  delays: HashMap<Route, Duration>,
  calls: Vec<ApiRequest>,
}

/// Transport that records every request and answers from a script.
///
/// Unscripted routes answer with a 404.
#[derive(Clone, Default)]
pub struct MockTransport {
  script: Arc<Mutex<Script>>,
}

impl MockTransport {
  pub fn new() -> Self {
    Self::default()
  }

  /// Queue a response for `method path`.
  pub fn on(&self, method: Method, path: &str, response: Result<Value, ApiError>) {
    let mut script = self.script.lock().unwrap();
    script
      .responses
      .entry((method, path.to_string()))
      .or_default()
      .push_back(response);
  }

  /// Delay every response on `method path`.
  pub fn delay(&self, method: Method, path: &str, delay: Duration) {
    let mut script = self.script.lock().unwrap();
    script.delays.insert((method, path.to_string()), delay);
  }

  pub fn calls(&self) -> Vec<ApiRequest> {
    self.script.lock().unwrap().calls.clone()
  }

  pub fn call_count(&self, method: Method, path: &str) -> usize {
    self
      .script
      .lock()
      .unwrap()
      .calls
      .iter()
      .filter(|c| c.method == method && c.path == path)
      .count()
  }
}

#[async_trait]
impl Transport for MockTransport {
  async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
    let route = (request.method, request.path.clone());
    let (response, delay) = {
      let mut script = self.script.lock().unwrap();
      script.calls.push(request);
      let delay = script.delays.get(&route).copied();
      let response = match script.responses.get_mut(&route) {
        Some(queue) if queue.len() > 1 => queue.pop_front(),
        Some(queue) => queue.front().cloned(),
        None => None,
      };
      (response, delay)
    };

    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }

    response.unwrap_or_else(|| Err(ApiError::from_response(404, None)))
  }
}
