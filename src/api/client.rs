//! Transport seam and the reqwest-backed client.
//!
//! Resource modules build [`ApiRequest`]s and hand them to a [`Transport`].
//! [`ApiClient`] owns auth headers, the request timeout, error normalization
//! and the single refresh-and-retry on 401.

use crate::api::auth;
use crate::api::error::ApiError;
use crate::config::ApiConfig;
use crate::storage::TokenStore;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// HTTP method of an [`ApiRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Get,
  Post,
  Put,
  Patch,
  Delete,
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Method::Get => "GET",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Patch => "PATCH",
      Method::Delete => "DELETE",
    };
    f.write_str(s)
  }
}

impl From<Method> for reqwest::Method {
  fn from(m: Method) -> Self {
    match m {
      Method::Get => reqwest::Method::GET,
      Method::Post => reqwest::Method::POST,
      Method::Put => reqwest::Method::PUT,
      Method::Patch => reqwest::Method::PATCH,
      Method::Delete => reqwest::Method::DELETE,
    }
  }
}

/// A file sent as multipart form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
  pub field: String,
  pub file_name: String,
  pub content_type: Option<String>,
  pub bytes: Vec<u8>,
}

impl Upload {
  pub fn image(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
    let file_name = file_name.into();
    let content_type = guess_image_type(&file_name).map(String::from);
    Self {
      field: "image".to_string(),
      file_name,
      content_type,
      bytes,
    }
  }

  fn to_form(&self) -> Result<reqwest::multipart::Form, ApiError> {
    let mut part = reqwest::multipart::Part::bytes(self.bytes.clone()).file_name(self.file_name.clone());
    if let Some(ct) = &self.content_type {
      part = part
        .mime_str(ct)
        .map_err(|e| ApiError::Validation(format!("Invalid content type {}: {}", ct, e)))?;
    }
    Ok(reqwest::multipart::Form::new().part(self.field.clone(), part))
  }
}

fn guess_image_type(file_name: &str) -> Option<&'static str> {
  let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
  match ext.as_str() {
    "jpg" | "jpeg" => Some("image/jpeg"),
    "png" => Some("image/png"),
    "webp" => Some("image/webp"),
    "gif" => Some("image/gif"),
    "heic" => Some("image/heic"),
    _ => None,
  }
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
  Empty,
  Json(Value),
  Multipart(Upload),
}

/// One logical request against the backend, independent of the HTTP stack.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
  pub method: Method,
  pub path: String,
  pub query: Vec<(String, String)>,
  pub body: Body,
  /// Attach the bearer token (and allow refresh-and-retry on 401)
  pub authenticated: bool,
}

impl ApiRequest {
  pub fn new(method: Method, path: impl Into<String>) -> Self {
    Self {
      method,
      path: path.into(),
      query: Vec::new(),
      body: Body::Empty,
      authenticated: true,
    }
  }

  pub fn json(mut self, body: Value) -> Self {
    self.body = Body::Json(body);
    self
  }

  pub fn multipart(mut self, upload: Upload) -> Self {
    self.body = Body::Multipart(upload);
    self
  }

  pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
    self.query = query;
    self
  }

  /// Send without credentials (public endpoints).
  pub fn anonymous(mut self) -> Self {
    self.authenticated = false;
    self
  }
}

/// Anything that can execute an [`ApiRequest`] and hand back the parsed body.
///
/// Success bodies are returned as JSON; an empty body is `Value::Null`.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

impl<'a> dyn Transport + 'a {
  pub async fn get<T: DeserializeOwned>(
    &self,
    path: &str,
    params: &(impl Serialize + Sync),
  ) -> Result<T, ApiError> {
    let query = to_query_pairs(params)?;
    let value = self
      .send(ApiRequest::new(Method::Get, path).with_query(query))
      .await?;
    decode(value)
  }

  pub async fn post<T: DeserializeOwned>(
    &self,
    path: &str,
    body: &(impl Serialize + Sync),
  ) -> Result<T, ApiError> {
    let body = serde_json::to_value(body)?;
    decode(self.send(ApiRequest::new(Method::Post, path).json(body)).await?)
  }

  pub async fn put<T: DeserializeOwned>(
    &self,
    path: &str,
    body: &(impl Serialize + Sync),
  ) -> Result<T, ApiError> {
    let body = serde_json::to_value(body)?;
    decode(self.send(ApiRequest::new(Method::Put, path).json(body)).await?)
  }

  pub async fn patch<T: DeserializeOwned>(
    &self,
    path: &str,
    body: &(impl Serialize + Sync),
  ) -> Result<T, ApiError> {
    let body = serde_json::to_value(body)?;
    decode(self.send(ApiRequest::new(Method::Patch, path).json(body)).await?)
  }

  pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
    decode(self.send(ApiRequest::new(Method::Delete, path)).await?)
  }
}

/// Convert a JSON value into the caller's expected shape.
///
/// This is the single point where a raw network response is trusted to match
/// a typed structure.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
  // Empty bodies decode as an empty object for shapes that default every field
  if value.is_null() {
    return serde_json::from_value(Value::Null)
      .or_else(|_| serde_json::from_value(json!({})))
      .map_err(|e| ApiError::Decode(e.to_string()));
  }
  serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Flatten a serializable parameter struct into query pairs, dropping unset fields.
pub fn to_query_pairs(params: &impl Serialize) -> Result<Vec<(String, String)>, ApiError> {
  let value = serde_json::to_value(params)?;
  let map = match value {
    Value::Object(map) => map,
    Value::Null => return Ok(Vec::new()),
    other => {
      return Err(ApiError::Validation(format!(
        "Query parameters must be an object, got {}",
        other
      )))
    }
  };

  let mut pairs = Vec::new();
  for (key, value) in map {
    match value {
      Value::Null => {}
      Value::String(s) if s.is_empty() => {}
      Value::String(s) => pairs.push((key, s)),
      Value::Array(values) => {
        for v in values {
          pairs.push((key.clone(), scalar_to_string(v)));
        }
      }
      other => pairs.push((key, scalar_to_string(other))),
    }
  }
  Ok(pairs)
}

fn scalar_to_string(value: Value) -> String {
  match value {
    Value::String(s) => s,
    other => other.to_string(),
  }
}

/// HTTP transport backed by reqwest.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: String,
  timeout: Duration,
  tokens: TokenStore,
  /// Serializes token refreshes so concurrent 401s trigger a single refresh
  refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

impl ApiClient {
  pub fn new(config: &ApiConfig, tokens: TokenStore) -> Result<Self, ApiError> {
    Url::parse(&config.url)
      .map_err(|e| ApiError::Validation(format!("Invalid API url {}: {}", config.url, e)))?;

    let http = reqwest::Client::builder()
      .user_agent(concat!("stasher/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self {
      http,
      base_url: config.url.trim_end_matches('/').to_string(),
      timeout: Duration::from_secs(config.timeout_secs),
      tokens,
      refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
    })
  }

  fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
    let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
    let mut url =
      Url::parse(&raw).map_err(|e| ApiError::Validation(format!("Invalid url {}: {}", raw, e)))?;
    if !query.is_empty() {
      url.query_pairs_mut().extend_pairs(query.iter());
    }
    Ok(url)
  }

  /// Perform one HTTP exchange, bounded by the configured timeout.
  async fn execute(&self, request: &ApiRequest, token: Option<&str>) -> Result<Value, ApiError> {
    let url = self.url(&request.path, &request.query)?;
    debug!("{} {}", request.method, url);

    let mut builder = self.http.request(request.method.into(), url);
    if let Some(token) = token {
      builder = builder.bearer_auth(token);
    }
    builder = match &request.body {
      Body::Empty => builder,
      Body::Json(value) => builder.json(value),
      // No explicit content type: reqwest sets the multipart boundary
      Body::Multipart(upload) => builder.multipart(upload.to_form()?),
    };

    let exchange = async {
      let response = builder.send().await?;
      let status = response.status();
      let bytes = response.bytes().await?;
      Ok::<_, ApiError>((status, bytes))
    };

    let (status, bytes) = tokio::time::timeout(self.timeout, exchange)
      .await
      .map_err(|_| ApiError::Timeout(self.timeout))??;

    let is_empty = bytes.iter().all(u8::is_ascii_whitespace);

    if !status.is_success() {
      let body = if is_empty {
        None
      } else {
        Some(
          serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())),
        )
      };
      return Err(ApiError::from_response(status.as_u16(), body));
    }

    if is_empty {
      return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(ApiError::from)
  }

  /// Exchange the stored refresh token for a new pair.
  ///
  /// Returns `true` when a usable access token is stored afterwards.
  async fn refresh_tokens(&self, rejected_token: &str) -> Result<bool, ApiError> {
    let _guard = self.refresh_lock.lock().await;

    // Another request already refreshed while we waited
    if let Some(current) = self.tokens.access_token()? {
      if current != rejected_token {
        return Ok(true);
      }
    }

    let Some(refresh_token) = self.tokens.refresh_token()? else {
      return Ok(false);
    };

    // Sent anonymously, so a 401 here cannot recurse into another refresh
    match auth::refresh(self, &refresh_token).await {
      Ok(pair) => {
        self.tokens.set_tokens(&pair)?;
        debug!("Access token refreshed");
        Ok(true)
      }
      Err(e) if matches!(e.status(), Some(401) | Some(403)) => {
        warn!("Refresh token rejected, clearing stored session");
        self.tokens.clear_tokens()?;
        Ok(false)
      }
      Err(e) => {
        warn!("Token refresh failed: {}", e);
        Ok(false)
      }
    }
  }
}

#[async_trait]
impl Transport for ApiClient {
  async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
    let token = if request.authenticated {
      self.tokens.access_token()?
    } else {
      None
    };

    let result = self.execute(&request, token.as_deref()).await;

    match (result, token) {
      (Err(e), Some(token)) if e.is_unauthorized() => {
        if self.refresh_tokens(&token).await? {
          let retry_token = self.tokens.access_token()?;
          self.execute(&request, retry_token.as_deref()).await
        } else {
          Err(e)
        }
      }
      (result, _) => result,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::TokenPair;
  use crate::storage::MemoryStorage;
  use serde::Serialize;
  use std::sync::Mutex;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::{TcpListener, TcpStream};

  /// One request as the loopback server saw it
  #[derive(Debug, Clone)]
  struct Seen {
    head: String,
    body: Vec<u8>,
  }

  impl Seen {
    fn request_line(&self) -> &str {
      self.head.lines().next().unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<String> {
      let prefix = format!("{}:", name.to_ascii_lowercase());
      self
        .head
        .lines()
        .find(|l| l.to_ascii_lowercase().starts_with(&prefix))
        .map(|l| l[prefix.len()..].trim().to_string())
    }

    fn body_text(&self) -> String {
      String::from_utf8_lossy(&self.body).into_owned()
    }
  }

  fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
  }

  async fn read_request(stream: &mut TcpStream) -> Seen {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
      if let Some(pos) = find(&buf, b"\r\n\r\n") {
        break pos + 4;
      }
      let n = stream.read(&mut chunk).await.unwrap();
      if n == 0 {
        break buf.len();
      }
      buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let seen = Seen {
      head,
      body: Vec::new(),
    };
    let length = seen.header("content-length").and_then(|v| v.parse::<usize>().ok());
    let chunked = seen
      .header("transfer-encoding")
      .is_some_and(|v| v.eq_ignore_ascii_case("chunked"));

    loop {
      let body = &buf[head_end..];
      let done = match length {
        Some(length) => body.len() >= length,
        None if chunked => body.ends_with(b"0\r\n\r\n"),
        None => true,
      };
      if done {
        break;
      }
      let n = stream.read(&mut chunk).await.unwrap();
      if n == 0 {
        break;
      }
      buf.extend_from_slice(&chunk[..n]);
    }

    Seen {
      body: buf[head_end..].to_vec(),
      ..seen
    }
  }

  /// Answer one connection per scripted response, in order.
  async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<Seen>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/api", listener.local_addr().unwrap());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let log = seen.clone();
    tokio::spawn(async move {
      for (status, body) in responses {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        log.lock().unwrap().push(request);

        let response = format!(
          "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
          status,
          body.len(),
          body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
      }
    });

    (base, seen)
  }

  fn client(base: &str, timeout_secs: u64) -> (ApiClient, TokenStore) {
    let tokens = TokenStore::new(Arc::new(MemoryStorage::default()));
    let config = ApiConfig {
      url: base.to_string(),
      timeout_secs,
    };
    (ApiClient::new(&config, tokens.clone()).unwrap(), tokens)
  }

  fn sign_in(tokens: &TokenStore, access: &str, refresh: &str) {
    tokens
      .set_tokens(&TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
      })
      .unwrap();
  }

  #[tokio::test]
  async fn test_send_attaches_bearer_and_parses_json() {
    let (base, seen) = serve(vec![(200, r#"{"id":"i1"}"#), (200, "")]).await;
    let (client, tokens) = client(&base, 30);
    sign_in(&tokens, "tok", "r1");

    let item = client
      .send(ApiRequest::new(Method::Get, "/items").with_query(vec![("page".into(), "2".into())]))
      .await
      .unwrap();
    assert_eq!(item, json!({ "id": "i1" }));

    // Empty success body
    let deleted = client.send(ApiRequest::new(Method::Delete, "/items/i1")).await.unwrap();
    assert_eq!(deleted, Value::Null);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen[0].request_line(), "GET /api/items?page=2 HTTP/1.1");
    assert_eq!(seen[0].header("authorization").as_deref(), Some("Bearer tok"));
    assert_eq!(seen[1].request_line(), "DELETE /api/items/i1 HTTP/1.1");
  }

  #[tokio::test]
  async fn test_json_body_and_anonymous_request() {
    let (base, seen) = serve(vec![(200, r#"{"ok":true}"#)]).await;
    let (client, tokens) = client(&base, 30);
    sign_in(&tokens, "tok", "r1");

    client
      .send(
        ApiRequest::new(Method::Post, "/auth/login")
          .json(json!({ "email": "a@b.c" }))
          .anonymous(),
      )
      .await
      .unwrap();

    let seen = seen.lock().unwrap().clone();
    assert!(seen[0].header("authorization").is_none());
    assert!(seen[0]
      .header("content-type")
      .is_some_and(|ct| ct.starts_with("application/json")));
    let body: Value = serde_json::from_slice(&seen[0].body).unwrap();
    assert_eq!(body, json!({ "email": "a@b.c" }));
  }

  #[tokio::test]
  async fn test_error_statuses_are_normalized() {
    let (base, _) = serve(vec![
      (404, r#"{"message":"Item not found"}"#),
      (502, "Bad gateway"),
      (500, ""),
    ])
    .await;
    let (client, _) = client(&base, 30);

    let err = client.send(ApiRequest::new(Method::Get, "/items/x")).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Item not found");

    // Non-JSON body is kept as text
    let err = client.send(ApiRequest::new(Method::Get, "/stats")).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.to_string(), "Bad gateway");

    let err = client.send(ApiRequest::new(Method::Get, "/stats")).await.unwrap_err();
    assert_eq!(
      err,
      ApiError::Http {
        status: 500,
        message: "request failed with status 500".to_string(),
        body: None,
      }
    );
  }

  #[tokio::test]
  async fn test_multipart_upload() {
    let (base, seen) = serve(vec![(200, r#"{"url":"https://cdn/lamp.png"}"#)]).await;
    let (client, _) = client(&base, 30);

    let upload = Upload::image("lamp.png", b"PNGDATA".to_vec());
    let response = client
      .send(ApiRequest::new(Method::Post, "/uploads/image").multipart(upload))
      .await
      .unwrap();
    assert_eq!(response["url"], "https://cdn/lamp.png");

    let seen = seen.lock().unwrap().clone();
    assert!(seen[0]
      .header("content-type")
      .is_some_and(|ct| ct.starts_with("multipart/form-data; boundary=")));
    let body = seen[0].body_text();
    assert!(body.contains(r#"name="image""#));
    assert!(body.contains(r#"filename="lamp.png""#));
    assert!(body.to_ascii_lowercase().contains("content-type: image/png"));
    assert!(body.contains("PNGDATA"));
  }

  #[tokio::test]
  async fn test_unauthorized_refreshes_once_and_retries() {
    let (base, seen) = serve(vec![
      (401, r#"{"message":"jwt expired"}"#),
      (200, r#"{"accessToken":"new","refreshToken":"r2"}"#),
      (200, r#"{"id":"u1"}"#),
    ])
    .await;
    let (client, tokens) = client(&base, 30);
    sign_in(&tokens, "old", "r1");

    let me = client.send(ApiRequest::new(Method::Get, "/users/me")).await.unwrap();
    assert_eq!(me, json!({ "id": "u1" }));
    assert_eq!(tokens.access_token().unwrap().as_deref(), Some("new"));
    assert_eq!(tokens.refresh_token().unwrap().as_deref(), Some("r2"));

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[1].request_line(), "POST /api/auth/refresh HTTP/1.1");
    assert!(seen[1].header("authorization").is_none());
    let body: Value = serde_json::from_slice(&seen[1].body).unwrap();
    assert_eq!(body, json!({ "refreshToken": "r1" }));
    assert_eq!(seen[2].header("authorization").as_deref(), Some("Bearer new"));
  }

  #[tokio::test]
  async fn test_second_unauthorized_is_returned() {
    let (base, seen) = serve(vec![
      (401, ""),
      (200, r#"{"accessToken":"new","refreshToken":"r2"}"#),
      (401, r#"{"message":"Forbidden resource"}"#),
    ])
    .await;
    let (client, tokens) = client(&base, 30);
    sign_in(&tokens, "old", "r1");

    let err = client.send(ApiRequest::new(Method::Get, "/users/me")).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Forbidden resource");
    assert_eq!(seen.lock().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn test_rejected_refresh_clears_tokens() {
    let (base, seen) = serve(vec![
      (401, r#"{"message":"jwt expired"}"#),
      (403, r#"{"message":"refresh token revoked"}"#),
    ])
    .await;
    let (client, tokens) = client(&base, 30);
    sign_in(&tokens, "old", "r1");

    let err = client.send(ApiRequest::new(Method::Get, "/stats")).await.unwrap_err();
    // The caller sees the original failure, not the refresh one
    assert_eq!(err.to_string(), "jwt expired");
    assert_eq!(tokens.access_token().unwrap(), None);
    assert_eq!(tokens.refresh_token().unwrap(), None);
    assert_eq!(seen.lock().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn test_unauthenticated_401_does_not_refresh() {
    let (base, seen) = serve(vec![(401, r#"{"message":"Invalid credentials"}"#)]).await;
    let (client, tokens) = client(&base, 30);
    sign_in(&tokens, "tok", "r1");

    let err = client
      .send(ApiRequest::new(Method::Post, "/auth/login").anonymous())
      .await
      .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(tokens.access_token().unwrap().as_deref(), Some("tok"));
    assert_eq!(seen.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_request_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/api", listener.local_addr().unwrap());
    // Accept and never answer
    tokio::spawn(async move {
      let (mut stream, _) = listener.accept().await.unwrap();
      let _ = read_request(&mut stream).await;
      tokio::time::sleep(Duration::from_secs(10)).await;
      drop(stream);
    });
    let (client, _) = client(&base, 1);

    let err = client.send(ApiRequest::new(Method::Get, "/items")).await.unwrap_err();
    assert_eq!(err, ApiError::Timeout(Duration::from_secs(1)));
  }

  #[derive(Serialize)]
  struct Params {
    search: Option<String>,
    page: u32,
    archived: bool,
    tag: Option<String>,
    location: String,
  }

  #[test]
  fn test_query_pairs_skip_unset_fields() {
    let params = Params {
      search: Some("drill".to_string()),
      page: 2,
      archived: false,
      tag: None,
      location: String::new(),
    };
    let pairs = to_query_pairs(&params).unwrap();
    assert_eq!(
      pairs,
      vec![
        ("archived".to_string(), "false".to_string()),
        ("page".to_string(), "2".to_string()),
        ("search".to_string(), "drill".to_string()),
      ]
    );
  }

  #[test]
  fn test_query_pairs_rejects_non_object() {
    assert!(to_query_pairs(&vec![1, 2]).is_err());
    assert!(to_query_pairs(&()).unwrap().is_empty());
  }

  #[test]
  fn test_upload_guesses_image_type() {
    let upload = Upload::image("photo.JPG", vec![1, 2, 3]);
    assert_eq!(upload.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(upload.field, "image");
    assert_eq!(Upload::image("notes.txt", vec![]).content_type, None);
  }

  #[test]
  fn test_request_builder_defaults_to_authenticated() {
    let request = ApiRequest::new(Method::Get, "/share/collection/abc");
    assert!(request.authenticated);
    assert!(!request.anonymous().authenticated);
  }

  #[test]
  fn test_url_joins_base_and_path() {
    let tokens = TokenStore::new(Arc::new(MemoryStorage::default()));
    let config = ApiConfig {
      url: "http://localhost:3000/api/".to_string(),
      timeout_secs: 30,
    };
    let client = ApiClient::new(&config, tokens).unwrap();
    let url = client
      .url("/items", &[("page".to_string(), "1".to_string())])
      .unwrap();
    assert_eq!(url.as_str(), "http://localhost:3000/api/items?page=1");
  }

  #[test]
  fn test_invalid_base_url_is_rejected() {
    let tokens = TokenStore::new(Arc::new(MemoryStorage::default()));
    let config = ApiConfig {
      url: "not a url".to_string(),
      timeout_secs: 30,
    };
    assert!(ApiClient::new(&config, tokens).is_err());
  }
}
