//! Cached reads bound to a query key.
//!
//! Inspired by TanStack Query, a `Query<T>` pairs a [`QueryKey`] with the
//! fetcher that produces its data. Reads go through the shared
//! [`QueryClient`], so two queries built from equal parameters share one cache
//! entry and one in-flight request.
//!
//! # Example
//!
//! ```ignore
//! let query = ctx.items().list(ItemListParams::default(), PriceFilter::All);
//!
//! // Cache-first; stale data comes back immediately and revalidates in the background
//! let result = query.fetch().await;
//! match (&result.data, &result.error) {
//!     (Some(page), _) => render(page),
//!     (None, Some(e)) => render_error(e),
//!     (None, None) => render_spinner(),
//! }
//! ```

use chrono::Duration;
use futures::FutureExt;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::api::client::decode;
use crate::api::error::ApiError;
use crate::cache::{QueryClient, QueryKey, QueryStatus, Refetcher};

type SelectFn<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// What a consumer renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
  pub data: Option<T>,
  pub status: QueryStatus,
  /// First load: nothing to show yet
  pub is_loading: bool,
  /// A request is in flight (including background revalidation)
  pub is_fetching: bool,
  pub is_stale: bool,
  pub error: Option<ApiError>,
}

impl<T> QueryResult<T> {
  /// The neutral state of a disabled query.
  pub fn disabled() -> Self {
    Self {
      data: None,
      status: QueryStatus::Idle,
      is_loading: false,
      is_fetching: false,
      is_stale: false,
      error: None,
    }
  }

  pub fn is_success(&self) -> bool {
    self.status == QueryStatus::Success
  }

  pub fn is_error(&self) -> bool {
    self.status == QueryStatus::Error
  }

  /// Data, or the error that prevented it.
  pub fn into_result(self) -> Result<T, ApiError> {
    match (self.data, self.error) {
      (Some(data), _) => Ok(data),
      (None, Some(e)) => Err(e),
      (None, None) => Err(ApiError::Cancelled),
    }
  }
}

/// A keyed, cached read.
pub struct Query<T> {
  client: QueryClient,
  key: QueryKey,
  fetcher: Refetcher,
  enabled: bool,
  stale_time: Duration,
  select: Option<SelectFn<T>>,
  _marker: PhantomData<fn() -> T>,
}

impl<T> Query<T>
where
  T: Serialize + DeserializeOwned + Send + 'static,
{
  /// Create a query with the given fetcher.
  ///
  /// The fetcher is called each time the cache decides a request is needed.
  pub fn new<F, Fut>(client: &QueryClient, key: QueryKey, fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    let fetcher: Refetcher = Arc::new(move || {
      let request = fetcher();
      async move {
        let data = request.await?;
        serde_json::to_value(data).map_err(ApiError::from)
      }
      .boxed()
    });

    Self {
      client: client.clone(),
      key,
      fetcher,
      enabled: true,
      stale_time: client.default_stale_time(),
      select: None,
      _marker: PhantomData,
    }
  }

  /// A disabled query performs no network activity.
  pub fn enabled(mut self, enabled: bool) -> Self {
    self.enabled = enabled;
    self
  }

  /// Set the stale time for this query.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// Transform data on the way out of the cache. The cache keeps the raw value.
  pub fn select(mut self, select: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
    self.select = Some(Arc::new(select));
    self
  }

  pub fn key(&self) -> &QueryKey {
    &self.key
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  /// Current cached state, without touching the network.
  pub fn state(&self) -> QueryResult<T> {
    if !self.enabled {
      return QueryResult::disabled();
    }

    let Some(entry) = self.client.get_entry(&self.key) else {
      return QueryResult {
        is_stale: true,
        ..QueryResult::disabled()
      };
    };

    let is_fetching = self.client.is_fetching(&self.key);
    let mut error = entry.error.clone();
    let data = match entry.data.clone().map(decode::<T>) {
      Some(Ok(data)) => Some(self.apply_select(data)),
      Some(Err(e)) => {
        error = Some(e);
        None
      }
      None => None,
    };

    QueryResult {
      is_loading: data.is_none() && is_fetching,
      is_stale: entry.is_stale(self.stale_time),
      status: entry.status,
      is_fetching,
      data,
      error,
    }
  }

  /// Read through the cache.
  ///
  /// - Disabled: neutral state, no request
  /// - Cached data (fresh or stale): returned immediately; stale data triggers
  ///   a background revalidation
  /// - Nothing cached: waits for the (possibly shared) request
  pub async fn fetch(&self) -> QueryResult<T> {
    if !self.enabled {
      return QueryResult::disabled();
    }

    self.client.observe(&self.key, self.fetcher.clone());

    match self.client.get_entry(&self.key) {
      Some(entry) if entry.data.is_some() => {
        if entry.is_stale(self.stale_time) {
          self.client.revalidate(&self.key);
        }
      }
      _ => {
        // Errors land in the cache entry and surface through `state()`
        let fetcher = self.fetcher.clone();
        let _ = self
          .client
          .fetch_query(&self.key, self.stale_time, move || fetcher())
          .await;
      }
    }

    self.state()
  }

  /// Force a request, bypassing freshness, and wait for it.
  pub async fn refetch(&self) -> Result<T, ApiError> {
    if !self.enabled {
      return Err(ApiError::Validation("Query is disabled".to_string()));
    }

    self.client.observe(&self.key, self.fetcher.clone());
    self.client.invalidate_queries(&self.key);
    let fetcher = self.fetcher.clone();
    let value = self
      .client
      .fetch_query(&self.key, self.stale_time, move || fetcher())
      .await?;
    Ok(self.apply_select(decode(value)?))
  }

  fn apply_select(&self, data: T) -> T {
    match &self.select {
      Some(select) => select(data),
      None => data,
    }
  }
}

impl<T> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("key", &self.key)
      .field("enabled", &self.enabled)
      .field("stale_time", &self.stale_time)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::time::Duration as StdDuration;

  fn counting_query(
    client: &QueryClient,
    counter: Arc<AtomicU32>,
    delay_ms: u64,
  ) -> Query<u32> {
    Query::new(client, QueryKey::new("counter"), move || {
      let counter = counter.clone();
      async move {
        tokio::time::sleep(StdDuration::from_millis(delay_ms)).await;
        Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
      }
    })
  }

  #[tokio::test]
  async fn test_query_success() {
    let client = QueryClient::default();
    let query = Query::new(&client, QueryKey::new("numbers"), || async {
      Ok::<_, ApiError>(vec![1, 2, 3])
    });

    assert!(query.state().data.is_none());

    let result = query.fetch().await;
    assert!(result.is_success());
    assert_eq!(result.data, Some(vec![1, 2, 3]));
    assert!(!result.is_loading);
  }

  #[tokio::test]
  async fn test_query_error() {
    let client = QueryClient::default();
    let query: Query<i32> = Query::new(&client, QueryKey::new("broken"), || async {
      Err(ApiError::Network("Something went wrong".to_string()))
    });

    let result = query.fetch().await;
    assert!(result.is_error());
    assert_eq!(
      result.error,
      Some(ApiError::Network("Something went wrong".to_string()))
    );
  }

  #[tokio::test]
  async fn test_disabled_query_does_nothing() {
    let client = QueryClient::default();
    let counter = Arc::new(AtomicU32::new(0));
    let query = counting_query(&client, counter.clone(), 0).enabled(false);

    let result = query.fetch().await;
    assert_eq!(result, QueryResult::disabled());
    assert!(query.refetch().await.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert!(client.get_entry(query.key()).is_none());
  }

  #[tokio::test]
  async fn test_stale_data_is_served_while_revalidating() {
    let client = QueryClient::default();
    let counter = Arc::new(AtomicU32::new(0));
    let query = counting_query(&client, counter.clone(), 20).with_stale_time(Duration::zero());

    assert_eq!(query.fetch().await.data, Some(1));

    // Stale: old value comes back at once, refetch runs in the background
    let second = query.fetch().await;
    assert_eq!(second.data, Some(1));
    assert!(second.is_fetching);
    assert!(!second.is_loading);

    tokio::time::sleep(StdDuration::from_millis(60)).await;
    assert_eq!(query.state().data, Some(2));
  }

  #[tokio::test]
  async fn test_equal_keys_share_one_request() {
    let client = QueryClient::default();
    let counter = Arc::new(AtomicU32::new(0));
    let a = counting_query(&client, counter.clone(), 20);
    let b = counting_query(&client, counter.clone(), 20);

    let (ra, rb) = tokio::join!(a.fetch(), b.fetch());
    assert_eq!(ra.data, Some(1));
    assert_eq!(rb.data, Some(1));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_select_transforms_without_touching_cache() {
    let client = QueryClient::default();
    let query = Query::new(&client, QueryKey::new("numbers"), || async {
      Ok::<_, ApiError>(vec![1, 2, 3, 4])
    })
    .select(|v: Vec<i32>| v.into_iter().filter(|n| n % 2 == 0).collect());

    assert_eq!(query.fetch().await.data, Some(vec![2, 4]));
    assert_eq!(
      client.get_query_data::<Vec<i32>>(query.key()),
      Some(vec![1, 2, 3, 4])
    );
  }

  #[tokio::test]
  async fn test_refetch_bypasses_fresh_cache() {
    let client = QueryClient::new(Duration::minutes(5));
    let counter = Arc::new(AtomicU32::new(0));
    let query = counting_query(&client, counter.clone(), 0);

    query.fetch().await;
    assert_eq!(query.refetch().await.unwrap(), 2);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
  }
}
