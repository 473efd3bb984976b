//! Shared query cache with request coalescing, invalidation and cancellation.

use chrono::Duration;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::debug;

use super::entry::{CacheEntry, QueryStatus};
use super::key::QueryKey;
use crate::api::client::decode;
use crate::api::error::ApiError;

pub type FetchFuture = BoxFuture<'static, Result<Value, ApiError>>;
type SharedFetch = Shared<FetchFuture>;

/// Factory that starts a fresh request for a key, registered by observers so
/// invalidation can refetch in the background.
pub type Refetcher = Arc<dyn Fn() -> FetchFuture + Send + Sync>;

struct InFlight {
  /// Sequence number at start; only this request may settle the slot
  id: u64,
  /// The invalidation that started this request, if any
  invalidation: Option<u64>,
  future: SharedFetch,
}

struct Slot {
  key: QueryKey,
  entry: CacheEntry,
  in_flight: Option<InFlight>,
  refetcher: Option<Refetcher>,
  /// Sequence number of the latest invalidation
  invalidated_at: u64,
}

impl Slot {
  fn new(key: QueryKey) -> Self {
    Self {
      key,
      entry: CacheEntry::default(),
      in_flight: None,
      refetcher: None,
      invalidated_at: 0,
    }
  }
}

struct Inner {
  slots: Mutex<HashMap<String, Slot>>,
  seq: AtomicU64,
  default_stale_time: Duration,
}

/// The single shared mutable cache.
///
/// Cloning is cheap and every clone sees the same entries. Only the fetch path
/// and the mutation layer write to it.
#[derive(Clone)]
pub struct QueryClient {
  inner: Arc<Inner>,
}

impl Default for QueryClient {
  fn default() -> Self {
    Self::new(Duration::seconds(30))
  }
}

impl QueryClient {
  pub fn new(default_stale_time: Duration) -> Self {
    Self {
      inner: Arc::new(Inner {
        slots: Mutex::new(HashMap::new()),
        seq: AtomicU64::new(1),
        default_stale_time,
      }),
    }
  }

  pub fn default_stale_time(&self) -> Duration {
    self.inner.default_stale_time
  }

  fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
    // A panic while holding the lock cannot leave a slot half-written
    self
      .inner
      .slots
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn next_seq(&self) -> u64 {
    self.inner.seq.fetch_add(1, Ordering::SeqCst)
  }

  /// Fetch with cache-first strategy.
  ///
  /// 1. Fresh data in cache - return it
  /// 2. A request for this key is in flight - join it
  /// 3. Otherwise start one and record the result
  pub async fn fetch_query<F, Fut>(
    &self,
    key: &QueryKey,
    stale_time: Duration,
    fetcher: F,
  ) -> Result<Value, ApiError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
  {
    let shared = {
      let mut slots = self.slots();
      let slot = slots
        .entry(key.cache_hash())
        .or_insert_with(|| Slot::new(key.clone()));

      if let Some(data) = slot.entry.fresh_data(stale_time) {
        debug!("Cache hit for {}", key);
        return Ok(data.clone());
      }

      match &slot.in_flight {
        Some(in_flight) => {
          debug!("Joining in-flight request for {}", key);
          in_flight.future.clone()
        }
        None => self.start_fetch(slot, fetcher().boxed()),
      }
    };

    shared.await
  }

  /// Register the refetcher for a key observed by a query.
  pub fn observe(&self, key: &QueryKey, refetcher: Refetcher) {
    let mut slots = self.slots();
    let slot = slots
      .entry(key.cache_hash())
      .or_insert_with(|| Slot::new(key.clone()));
    slot.refetcher = Some(refetcher);
  }

  /// Start a background refetch for an observed key unless one is running.
  ///
  /// Returns `true` if a new request was started.
  pub fn revalidate(&self, key: &QueryKey) -> bool {
    let mut slots = self.slots();
    match slots.get_mut(&key.cache_hash()) {
      Some(slot) if slot.in_flight.is_none() => self.spawn_refetch(slot),
      _ => false,
    }
  }

  /// Mark every entry whose key starts with `prefix` as stale.
  ///
  /// Observed entries get one background refetch. An entry whose running
  /// request was itself started by the latest invalidation is left alone, so
  /// repeated invalidation schedules at most one refetch. Any other running
  /// request predates the invalidation and settles as stale. Returns the
  /// number of refetches started.
  pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
    let mut slots = self.slots();
    let mut started = 0;

    for slot in slots.values_mut().filter(|s| s.key.starts_with(prefix)) {
      slot.entry.is_invalidated = true;

      let refetching = slot.in_flight.as_ref().is_some_and(|f| {
        slot.invalidated_at > 0 && f.invalidation == Some(slot.invalidated_at)
      });
      if refetching {
        continue;
      }

      slot.invalidated_at = self.next_seq();

      if slot.refetcher.is_some() {
        // Drop any older request: its response predates the invalidation
        slot.in_flight = None;
        if self.spawn_refetch(slot) {
          if let Some(in_flight) = slot.in_flight.as_mut() {
            in_flight.invalidation = Some(slot.invalidated_at);
          }
          started += 1;
        }
      }
    }

    if started > 0 {
      debug!("Invalidated {} ({} refetches)", prefix, started);
    }
    started
  }

  /// Drop in-flight requests for every key starting with `prefix`.
  ///
  /// Responses that arrive afterwards are discarded instead of written.
  pub fn cancel_queries(&self, prefix: &QueryKey) {
    let mut slots = self.slots();
    for slot in slots.values_mut().filter(|s| s.key.starts_with(prefix)) {
      if slot.in_flight.take().is_some() {
        debug!("Cancelled in-flight request for {}", slot.key);
        slot.entry.settle_idle();
      }
    }
  }

  pub fn get_entry(&self, key: &QueryKey) -> Option<CacheEntry> {
    self
      .slots()
      .get(&key.cache_hash())
      .map(|slot| slot.entry.clone())
  }

  pub fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
    let data = self.slots().get(&key.cache_hash())?.entry.data.clone()?;
    decode(data).ok()
  }

  /// Write data directly, as if it had just been fetched.
  pub fn set_query_data<T: Serialize>(&self, key: &QueryKey, data: &T) -> Result<(), ApiError> {
    let value = serde_json::to_value(data)?;
    let mut slots = self.slots();
    let slot = slots
      .entry(key.cache_hash())
      .or_insert_with(|| Slot::new(key.clone()));
    slot.entry.succeed(value);
    slot.entry.is_invalidated = false;
    Ok(())
  }

  /// Forget every entry whose key starts with `prefix`.
  pub fn remove_queries(&self, prefix: &QueryKey) {
    self.slots().retain(|_, slot| !slot.key.starts_with(prefix));
  }

  pub fn clear(&self) {
    self.slots().clear();
  }

  pub fn is_fetching(&self, key: &QueryKey) -> bool {
    self
      .slots()
      .get(&key.cache_hash())
      .is_some_and(|slot| slot.in_flight.is_some())
  }

  /// Replace an entry wholesale, dropping any in-flight request.
  pub(crate) fn restore_entry(&self, key: &QueryKey, entry: Option<CacheEntry>) {
    let mut slots = self.slots();
    let hash = key.cache_hash();
    match entry {
      Some(entry) => {
        let slot = slots.entry(hash).or_insert_with(|| Slot::new(key.clone()));
        slot.in_flight = None;
        slot.entry = entry;
      }
      None => {
        if let Some(slot) = slots.get_mut(&hash) {
          slot.in_flight = None;
          slot.entry = CacheEntry::default();
        }
      }
    }
  }

  /// Replace an entry's data in place, keeping its status and timestamps.
  pub(crate) fn write_data(&self, key: &QueryKey, data: Option<Value>) {
    let mut slots = self.slots();
    let slot = slots
      .entry(key.cache_hash())
      .or_insert_with(|| Slot::new(key.clone()));
    slot.entry.data = data;
  }

  fn spawn_refetch(&self, slot: &mut Slot) -> bool {
    let Some(refetcher) = slot.refetcher.clone() else {
      return false;
    };
    // Invalidation can run outside a runtime (e.g. during shutdown)
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
      return false;
    };

    let shared = self.start_fetch(slot, refetcher());
    handle.spawn(async move {
      let _ = shared.await;
    });
    true
  }

  /// Install a new in-flight request on `slot`. The caller must hold the lock.
  fn start_fetch(&self, slot: &mut Slot, request: FetchFuture) -> SharedFetch {
    let id = self.next_seq();
    let hash = slot.key.cache_hash();
    let cache: Weak<Inner> = Arc::downgrade(&self.inner);

    let future = async move {
      let result = request.await;
      if let Some(inner) = cache.upgrade() {
        QueryClient { inner }.settle(&hash, id, &result);
      }
      result
    }
    .boxed()
    .shared();

    debug!("Fetching {}", slot.key);
    slot.entry.status = QueryStatus::Loading;
    slot.in_flight = Some(InFlight {
      id,
      invalidation: None,
      future: future.clone(),
    });
    future
  }

  /// Record the outcome of request `id`, unless it was cancelled or superseded.
  fn settle(&self, hash: &str, id: u64, result: &Result<Value, ApiError>) {
    let mut slots = self.slots();
    let Some(slot) = slots.get_mut(hash) else {
      return;
    };
    if slot.in_flight.as_ref().map(|f| f.id) != Some(id) {
      debug!("Discarding superseded response for {}", slot.key);
      return;
    }

    slot.in_flight = None;
    match result {
      Ok(data) => {
        slot.entry.succeed(data.clone());
        slot.entry.is_invalidated = slot.invalidated_at > id;
      }
      Err(e) => slot.entry.fail(e.clone()),
    }
  }
}
