//! The two write styles shared by every mutation hook.
//!
//! - [`run`]: perform the write, then invalidate the affected keys.
//! - [`run_optimistic`]: cancel, snapshot and patch one key, perform the
//!   write, then commit (invalidate) or roll back to the snapshot.
//!
//! Both report a failure exactly once through the context's notifier.

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;

use crate::api::error::ApiError;
use crate::cache::QueryKey;
use crate::context::AppContext;
use crate::error_message::extract_error_message;
use crate::notify::Notification;

/// Surface a failed mutation: the operation's fallback as the title, the
/// unwrapped server detail as the description.
pub(crate) fn report(ctx: &AppContext, fallback: &str, error: &ApiError) {
  let detail = extract_error_message(&error.to_value(), fallback);
  ctx.notifier.notify(Notification::error(fallback, detail));
}

/// Refuse a write before it reaches the network.
pub(crate) fn reject<T>(
  ctx: &AppContext,
  fallback: &str,
  message: impl Into<String>,
) -> Result<T, ApiError> {
  let error = ApiError::Validation(message.into());
  report(ctx, fallback, &error);
  Err(error)
}

fn invalidate_all(ctx: &AppContext, keys: &[QueryKey]) {
  for key in keys {
    ctx.queries.invalidate_queries(key);
  }
}

/// Invalidate-on-success.
///
/// The cache is left untouched when the write fails.
pub(crate) async fn run<T, Fut>(
  ctx: &AppContext,
  fallback: &str,
  affects: &[QueryKey],
  write: Fut,
) -> Result<T, ApiError>
where
  Fut: Future<Output = Result<T, ApiError>>,
{
  match write.await {
    Ok(value) => {
      invalidate_all(ctx, affects);
      Ok(value)
    }
    Err(e) => {
      report(ctx, fallback, &e);
      Err(e)
    }
  }
}

/// Optimistic update with rollback on `key`.
///
/// `patch` computes what the cached value will look like once the write
/// succeeds. On success `key` and every key in `affects` are invalidated; on
/// failure `key` is restored to its exact pre-mutation entry.
pub(crate) async fn run_optimistic<S, T, P, Fut>(
  ctx: &AppContext,
  fallback: &str,
  key: &QueryKey,
  patch: P,
  write: Fut,
  affects: &[QueryKey],
) -> Result<T, ApiError>
where
  S: Serialize + DeserializeOwned,
  P: FnOnce(Option<S>) -> Option<S>,
  Fut: Future<Output = Result<T, ApiError>>,
{
  let snapshot = ctx.queries.begin(key);

  if let Err(e) = ctx.queries.apply::<S, _>(key, patch) {
    ctx.queries.rollback(snapshot);
    report(ctx, fallback, &e);
    return Err(e);
  }

  match write.await {
    Ok(value) => {
      ctx.queries.commit(snapshot);
      invalidate_all(ctx, affects);
      Ok(value)
    }
    Err(e) => {
      ctx.queries.rollback(snapshot);
      report(ctx, fallback, &e);
      Err(e)
    }
  }
}
