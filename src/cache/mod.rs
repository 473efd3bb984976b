//! In-memory query cache shared by every read and write.
//!
//! This module provides the synchronization core of the client:
//! - Entries addressed by structural [`QueryKey`]s
//! - At most one in-flight request per key (concurrent fetches are coalesced)
//! - Staleness windows and prefix invalidation with background refetch
//! - Cancellation so late responses cannot overwrite newer local state
//! - Snapshot/apply/commit/rollback for optimistic updates

mod client;
mod entry;
mod key;
mod transaction;

pub use client::{FetchFuture, QueryClient, Refetcher};
pub use entry::{CacheEntry, QueryStatus};
pub use key::QueryKey;
pub use transaction::Snapshot;
