//! Query and mutation hooks: the only layer front ends talk to.
//!
//! Reads are [`Query`](crate::query::Query) handles bound to a key from
//! [`keys`]. Writes either invalidate the keys they affect on success or
//! patch one key optimistically and roll it back on failure. Every failed
//! write raises exactly one notification.

pub mod ai;
pub mod collections;
pub mod items;
pub mod keys;
mod mutation;
pub mod stats;
pub mod users;
pub mod vocabulary;

pub use ai::AiHooks;
pub use collections::CollectionHooks;
pub use items::ItemHooks;
pub use stats::StatsHooks;
pub use users::UserHooks;
pub use vocabulary::{VocabularyHooks, VocabularyKind, MAX_VOCABULARY_ENTRIES};
