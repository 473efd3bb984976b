//! Every query key the hooks read or invalidate.
//!
//! Listing keys carry their parameters, so `items()` as a prefix matches every
//! page of every listing.

use crate::api::types::ItemListParams;
use crate::cache::QueryKey;

pub fn items() -> QueryKey {
  QueryKey::new("items")
}

pub fn items_list(params: &ItemListParams) -> QueryKey {
  items().with(params)
}

pub fn item(id: &str) -> QueryKey {
  QueryKey::new("item").with(id)
}

pub fn collections() -> QueryKey {
  QueryKey::new("collections")
}

pub fn collection(id: &str) -> QueryKey {
  QueryKey::new("collection").with(id)
}

/// Prefix of every public share view
pub fn shared_collections() -> QueryKey {
  QueryKey::new("share")
}

pub fn shared_collection(share_id: &str) -> QueryKey {
  shared_collections().with(share_id)
}

pub fn user() -> QueryKey {
  QueryKey::new("user")
}

pub fn stats() -> QueryKey {
  QueryKey::new("stats")
}

pub fn ai_credits() -> QueryKey {
  QueryKey::new("ai").with("credits")
}
