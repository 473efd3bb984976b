//! Collection reads and writes, including drag-reorder and AI suggestions.

use tracing::{info, warn};

use crate::api::error::ApiError;
use crate::api::types::{
  AddCollectionItem, Collection, CollectionItem, CollectionPatch, CollectionSuggestion,
  NewCollection, ReorderEntry, SharePatch, ShareSettings,
};
use crate::api::{collections, share};
use crate::context::AppContext;
use crate::notify::Notification;
use crate::query::Query;

use super::keys;
use super::mutation::{reject, report, run, run_optimistic};

/// Move the member at `from` to position `to` and renumber everyone densely.
///
/// Positions index the members sorted by their current `order`.
pub fn reorder_members(
  members: &[CollectionItem],
  from: usize,
  to: usize,
) -> Result<Vec<CollectionItem>, String> {
  if from >= members.len() || to >= members.len() {
    return Err(format!(
      "Position out of range (collection has {} items)",
      members.len()
    ));
  }

  let mut sorted = members.to_vec();
  sorted.sort_by_key(|m| m.order);
  let moved = sorted.remove(from);
  sorted.insert(to, moved);
  for (order, member) in sorted.iter_mut().enumerate() {
    member.order = order as u32;
  }
  Ok(sorted)
}

/// The bulk payload for a full order reassignment.
pub fn reorder_payload(members: &[CollectionItem]) -> Vec<ReorderEntry> {
  members
    .iter()
    .map(|m| ReorderEntry {
      item_id: m.item.id.clone(),
      order: m.order,
    })
    .collect()
}

pub struct CollectionHooks<'a> {
  ctx: &'a AppContext,
}

impl<'a> CollectionHooks<'a> {
  pub(crate) fn new(ctx: &'a AppContext) -> Self {
    Self { ctx }
  }

  pub fn list(&self) -> Query<Vec<Collection>> {
    let transport = self.ctx.transport.clone();
    Query::new(&self.ctx.queries, keys::collections(), move || {
      let transport = transport.clone();
      async move { collections::list(transport.as_ref()).await }
    })
    .enabled(self.ctx.signed_in())
  }

  pub fn detail(&self, id: &str) -> Query<Collection> {
    let transport = self.ctx.transport.clone();
    let id = id.to_string();
    Query::new(&self.ctx.queries, keys::collection(&id), move || {
      let transport = transport.clone();
      let id = id.clone();
      async move { collections::get(transport.as_ref(), &id).await }
    })
    .enabled(self.ctx.signed_in())
  }

  /// Public read of a shared collection; works signed out.
  pub fn shared(&self, share_id: &str) -> Query<Collection> {
    let transport = self.ctx.transport.clone();
    let share_id = share_id.to_string();
    Query::new(&self.ctx.queries, keys::shared_collection(&share_id), move || {
      let transport = transport.clone();
      let share_id = share_id.clone();
      async move { share::get_shared_collection(transport.as_ref(), &share_id).await }
    })
  }

  pub async fn create(&self, collection: NewCollection) -> Result<Collection, ApiError> {
    const FALLBACK: &str = "Failed to create collection";
    if collection.name.trim().is_empty() {
      return reject(self.ctx, FALLBACK, "Collection name is required");
    }

    run(
      self.ctx,
      FALLBACK,
      &[keys::collections(), keys::stats()],
      collections::create(self.ctx.transport.as_ref(), &collection),
    )
    .await
  }

  pub async fn update(&self, id: &str, patch: CollectionPatch) -> Result<Collection, ApiError> {
    const FALLBACK: &str = "Failed to update collection";
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return reject(self.ctx, FALLBACK, "Collection name is required");
    }

    run(
      self.ctx,
      FALLBACK,
      &[keys::collections(), keys::collection(id)],
      collections::update(self.ctx.transport.as_ref(), id, &patch),
    )
    .await
  }

  pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
    run(
      self.ctx,
      "Failed to delete collection",
      &[keys::collections(), keys::stats()],
      collections::remove(self.ctx.transport.as_ref(), id),
    )
    .await?;
    self.ctx.queries.remove_queries(&keys::collection(id));
    Ok(())
  }

  pub async fn add_item(
    &self,
    id: &str,
    item_id: &str,
    note: Option<String>,
  ) -> Result<Collection, ApiError> {
    let body = AddCollectionItem {
      item_id: item_id.to_string(),
      note,
    };
    run(
      self.ctx,
      "Failed to add item to collection",
      &[keys::collections(), keys::collection(id)],
      collections::add_item(self.ctx.transport.as_ref(), id, &body),
    )
    .await
  }

  pub async fn remove_item(&self, id: &str, item_id: &str) -> Result<(), ApiError> {
    run(
      self.ctx,
      "Failed to remove item from collection",
      &[keys::collections(), keys::collection(id)],
      collections::remove_item(self.ctx.transport.as_ref(), id, item_id),
    )
    .await
  }

  pub async fn update_share(&self, id: &str, patch: SharePatch) -> Result<ShareSettings, ApiError> {
    run(
      self.ctx,
      "Failed to update sharing",
      // The share id may change, so every public view is suspect
      &[
        keys::collections(),
        keys::collection(id),
        keys::shared_collections(),
      ],
      collections::update_share(self.ctx.transport.as_ref(), id, &patch),
    )
    .await
  }

  /// Drag the member at position `from` to position `to`.
  ///
  /// The new order shows up in the cached collection at once and is rolled
  /// back if the server refuses it.
  pub async fn reorder(&self, id: &str, from: usize, to: usize) -> Result<(), ApiError> {
    const FALLBACK: &str = "Failed to reorder items";

    let collection = match self.detail(id).fetch().await.into_result() {
      Ok(collection) => collection,
      Err(e) => {
        report(self.ctx, FALLBACK, &e);
        return Err(e);
      }
    };
    let members = match reorder_members(&collection.items, from, to) {
      Ok(members) => members,
      Err(message) => return reject(self.ctx, FALLBACK, message),
    };
    if from == to {
      return Ok(());
    }

    let payload = reorder_payload(&members);
    run_optimistic(
      self.ctx,
      FALLBACK,
      &keys::collection(id),
      move |cached: Option<Collection>| {
        cached.map(|mut c| {
          c.items = members;
          c
        })
      },
      collections::reorder(self.ctx.transport.as_ref(), id, &payload),
      &[keys::collections()],
    )
    .await
  }

  /// Create a suggested collection and attach its items.
  ///
  /// Attaching is best-effort: an item that fails is logged and skipped, and
  /// the operation still succeeds because the collection exists.
  pub async fn create_from_suggestion(
    &self,
    suggestion: &CollectionSuggestion,
  ) -> Result<Collection, ApiError> {
    let collection = self
      .create(NewCollection {
        name: suggestion.name.clone(),
        description: suggestion.description.clone(),
        cover_image: None,
      })
      .await?;

    let mut attached = 0;
    for item_id in &suggestion.item_ids {
      let body = AddCollectionItem {
        item_id: item_id.clone(),
        note: None,
      };
      match collections::add_item(self.ctx.transport.as_ref(), &collection.id, &body).await {
        Ok(_) => attached += 1,
        Err(e) => warn!(
          "Skipping item {} for collection {}: {}",
          item_id, collection.id, e
        ),
      }
    }

    info!(
      "Created collection {} with {}/{} suggested items",
      collection.id,
      attached,
      suggestion.item_ids.len()
    );
    self.ctx.queries.invalidate_queries(&keys::collections());
    self
      .ctx
      .queries
      .invalidate_queries(&keys::collection(&collection.id));
    self.ctx.notifier.notify(Notification::success(format!(
      "Created \"{}\" with {} items",
      collection.name, attached
    )));
    Ok(collection)
  }
}
