//! Item reads and writes.

use crate::api::client::Upload;
use crate::api::error::ApiError;
use crate::api::types::{Item, ItemListParams, ItemPage, ItemPatch, NewItem, PriceFilter};
use crate::api::{items, uploads};
use crate::cache::QueryKey;
use crate::context::AppContext;
use crate::query::Query;

use super::keys;
use super::mutation::{reject, run, run_optimistic};

/// Page size assumed by the backend when `limit` is not sent
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Narrow a fetched page to the price facet and recompute its page count.
///
/// Only the current page is seen, so `total_pages` is correct for this page
/// alone.
pub fn apply_price_filter(page: ItemPage, filter: PriceFilter, limit: Option<u32>) -> ItemPage {
  if filter == PriceFilter::All {
    return page;
  }

  let items: Vec<Item> = page
    .items
    .into_iter()
    .filter(|item| filter.matches(item))
    .collect();
  let per_page = limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1) as usize;

  ItemPage {
    total_pages: items.len().div_ceil(per_page) as u32,
    items,
    ..page
  }
}

pub struct ItemHooks<'a> {
  ctx: &'a AppContext,
}

impl<'a> ItemHooks<'a> {
  pub(crate) fn new(ctx: &'a AppContext) -> Self {
    Self { ctx }
  }

  /// Keys touched by any write to item `id`.
  fn affected(id: &str) -> Vec<QueryKey> {
    vec![
      keys::items(),
      keys::item(id),
      QueryKey::new("collection"),
      keys::stats(),
    ]
  }

  pub fn list(&self, params: ItemListParams, filter: PriceFilter) -> Query<ItemPage> {
    let transport = self.ctx.transport.clone();
    let key = keys::items_list(&params);
    let limit = params.limit;

    Query::new(&self.ctx.queries, key, move || {
      let transport = transport.clone();
      let params = params.clone();
      async move { items::list(transport.as_ref(), &params).await }
    })
    .select(move |page| apply_price_filter(page, filter, limit))
    .enabled(self.ctx.signed_in())
  }

  pub fn detail(&self, id: &str) -> Query<Item> {
    let transport = self.ctx.transport.clone();
    let id = id.to_string();

    Query::new(&self.ctx.queries, keys::item(&id), move || {
      let transport = transport.clone();
      let id = id.clone();
      async move { items::get(transport.as_ref(), &id).await }
    })
    .enabled(self.ctx.signed_in())
  }

  pub async fn create(&self, item: NewItem) -> Result<Item, ApiError> {
    const FALLBACK: &str = "Failed to add item";
    if let Err(message) = item.validate() {
      return reject(self.ctx, FALLBACK, message);
    }

    run(
      self.ctx,
      FALLBACK,
      &[keys::items(), keys::stats()],
      items::create(self.ctx.transport.as_ref(), &item),
    )
    .await
  }

  pub async fn bulk_create(&self, drafts: Vec<NewItem>) -> Result<Vec<Item>, ApiError> {
    const FALLBACK: &str = "Failed to add items";
    if drafts.is_empty() {
      return reject(self.ctx, FALLBACK, "Nothing to add");
    }
    for (i, draft) in drafts.iter().enumerate() {
      if let Err(message) = draft.validate() {
        return reject(self.ctx, FALLBACK, format!("Item {}: {}", i + 1, message));
      }
    }

    run(
      self.ctx,
      FALLBACK,
      &[keys::items(), keys::stats()],
      items::bulk_create(self.ctx.transport.as_ref(), &drafts),
    )
    .await
  }

  pub async fn update(&self, id: &str, patch: ItemPatch) -> Result<Item, ApiError> {
    const FALLBACK: &str = "Failed to update item";
    if let Err(message) = patch.validate() {
      return reject(self.ctx, FALLBACK, message);
    }

    run_optimistic(
      self.ctx,
      FALLBACK,
      &keys::item(id),
      |item: Option<Item>| {
        item.map(|mut item| {
          patch.apply_to(&mut item);
          item
        })
      },
      items::update(self.ctx.transport.as_ref(), id, &patch),
      &Self::affected(id),
    )
    .await
  }

  pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
    run(
      self.ctx,
      "Failed to delete item",
      &Self::affected(id),
      items::remove(self.ctx.transport.as_ref(), id),
    )
    .await?;
    self.ctx.queries.remove_queries(&keys::item(id));
    Ok(())
  }

  pub async fn archive(&self, id: &str, note: Option<&str>) -> Result<Item, ApiError> {
    run(
      self.ctx,
      "Failed to archive item",
      &Self::affected(id),
      items::archive(self.ctx.transport.as_ref(), id, note),
    )
    .await
  }

  pub async fn restore(&self, id: &str, note: Option<&str>) -> Result<Item, ApiError> {
    run(
      self.ctx,
      "Failed to restore item",
      &Self::affected(id),
      items::restore(self.ctx.transport.as_ref(), id, note),
    )
    .await
  }

  pub async fn gift(&self, id: &str, note: Option<&str>) -> Result<Item, ApiError> {
    run(
      self.ctx,
      "Failed to gift item",
      &Self::affected(id),
      items::gift(self.ctx.transport.as_ref(), id, note),
    )
    .await
  }

  /// Use one unit. The last unit archives the item instead of reaching zero.
  pub async fn use_item(&self, item: &Item, note: Option<&str>) -> Result<Item, ApiError> {
    if item.quantity <= 1 {
      return self.archive(&item.id, note).await;
    }

    run(
      self.ctx,
      "Failed to use item",
      &Self::affected(&item.id),
      items::use_one(self.ctx.transport.as_ref(), &item.id, note),
    )
    .await
  }

  pub async fn upload_image(&self, upload: Upload) -> Result<String, ApiError> {
    run(
      self.ctx,
      "Failed to upload image",
      &[],
      uploads::upload_image(self.ctx.transport.as_ref(), upload),
    )
    .await
  }

  /// Upload a photo and make it the item's image, dropping any icon.
  pub async fn set_image(&self, id: &str, upload: Upload) -> Result<Item, ApiError> {
    let url = self.upload_image(upload).await?;
    self.update(id, ItemPatch::default().image(url)).await
  }
}
