//! Typed request and response shapes for the Stasher backend.
//!
//! The backend speaks camelCase JSON. Response types default every optional
//! field so partially populated payloads (list views, public shares) still
//! decode.

use serde::{Deserialize, Serialize};

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
  pub access_token: String,
  pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
  pub email: String,
  pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
  pub name: String,
  pub email: String,
  pub username: String,
  pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
  #[serde(flatten)]
  pub tokens: TokenPair,
  pub user: UserProfile,
}

// ============================================================================
// Items
// ============================================================================

/// One entry of an item's append-only history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub action: String,
  pub date: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub image_url: Option<String>,
  #[serde(default)]
  pub icon_type: Option<String>,
  #[serde(default = "default_quantity")]
  pub quantity: u32,
  #[serde(default)]
  pub location: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub price: Option<f64>,
  #[serde(default)]
  pub priceless: bool,
  #[serde(default)]
  pub acquired_at: Option<String>,
  #[serde(default)]
  pub expires_at: Option<String>,
  #[serde(default)]
  pub archived: bool,
  #[serde(default)]
  pub history: Vec<HistoryEntry>,
  #[serde(default)]
  pub created_at: Option<String>,
  #[serde(default)]
  pub updated_at: Option<String>,
}

fn default_quantity() -> u32 {
  1
}

/// One page of the item listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPage {
  pub items: Vec<Item>,
  #[serde(default)]
  pub total: u64,
  #[serde(default = "default_page")]
  pub page: u32,
  #[serde(default)]
  pub total_pages: u32,
}

fn default_page() -> u32 {
  1
}

/// Server-side listing filters. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListParams {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub search: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tag: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub archived: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sort: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub page: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub limit: Option<u32>,
}

/// Client-side price facet applied on top of a fetched page
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PriceFilter {
  #[default]
  All,
  /// Items with a recorded price
  Priced,
  /// Items flagged priceless
  Priceless,
  /// Priced items within an inclusive range
  Range { min: Option<f64>, max: Option<f64> },
}

impl PriceFilter {
  pub fn matches(&self, item: &Item) -> bool {
    match *self {
      PriceFilter::All => true,
      PriceFilter::Priced => item.price.is_some() && !item.priceless,
      PriceFilter::Priceless => item.priceless,
      PriceFilter::Range { min, max } => match item.price {
        Some(price) if !item.priceless => {
          min.map_or(true, |m| price >= m) && max.map_or(true, |m| price <= m)
        }
        _ => false,
      },
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub icon_type: Option<String>,
  pub quantity: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub price: Option<f64>,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub priceless: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub acquired_at: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expires_at: Option<String>,
}

impl NewItem {
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      quantity: 1,
      ..Default::default()
    }
  }

  /// Reject drafts the backend would refuse anyway.
  pub fn validate(&self) -> Result<(), String> {
    if self.name.trim().is_empty() {
      return Err("Item name is required".to_string());
    }
    if self.quantity < 1 {
      return Err("Quantity must be at least 1".to_string());
    }
    if non_empty(&self.image_url) && non_empty(&self.icon_type) {
      return Err("An item has either an image or an icon, not both".to_string());
    }
    if self.price.is_some() && self.priceless {
      return Err("An item is either priced or priceless, not both".to_string());
    }
    Ok(())
  }
}

fn non_empty(value: &Option<String>) -> bool {
  value.as_deref().is_some_and(|s| !s.is_empty())
}

/// Partial item update.
///
/// Each field is tri-state: absent (untouched), `Some(None)` (cleared, sent as
/// `null`) or `Some(Some(v))` (set). Use the setters so paired fields stay
/// mutually exclusive within the same write.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image_url: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub icon_type: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub quantity: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tags: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub price: Option<Option<f64>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub priceless: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub acquired_at: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expires_at: Option<Option<String>>,
}

impl ItemPatch {
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn description(mut self, description: Option<String>) -> Self {
    self.description = Some(description);
    self
  }

  /// Set the image; clears any icon.
  pub fn image(mut self, url: impl Into<String>) -> Self {
    self.image_url = Some(Some(url.into()));
    self.icon_type = Some(None);
    self
  }

  /// Set the icon; clears any image.
  pub fn icon(mut self, icon: impl Into<String>) -> Self {
    self.icon_type = Some(Some(icon.into()));
    self.image_url = Some(None);
    self
  }

  pub fn quantity(mut self, quantity: u32) -> Self {
    self.quantity = Some(quantity);
    self
  }

  pub fn location(mut self, location: Option<String>) -> Self {
    self.location = Some(location);
    self
  }

  pub fn tags(mut self, tags: Vec<String>) -> Self {
    self.tags = Some(tags);
    self
  }

  /// Set a price; clears the priceless flag.
  pub fn price(mut self, price: f64) -> Self {
    self.price = Some(Some(price));
    self.priceless = Some(false);
    self
  }

  /// Mark priceless; clears any price.
  pub fn priceless(mut self) -> Self {
    self.price = Some(None);
    self.priceless = Some(true);
    self
  }

  pub fn validate(&self) -> Result<(), String> {
    if self.quantity == Some(0) {
      return Err("Quantity must be at least 1".to_string());
    }
    if let Some(name) = &self.name {
      if name.trim().is_empty() {
        return Err("Item name is required".to_string());
      }
    }
    let image_set = matches!(&self.image_url, Some(Some(s)) if !s.is_empty());
    let icon_set = matches!(&self.icon_type, Some(Some(s)) if !s.is_empty());
    if image_set && icon_set {
      return Err("An item has either an image or an icon, not both".to_string());
    }
    if matches!(self.price, Some(Some(_))) && self.priceless == Some(true) {
      return Err("An item is either priced or priceless, not both".to_string());
    }
    Ok(())
  }

  /// Apply this patch to a local copy, mirroring what the server will store.
  pub fn apply_to(&self, item: &mut Item) {
    if let Some(name) = &self.name {
      item.name = name.clone();
    }
    if let Some(v) = &self.description {
      item.description = v.clone();
    }
    if let Some(v) = &self.image_url {
      item.image_url = v.clone();
    }
    if let Some(v) = &self.icon_type {
      item.icon_type = v.clone();
    }
    if let Some(v) = self.quantity {
      item.quantity = v;
    }
    if let Some(v) = &self.location {
      item.location = v.clone();
    }
    if let Some(v) = &self.tags {
      item.tags = v.clone();
    }
    if let Some(v) = self.price {
      item.price = v;
    }
    if let Some(v) = self.priceless {
      item.priceless = v;
    }
    if let Some(v) = &self.acquired_at {
      item.acquired_at = v.clone();
    }
    if let Some(v) = &self.expires_at {
      item.expires_at = v.clone();
    }
  }
}

/// Body of the state-transition actions (archive, restore, gift, use)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionNote {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub note: Option<String>,
}

// ============================================================================
// Collections
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
  #[default]
  Private,
  Unlisted,
  Public,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShareSettings {
  pub enabled: bool,
  pub share_id: Option<String>,
  pub visibility: Visibility,
  pub show_prices: bool,
  pub show_locations: bool,
  pub show_notes: bool,
  pub show_tags: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
  pub item: Item,
  #[serde(default)]
  pub order: u32,
  #[serde(default)]
  pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub cover_image: Option<String>,
  #[serde(default)]
  pub items: Vec<CollectionItem>,
  #[serde(default)]
  pub share: ShareSettings,
  #[serde(default)]
  pub created_at: Option<String>,
  #[serde(default)]
  pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollection {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cover_image: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCollectionItem {
  pub item_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub note: Option<String>,
}

/// One element of the bulk reorder payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderEntry {
  pub item_id: String,
  pub order: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub enabled: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub visibility: Option<Visibility>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub show_prices: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub show_locations: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub show_notes: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub show_tags: Option<bool>,
}

// ============================================================================
// Users and vocabulary
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageCounters {
  pub item_count: u32,
  pub collection_count: u32,
  pub ai_requests_today: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub id: String,
  pub name: String,
  pub email: String,
  #[serde(default)]
  pub username: Option<String>,
  #[serde(default = "default_currency")]
  pub currency: String,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub locations: Vec<String>,
  #[serde(default)]
  pub usage: UsageCounters,
}

fn default_currency() -> String {
  "USD".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfilePatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Preferences {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewVocabularyEntry {
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TagList {
  pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocationList {
  pub locations: Vec<String>,
}

// ============================================================================
// Stats, uploads, AI
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountBucket {
  pub name: String,
  pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
  pub total_items: u64,
  pub active_items: u64,
  pub archived_items: u64,
  pub gifted_items: u64,
  pub used_items: u64,
  pub total_quantity: u64,
  pub total_value: f64,
  pub collections: u64,
  pub by_location: Vec<CountBucket>,
  pub by_tag: Vec<CountBucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiCredits {
  pub remaining: u32,
  pub total: u32,
  #[serde(default)]
  pub resets_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskRequest {
  pub question: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiAnswer {
  pub answer: String,
  #[serde(default)]
  pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageAnalysis {
  pub name: Option<String>,
  pub description: Option<String>,
  pub tags: Vec<String>,
  pub location: Option<String>,
  pub estimated_price: Option<f64>,
  pub icon_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSuggestion {
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub item_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SuggestionList {
  pub suggestions: Vec<CollectionSuggestion>,
}
