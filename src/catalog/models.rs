//! Catalog data models.
//!
//! Rows as they come out of the catalog store. The chat core only reads
//! these; nothing in this crate mutates an item or outfit after fetching it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single piece of clothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Row identifier
    pub id: i64,

    /// Display name (e.g., "White tee")
    pub name: String,

    /// Category such as "top", "bottom", "shoes"
    pub category: String,

    /// Free-text colour description
    pub color: String,

    /// Price in the shop's currency
    pub price: f64,

    /// When the row was created
    pub created_at: Option<DateTime<Utc>>,

    /// Whether the user already owns this piece
    #[serde(default)]
    pub owned: bool,
}

impl Item {
    /// Short descriptor used in prompt digests, e.g. `White tee(top)`.
    pub fn descriptor(&self) -> String {
        format!("{}({})", self.name, self.category)
    }
}

/// A curated outfit made of several items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outfit {
    /// Row identifier
    pub id: i64,

    /// Display name
    pub name: String,

    /// Occasion tag this outfit is meant for; matches the keyword vocabulary
    pub occasion: String,

    /// Free-text description
    pub description: String,

    /// When the row was created
    pub created_at: Option<DateTime<Utc>>,

    /// Constituent items, resolved through the join table
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Seed file layout accepted by `dada catalog import`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub items: Vec<SeedItem>,

    #[serde(default)]
    pub outfits: Vec<SeedOutfit>,
}

/// An item entry in a seed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedItem {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub owned: bool,
}

/// An outfit entry in a seed file, referencing items by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedOutfit {
    pub id: i64,
    pub name: String,
    pub occasion: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub item_ids: Vec<i64>,
}
