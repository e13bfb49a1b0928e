//! Clothing catalog: items, outfits, and the store the chat core reads them from.

pub mod db;
pub mod models;

use anyhow::Result;

pub use db::{CatalogDatabase, ImportStats};
pub use models::*;

/// Read access to the outfit catalog.
///
/// Both calls are blocking round trips to whatever backs the catalog.
pub trait CatalogStore: Send + Sync {
    /// Fetch up to `limit` outfits whose occasion is one of `tags`.
    ///
    /// An empty `tags` slice means no filter. Returned outfits have an empty
    /// `items` list; use [`CatalogStore::items_for_outfit`] to resolve them.
    fn fetch_outfits(&self, tags: &[String], limit: usize) -> Result<Vec<Outfit>>;

    /// Fetch the items joined to an outfit.
    fn items_for_outfit(&self, outfit_id: i64) -> Result<Vec<Item>>;
}
