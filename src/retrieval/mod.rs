//! Keyword retrieval over the outfit catalog.
//!
//! A deliberately small "RAG" step: extract occasion tags from the user's
//! message, then pull a handful of matching outfits (with their items) to
//! hand to the chat orchestrator as context. The [`Retriever`] trait is the
//! seam where a different retrieval strategy can be plugged in.

pub mod keywords;

use anyhow::Result;

use crate::catalog::{CatalogStore, Outfit};

pub use keywords::{extract_keywords, occasion_tags, OCCASION_SYNONYMS};

/// Maximum number of outfits retrieved per message.
pub const OUTFIT_LIMIT: usize = 5;

/// Result of a catalog query for a tag set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    /// Outfits with their items resolved.
    pub outfits: Vec<Outfit>,
    /// True when tags were given but matched nothing, so the unfiltered
    /// listing was returned instead.
    pub filter_dropped: bool,
}

/// Everything retrieved for one user message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieval {
    /// Occasion tags found in the message, sorted.
    pub keywords: Vec<String>,
    /// Outfits to use as chat context.
    pub outfits: Vec<Outfit>,
    /// See [`CatalogQuery::filter_dropped`].
    pub filter_dropped: bool,
}

/// Turns a user message into catalog context.
///
/// Shared across request threads, so implementations must be `Send + Sync`.
pub trait Retriever: Send + Sync {
    fn retrieve(&self, text: &str) -> Result<Retrieval>;
}

/// Queries outfits for a tag set.
///
/// Filters by occasion when `tags` is non-empty, but never returns an empty
/// result while unfiltered outfits exist: an empty tag set, or a filter that
/// matches nothing, falls back to the first [`OUTFIT_LIMIT`] outfits.
pub fn query_by_tags<S: CatalogStore + ?Sized>(store: &S, tags: &[String]) -> Result<CatalogQuery> {
    let mut filter_dropped = false;

    let mut outfits = if tags.is_empty() {
        store.fetch_outfits(&[], OUTFIT_LIMIT)?
    } else {
        let filtered = store.fetch_outfits(tags, OUTFIT_LIMIT)?;
        if filtered.is_empty() {
            tracing::debug!("No outfits for tags {:?}, falling back to unfiltered", tags);
            filter_dropped = true;
            store.fetch_outfits(&[], OUTFIT_LIMIT)?
        } else {
            filtered
        }
    };

    for outfit in &mut outfits {
        outfit.items = store.items_for_outfit(outfit.id)?;
    }

    Ok(CatalogQuery {
        outfits,
        filter_dropped,
    })
}

/// The default retriever: substring keyword matching plus [`query_by_tags`].
pub struct KeywordRetriever<S> {
    store: S,
}

impl<S: CatalogStore> KeywordRetriever<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying catalog store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: CatalogStore> Retriever for KeywordRetriever<S> {
    fn retrieve(&self, text: &str) -> Result<Retrieval> {
        let keywords: Vec<String> = extract_keywords(text)
            .into_iter()
            .map(str::to_string)
            .collect();

        let query = query_by_tags(&self.store, &keywords)?;

        tracing::debug!(
            "Retrieved {} outfits for keywords {:?}",
            query.outfits.len(),
            keywords
        );

        Ok(Retrieval {
            keywords,
            outfits: query.outfits,
            filter_dropped: query.filter_dropped,
        })
    }
}
