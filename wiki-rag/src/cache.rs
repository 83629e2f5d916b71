//! Optional per-topic index cache.
//!
//! Entries are keyed by `(topic, max_length, overlap)`. Storing an index for
//! a topic drops every entry for that topic built with other chunking
//! parameters, so a topic never has stale windows lying around.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::index::FlatL2Index;

/// Cache key: the requested topic and the chunking parameters used to build the index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Topic as requested, before any redirect is resolved.
    pub topic: String,
    /// Window size the index was chunked with.
    pub max_length: usize,
    /// Window overlap the index was chunked with.
    pub overlap: usize,
}

impl CacheKey {
    /// Create a key for `topic` chunked with the given parameters.
    pub fn new(topic: impl Into<String>, max_length: usize, overlap: usize) -> Self {
        Self { topic: topic.into(), max_length, overlap }
    }
}

/// Shared cache of built indexes, safe to use from concurrent requests.
///
/// The cache holds at most one index per topic but is not otherwise
/// bounded: a pipeline serving many distinct topics keeps every one of them
/// until [`invalidate`](Self::invalidate) or [`clear`](Self::clear) is called.
///
/// # Example
///
/// ```rust,ignore
/// use wiki_rag::{IndexCache, QaPipeline};
///
/// let pipeline = QaPipeline::builder()
///     // ...collaborators...
///     .index_cache(Arc::new(IndexCache::new()))
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct IndexCache {
    entries: RwLock<HashMap<CacheKey, Arc<FlatL2Index>>>,
}

impl IndexCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the index built for `key`.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<FlatL2Index>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Store `index` under `key`, evicting the same topic's other parameterisations.
    pub async fn insert(&self, key: CacheKey, index: Arc<FlatL2Index>) {
        let mut entries = self.entries.write().await;
        entries.retain(|existing, _| existing.topic != key.topic);
        entries.insert(key, index);
    }

    /// Drop every entry for `topic`.
    pub async fn invalidate(&self, topic: &str) {
        self.entries.write().await.retain(|key, _| key.topic != topic);
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of cached indexes.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no indexes.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hit_requires_matching_parameters() {
        let cache = IndexCache::new();
        cache.insert(CacheKey::new("Rust", 256, 20), Arc::new(FlatL2Index::new())).await;

        assert!(cache.get(&CacheKey::new("Rust", 256, 20)).await.is_some());
        assert!(cache.get(&CacheKey::new("Rust", 128, 20)).await.is_none());
        assert!(cache.get(&CacheKey::new("Go", 256, 20)).await.is_none());
    }

    #[tokio::test]
    async fn new_parameters_evict_old_entry_for_topic() {
        let cache = IndexCache::new();
        cache.insert(CacheKey::new("Rust", 256, 20), Arc::new(FlatL2Index::new())).await;
        cache.insert(CacheKey::new("Go", 256, 20), Arc::new(FlatL2Index::new())).await;
        cache.insert(CacheKey::new("Rust", 128, 10), Arc::new(FlatL2Index::new())).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&CacheKey::new("Rust", 256, 20)).await.is_none());
        assert!(cache.get(&CacheKey::new("Rust", 128, 10)).await.is_some());
        assert!(cache.get(&CacheKey::new("Go", 256, 20)).await.is_some());
    }

    #[tokio::test]
    async fn invalidate_removes_topic() {
        let cache = IndexCache::new();
        cache.insert(CacheKey::new("Rust", 256, 20), Arc::new(FlatL2Index::new())).await;
        cache.invalidate("Rust").await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn distinct_topics_accumulate_until_cleared() {
        let cache = IndexCache::new();
        for topic in ["Rust", "Go", "Zig"] {
            cache.insert(CacheKey::new(topic, 256, 20), Arc::new(FlatL2Index::new())).await;
        }
        assert_eq!(cache.len().await, 3);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
