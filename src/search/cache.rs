//! Search result cache with LRU eviction
//!
//! Only successful responses are cached. Failures pass through and are
//! never retried here.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;

use super::provider::BookSearchProvider;
use super::types::SearchError;
use crate::scan::CandidateBook;

const DEFAULT_CAPACITY: usize = 512;

/// Cache key: query text plus requested result count
type QueryKey = (String, usize);

/// Provider wrapper serving repeated queries from memory
pub struct CachedSearchProvider {
    inner: Arc<dyn BookSearchProvider>,
    cache: Mutex<LruCache<QueryKey, Vec<CandidateBook>>>,
}

impl CachedSearchProvider {
    pub fn new(inner: Arc<dyn BookSearchProvider>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of cached queries
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

#[async_trait]
impl BookSearchProvider for CachedSearchProvider {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<CandidateBook>, SearchError> {
        let key = (query.to_string(), max_results);

        let cached = self.cache.lock().get(&key).cloned();
        if let Some(hit) = cached {
            tracing::trace!(query = %query, "Search cache hit");
            return Ok(hit);
        }

        let books = self.inner.search(query, max_results).await?;
        self.cache.lock().put(key, books.clone());
        Ok(books)
    }
}
