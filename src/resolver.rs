//! Relation-title resolution with memoization
//!
//! Relation properties reference opaque page ids; resolving one costs a
//! document store round trip, so resolved titles are memoized for the
//! process lifetime. Entries are never invalidated — a renamed page keeps
//! its old title until restart, which is an accepted staleness risk.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::store::DocumentStore;

/// Sentinel for a partner relation that could not be resolved
pub const UNKNOWN_PARTNER: &str = "Unknown";

/// Sentinel for any other relation that could not be resolved
pub const UNKNOWN_RELATED_PAGE: &str = "Unknown Related Page";

/// Memoizing page-id → title resolver
///
/// Each resolver owns its cache (constructor injection, no global state) and
/// carries a fixed sentinel returned when resolution fails. Failures never
/// propagate out of [`resolve`](Self::resolve); they degrade to the sentinel
/// so one bad relation cannot abort an aggregation pass.
pub struct RelationResolver {
    store: Arc<dyn DocumentStore>,
    sentinel: &'static str,
    cache: Mutex<HashMap<String, String>>,
}

impl RelationResolver {
    /// Create a resolver with an empty cache and the given sentinel
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, sentinel: &'static str) -> Self {
        Self {
            store,
            sentinel,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a page id to its display title
    ///
    /// Cache hit returns immediately. On miss, fetches the page and caches
    /// the first non-empty title; a fetch failure or missing title caches
    /// and returns the sentinel. A concurrent miss on the same key at worst
    /// duplicates one upstream fetch.
    pub async fn resolve(&self, page_id: &str) -> String {
        if let Some(title) = self.cached(page_id) {
            return title;
        }

        let title = match self.store.page_title(page_id).await {
            Ok(Some(title)) => title,
            Ok(None) => self.sentinel.to_string(),
            Err(e) => {
                tracing::warn!(page_id, error = %e, "relation title lookup failed");
                self.sentinel.to_string()
            }
        };

        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(page_id.to_string(), title.clone());
        title
    }

    /// Sentinel returned by this resolver on failure
    #[must_use]
    pub fn sentinel(&self) -> &'static str {
        self.sentinel
    }

    fn cached(&self, page_id: &str) -> Option<String> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(page_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::store::RowPage;
    use crate::{Error, Result};

    /// Store fake that counts page fetches and fails for ids containing "bad"
    struct CountingStore {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore for CountingStore {
        async fn query_rows(&self, _cursor: Option<&str>, _page_size: usize) -> Result<RowPage> {
            Ok(RowPage::default())
        }

        async fn page_title(&self, page_id: &str) -> Result<Option<String>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if page_id.contains("bad") {
                return Err(Error::Resolution("boom".to_string()));
            }
            if page_id.contains("untitled") {
                return Ok(None);
            }
            Ok(Some(format!("Title of {page_id}")))
        }
    }

    #[tokio::test]
    async fn test_resolve_caches_titles() {
        let store = Arc::new(CountingStore {
            fetches: AtomicUsize::new(0),
        });
        let resolver = RelationResolver::new(store.clone(), UNKNOWN_PARTNER);

        assert_eq!(resolver.resolve("p-1").await, "Title of p-1");
        assert_eq!(resolver.resolve("p-1").await, "Title of p-1");
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolve_degrades_to_sentinel_and_caches_it() {
        let store = Arc::new(CountingStore {
            fetches: AtomicUsize::new(0),
        });
        let resolver = RelationResolver::new(store.clone(), UNKNOWN_RELATED_PAGE);

        assert_eq!(resolver.resolve("bad-1").await, UNKNOWN_RELATED_PAGE);
        assert_eq!(resolver.resolve("bad-1").await, UNKNOWN_RELATED_PAGE);
        // Failure is cached too; no repeat upstream fetch
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolve_missing_title_is_sentinel() {
        let store = Arc::new(CountingStore {
            fetches: AtomicUsize::new(0),
        });
        let resolver = RelationResolver::new(store, UNKNOWN_PARTNER);

        assert_eq!(resolver.resolve("untitled-1").await, UNKNOWN_PARTNER);
    }
}
