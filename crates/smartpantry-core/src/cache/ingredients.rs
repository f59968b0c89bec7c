use std::sync::Arc;

use anyhow::Result;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::api::IngredientSource;
use crate::models::Ingredient;
use crate::utils::contains_ignore_case;

/// Entries returned for an empty query.
pub const EMPTY_QUERY_LIMIT: usize = 30;

/// Maximum number of matches returned for a non-empty query.
pub const SEARCH_RESULT_LIMIT: usize = 50;

/// Load-once, in-memory ingredient catalog with local search.
///
/// The catalog is fetched on first use and kept for the life of the cache.
/// Concurrent first callers share a single in-flight fetch. A failed fetch
/// is not memoized, so a later call can try again.
pub struct IngredientCache {
    source: Arc<dyn IngredientSource>,
    catalog: OnceCell<Arc<[Ingredient]>>,
}

impl IngredientCache {
    pub fn new(source: Arc<dyn IngredientSource>) -> Self {
        Self {
            source,
            catalog: OnceCell::new(),
        }
    }

    /// Whether the catalog has been fetched
    pub fn is_loaded(&self) -> bool {
        self.catalog.initialized()
    }

    /// The full catalog in its stable (sorted) order, fetching it on first use
    pub async fn catalog(&self) -> Result<Arc<[Ingredient]>> {
        let catalog = self
            .catalog
            .get_or_try_init(|| async {
                debug!("Ingredient catalog cold, fetching");
                let list = self.source.list_all_ingredients().await?;
                info!(count = list.len(), "Ingredient catalog loaded");
                Ok::<_, anyhow::Error>(Arc::from(list))
            })
            .await?;
        Ok(Arc::clone(catalog))
    }

    /// Search the catalog by case-insensitive substring.
    ///
    /// An empty query returns the head of the catalog. A failed catalog
    /// load yields no results rather than an error.
    pub async fn search(&self, query: &str) -> Vec<Ingredient> {
        match self.catalog().await {
            Ok(catalog) => filter_catalog(&catalog, query),
            Err(e) => {
                warn!(error = %e, "Failed to load ingredient catalog");
                Vec::new()
            }
        }
    }
}

/// Apply search limits to a catalog slice, preserving catalog order
pub fn filter_catalog(catalog: &[Ingredient], query: &str) -> Vec<Ingredient> {
    if query.is_empty() {
        return catalog.iter().take(EMPTY_QUERY_LIMIT).cloned().collect();
    }

    catalog
        .iter()
        .filter(|ingredient| contains_ignore_case(&ingredient.name, query))
        .take(SEARCH_RESULT_LIMIT)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    /// Catalog source that counts fetches and can be told to fail the first few.
    struct FakeSource {
        names: Vec<String>,
        calls: AtomicUsize,
        failures_before_success: usize,
        delay: Duration,
    }

    impl FakeSource {
        fn new(names: Vec<String>) -> Self {
            Self {
                names,
                calls: AtomicUsize::new(0),
                failures_before_success: 0,
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IngredientSource for FakeSource {
        async fn list_all_ingredients(&self) -> Result<Vec<Ingredient>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if call < self.failures_before_success {
                anyhow::bail!("connection refused");
            }
            // Vary the data per call so a refetch would be visible
            let mut list: Vec<Ingredient> = self.names.iter().map(Ingredient::new).collect();
            if call > 0 {
                list.push(Ingredient::new(format!("Refetched {}", call)));
            }
            Ok(list)
        }
    }

    fn numbered_catalog(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Item {:03}", i)).collect()
    }

    #[tokio::test]
    async fn test_empty_query_returns_first_30_in_order() {
        let source = Arc::new(FakeSource::new(numbered_catalog(100)));
        let cache = IngredientCache::new(source.clone());

        let results = cache.search("").await;
        assert_eq!(results.len(), EMPTY_QUERY_LIMIT);
        assert_eq!(results[0].name, "Item 000");
        assert_eq!(results[29].name, "Item 029");
    }

    #[tokio::test]
    async fn test_query_is_case_insensitive_and_capped() {
        let mut names: Vec<String> = (0..80).map(|i| format!("Banana {}", i)).collect();
        names.push("Salt".to_string());
        names.push("ANCHOVY".to_string());
        let cache = IngredientCache::new(Arc::new(FakeSource::new(names)));

        let results = cache.search("an").await;
        assert_eq!(results.len(), SEARCH_RESULT_LIMIT);
        assert!(results.iter().all(|i| i.name.to_lowercase().contains("an")));

        let results = cache.search("anch").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "ANCHOVY");

        assert!(cache.search("zzz").await.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_fetched_only_once() {
        let source = Arc::new(FakeSource::new(vec!["Salt".to_string(), "Sugar".to_string()]));
        let cache = IngredientCache::new(source.clone());
        assert!(!cache.is_loaded());

        cache.search("").await;
        cache.search("s").await;
        cache.search("sugar").await;

        assert!(cache.is_loaded());
        assert_eq!(source.calls(), 1);
        // A refetch would have appended a "Refetched" entry
        assert_eq!(cache.catalog().await.expect("catalog").len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_cold_callers_share_one_fetch() {
        let mut fake = FakeSource::new(numbered_catalog(10));
        fake.delay = Duration::from_millis(50);
        let source = Arc::new(fake);
        let cache = Arc::new(IngredientCache::new(source.clone()));

        let searches = (0..8).map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.search("item").await })
        });
        let results = futures::future::join_all(searches).await;

        for result in results {
            assert_eq!(result.expect("task should not panic").len(), 10);
        }
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_memoized() {
        let mut fake = FakeSource::new(vec!["Salt".to_string()]);
        fake.failures_before_success = 1;
        let source = Arc::new(fake);
        let cache = IngredientCache::new(source.clone());

        assert!(cache.search("").await.is_empty());
        assert!(!cache.is_loaded());

        let results = cache.search("").await;
        assert_eq!(source.calls(), 2);
        assert!(cache.is_loaded());
        assert!(results.iter().any(|i| i.name == "Salt"));
    }

    #[test]
    fn test_filter_catalog_keeps_catalog_order() {
        let catalog: Vec<Ingredient> = ["Apple", "Banana", "Pineapple", "Grape"]
            .into_iter()
            .map(Ingredient::new)
            .collect();
        let names: Vec<String> = filter_catalog(&catalog, "APP")
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Apple", "Pineapple"]);
    }
}
