//! Food Resolution Service: ids and free-text queries against ranked sources.
//!
//! Priority order (for deduplication and result order) is external catalog
//! first, then the curated local catalog, then barcode lookups. A failing or
//! slow external source is logged and skipped; only having no source enabled
//! at all is an error.

mod cache;
pub mod openfoodfacts;
pub mod sanitize;
mod source;

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::catalog::LocalCatalog;
use crate::error::{Result, SwapError};
use crate::models::{FoodItem, FoodSource};

pub use cache::TtlCache;
pub use openfoodfacts::{OpenFoodFactsClient, OpenFoodFactsConfig};
pub use sanitize::sanitize_external;
pub use source::{BARCODE_ID_PREFIX, EXTERNAL_ID_PREFIX, ExternalCatalog};

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub enable_local: bool,
    /// Upper bound for any single external call.
    pub source_timeout: Duration,
    pub cache_ttl: Duration,
    /// Size past which expired cache entries are swept.
    pub cache_max_entries: usize,
    /// Local results per search page.
    pub page_size: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            enable_local: true,
            source_timeout: Duration::from_secs(3),
            cache_ttl: Duration::from_secs(300),
            cache_max_entries: 500,
            page_size: 20,
        }
    }
}

/// Resolves foods across the local catalog and an optional external catalog.
///
/// Owns its caches; construct one per isolated context and share it by
/// reference.
pub struct FoodResolver {
    config: ResolverConfig,
    local: Option<LocalCatalog>,
    external: Option<Arc<dyn ExternalCatalog>>,
    search_cache: TtlCache<(String, u32), Vec<FoodItem>>,
    item_cache: TtlCache<String, Option<FoodItem>>,
}

impl FoodResolver {
    pub fn new(config: ResolverConfig) -> Self {
        let search_cache = TtlCache::new(config.cache_ttl, config.cache_max_entries);
        let item_cache = TtlCache::new(config.cache_ttl, config.cache_max_entries);
        Self {
            config,
            local: None,
            external: None,
            search_cache,
            item_cache,
        }
    }

    /// Resolver over the curated catalog only, default config.
    pub fn local_only() -> Self {
        Self::new(ResolverConfig::default()).with_local(LocalCatalog::curated())
    }

    pub fn with_local(mut self, catalog: LocalCatalog) -> Self {
        self.local = Some(catalog);
        self
    }

    pub fn with_external(mut self, external: Arc<dyn ExternalCatalog>) -> Self {
        self.external = Some(external);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn local(&self) -> Option<&LocalCatalog> {
        self.local.as_ref().filter(|_| self.config.enable_local)
    }

    /// Names of the enabled sources, in priority order.
    pub fn enabled_sources(&self) -> Vec<&str> {
        let mut sources = Vec::new();
        if let Some(external) = &self.external {
            sources.push(external.name());
        }
        if self.local().is_some() {
            sources.push("local");
        }
        sources
    }

    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    /// Run an external call under the per-source timeout.
    ///
    /// Every failure, timeout included, comes back as `DataSourceUnavailable`.
    async fn bounded<T>(&self, source: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.config.source_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e @ SwapError::DataSourceUnavailable { .. })) => Err(e),
            Ok(Err(e)) => Err(SwapError::unavailable(source, e.to_string())),
            Err(_) => Err(SwapError::unavailable(
                source,
                format!("timed out after {:?}", self.config.source_timeout),
            )),
        }
    }

    /// Search every enabled source and merge the results.
    ///
    /// Results are deduplicated by normalized name, external first. A failed
    /// source is logged and excluded; the merged result is only cached when
    /// every source answered.
    pub async fn search(&self, query: &str, page: u32) -> Result<Vec<FoodItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SwapError::Validation("search query cannot be empty".to_string()));
        }
        if self.enabled_sources().is_empty() {
            return Err(SwapError::Config("no food source is enabled".to_string()));
        }

        let page = page.max(1);
        let cache_key = (query.to_lowercase(), page);
        if let Some(hit) = self.search_cache.get(&cache_key) {
            debug!(query, page, results = hit.len(), "search cache hit");
            return Ok(hit);
        }

        let mut complete = true;
        let mut batches: Vec<Vec<FoodItem>> = Vec::new();

        if let Some(external) = &self.external {
            let call = external.search(query, page);
            match self.bounded(external.name(), call).await {
                Ok(foods) => batches.push(
                    foods
                        .into_iter()
                        .map(|f| sanitize_external(f, FoodSource::ExternalCatalog))
                        .collect(),
                ),
                Err(e) => {
                    warn!(
                        source = external.name(),
                        query,
                        error = %e,
                        "external search failed, falling back"
                    );
                    complete = false;
                }
            }
        }

        if let Some(local) = self.local() {
            let skip = (page as usize - 1) * self.config.page_size;
            batches.push(
                local
                    .search(query)
                    .into_iter()
                    .skip(skip)
                    .take(self.config.page_size)
                    .cloned()
                    .collect(),
            );
        }

        let merged = dedupe_by_name(batches.into_iter().flatten());
        let results = merged.len();
        debug!(query, page, results, complete, "search finished");
        if complete {
            self.search_cache.insert(cache_key, merged.clone());
        }
        Ok(merged)
    }

    /// Look up a food by id.
    ///
    /// Local ids are an O(1) map lookup; `off:` ids go to the external catalog
    /// and `barcode:` ids to the barcode endpoint. Anything else is `Ok(None)`.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<FoodItem>> {
        if let Some(food) = self.local().and_then(|local| local.get(id)) {
            return Ok(Some(food.clone()));
        }

        if let Some(code) = id.strip_prefix(BARCODE_ID_PREFIX) {
            return self.get_by_barcode(code).await;
        }

        let Some(code) = id.strip_prefix(EXTERNAL_ID_PREFIX) else {
            debug!(food_id = id, "unknown food id");
            return Ok(None);
        };
        let Some(external) = &self.external else {
            debug!(food_id = id, "external id without an external catalog");
            return Ok(None);
        };

        if let Some(cached) = self.item_cache.get(&id.to_string()) {
            return Ok(cached);
        }
        let found = self
            .bounded(external.name(), external.get_by_id(code))
            .await?
            .map(|f| sanitize_external(f, FoodSource::ExternalCatalog));
        self.item_cache.insert(id.to_string(), found.clone());
        Ok(found)
    }

    /// Look up a packaged food by barcode.
    ///
    /// Not found is `Ok(None)`; any other failure is `DataSourceUnavailable`.
    pub async fn get_by_barcode(&self, code: &str) -> Result<Option<FoodItem>> {
        let code = code.trim();
        if let Some(food) = self.local().and_then(|local| local.get_by_barcode(code)) {
            return Ok(Some(food.clone()));
        }

        let Some(external) = &self.external else {
            return Err(SwapError::Config(
                "barcode lookup needs an external catalog".to_string(),
            ));
        };

        let cache_key = format!("{BARCODE_ID_PREFIX}{code}");
        if let Some(cached) = self.item_cache.get(&cache_key) {
            return Ok(cached);
        }
        let found = self
            .bounded(external.name(), external.get_by_barcode(code))
            .await?
            .map(|f| sanitize_external(f, FoodSource::ExternalBarcode));
        self.item_cache.insert(cache_key, found.clone());
        Ok(found)
    }

    /// Every known food: external matches for `hint` (when asked for), then
    /// the local catalog in catalog order. Search hits that are local catalog
    /// entries keep their local position. Never fails.
    pub async fn all_foods(&self, include_external: bool, hint: Option<&str>) -> Vec<FoodItem> {
        let mut batches: Vec<Vec<FoodItem>> = Vec::new();

        if include_external && self.external.is_some() {
            if let Some(hint) = hint.filter(|h| !h.trim().is_empty()) {
                match self.search(hint, 1).await {
                    Ok(found) => batches.push(
                        found
                            .into_iter()
                            .filter(|f| !self.local().is_some_and(|l| l.contains(&f.id)))
                            .collect(),
                    ),
                    Err(e) => warn!(hint, error = %e, "external discovery failed"),
                }
            }
        }

        if let Some(local) = self.local() {
            batches.push(local.all().to_vec());
        }

        dedupe_by_name(batches.into_iter().flatten())
    }

    /// Probe the external catalog. False when none is configured.
    pub async fn test_connectivity(&self) -> bool {
        match &self.external {
            Some(external) => {
                let check = external.test_connectivity();
                tokio::time::timeout(self.config.source_timeout, check)
                    .await
                    .unwrap_or(false)
            }
            None => false,
        }
    }

    pub fn clear_caches(&self) {
        self.search_cache.clear();
        self.item_cache.clear();
    }

    /// (search entries, item entries)
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.search_cache.len(), self.item_cache.len())
    }
}

/// Keep the first food per normalized name key.
pub fn dedupe_by_name(foods: impl IntoIterator<Item = FoodItem>) -> Vec<FoodItem> {
    let mut seen = HashSet::new();
    foods
        .into_iter()
        .filter(|food| seen.insert(food.key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MacroProfile;

    #[test]
    fn test_dedupe_first_wins() {
        let foods = vec![
            FoodItem::per_100g(
                "off:1",
                "Greek Yogurt",
                MacroProfile::new(59.0, 10.0, 3.6, 0.4),
            ),
            FoodItem::per_100g(
                "greek_yogurt",
                "greek-yogurt",
                MacroProfile::new(60.0, 10.0, 3.6, 0.4),
            ),
            FoodItem::per_100g("skyr", "Skyr", MacroProfile::new(63.0, 11.0, 4.0, 0.2)),
        ];
        let deduped = dedupe_by_name(foods);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].id, "off:1");
    }

    #[tokio::test]
    async fn test_no_source_is_config_error() {
        let resolver = FoodResolver::new(ResolverConfig::default());
        let err = resolver.search("rice", 1).await.unwrap_err();
        assert!(matches!(err, SwapError::Config(_)));
    }

    #[tokio::test]
    async fn test_local_lookup() {
        let resolver = FoodResolver::local_only();
        let food = resolver.get_by_id("egg_whole").await.unwrap();
        assert_eq!(food.map(|f| f.grams_per_piece), Some(Some(50.0)));
        assert!(resolver.get_by_id("unknown_id").await.unwrap().is_none());
        assert!(resolver.get_by_id("off:123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_local_search_is_cached() {
        let resolver = FoodResolver::local_only();
        let first = resolver.search("Rice", 1).await.unwrap();
        assert!(!first.is_empty());
        assert_eq!(resolver.cache_stats().0, 1);

        let second = resolver.search("rice", 1).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(resolver.cache_stats().0, 1);

        resolver.clear_caches();
        assert_eq!(resolver.cache_stats(), (0, 0));
    }

    #[tokio::test]
    async fn test_barcode_without_external_is_config_error() {
        let resolver = FoodResolver::local_only();
        assert!(matches!(
            resolver.get_by_barcode("3017620422003").await,
            Err(SwapError::Config(_))
        ));
    }
}
