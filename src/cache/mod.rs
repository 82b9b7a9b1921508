use moka::future::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// In-process cache for public gallery responses.
///
/// Entries hold the serialized `data` payload. Every mutation of the gallery
/// calls [`GalleryCache::invalidate_all`], which also bumps a generation
/// counter. Readers take [`GalleryCache::generation`] before querying and pass
/// it to [`GalleryCache::set`]; a result read before an invalidation is never
/// cached.
#[derive(Clone)]
pub struct GalleryCache {
    cache: Cache<String, Arc<serde_json::Value>>,
    generation: Arc<AtomicU64>,
}

impl GalleryCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .time_to_live(config.gallery_ttl)
            .max_capacity(config.max_entries)
            .build();
        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current invalidation generation; take it before reading the database.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Get a value from cache
    pub async fn get(&self, key: &str) -> Option<Arc<serde_json::Value>> {
        self.cache.get(key).await
    }

    /// Store a value read at `generation`, unless the gallery changed since.
    /// Returns whether the value was kept.
    pub async fn set(&self, key: String, value: serde_json::Value, generation: u64) -> bool {
        if self.generation() != generation {
            return false;
        }
        self.cache.insert(key.clone(), Arc::new(value)).await;

        // An invalidation may have landed between the check and the insert.
        if self.generation() != generation {
            self.cache.invalidate(&key).await;
            return false;
        }
        true
    }

    /// Drop every cached gallery response
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate_all();
    }
}

/// Cache key generators
pub mod keys {
    use crate::models::portfolio::ImageFilter;

    /// Generate key for an image listing
    pub fn image_list(filter: &ImageFilter) -> String {
        format!(
            "portfolio:list:{}:{}",
            filter.category.map(|c| c.as_str()).unwrap_or("all"),
            filter.landing_only
        )
    }

    /// Key for the per-category overview
    pub fn category_summaries() -> String {
        "portfolio:categories".to_string()
    }
}

/// Cache configuration
pub struct CacheConfig {
    pub gallery_ttl: Duration,
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            gallery_ttl: Duration::from_secs(300), // 5 minutes
            max_entries: 64,
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            gallery_ttl: parse_duration_secs("CACHE_TTL_GALLERY", 300),
            max_entries: 64,
        }
    }
}

fn parse_duration_secs(env_var: &str, default: u64) -> Duration {
    std::env::var(env_var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

/// Wrapper type for Actix-web app data
pub type CacheData = Arc<GalleryCache>;
