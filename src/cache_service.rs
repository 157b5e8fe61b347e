use crate::cache::{
    CacheEntry, CacheStats, ImageCache, ImageCacheStore, PlatformStorage, DEFAULT_EXPIRY_HOURS,
};
use crate::db::AppSettings;
use crate::error::ResolveError;
use once_cell::sync::Lazy;
use std::sync::Mutex;

const MAX_EXPIRY_HOURS: u32 = 24 * 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RuntimeCacheConfig {
    enabled: bool,
    expiry_hours: u32,
}

impl Default for RuntimeCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            expiry_hours: DEFAULT_EXPIRY_HOURS,
        }
    }
}

impl RuntimeCacheConfig {
    fn from_settings(settings: &AppSettings) -> Self {
        Self {
            enabled: settings.cache_enabled,
            expiry_hours: settings.cache_expiry_hours.clamp(1, MAX_EXPIRY_HOURS),
        }
    }
}

static CACHE: Lazy<Mutex<ImageCache<PlatformStorage>>> =
    Lazy::new(|| Mutex::new(ImageCache::load_platform()));
static CACHE_CONFIG: Lazy<Mutex<RuntimeCacheConfig>> =
    Lazy::new(|| Mutex::new(RuntimeCacheConfig::default()));

pub fn apply_settings(settings: &AppSettings) {
    let config = RuntimeCacheConfig::from_settings(settings);
    *CACHE_CONFIG.lock().unwrap_or_else(|e| e.into_inner()) = config;

    let mut cache = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    cache.set_expiry_hours(config.expiry_hours);
}

pub fn is_enabled() -> bool {
    CACHE_CONFIG.lock().unwrap_or_else(|e| e.into_inner()).enabled
}

pub fn lookup(key: &str) -> Result<Option<CacheEntry>, ResolveError> {
    if !is_enabled() {
        return Ok(None);
    }
    let cache = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    cache.lookup(key)
}

pub fn put(key: &str, url: &str) -> bool {
    if !is_enabled() {
        return false;
    }
    let cache = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    cache.put(key, url);
    true
}

pub fn evict(key: &str) {
    let cache = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    cache.evict(key);
}

pub fn remove_by_prefix(prefix: &str) -> usize {
    let cache = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    cache.remove_prefix(&format!("{prefix}_"))
}

pub fn clear_all() -> usize {
    let cache = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    cache.clear()
}

pub fn stats() -> CacheStats {
    let cache = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    cache.stats()
}

/// Handle to the process-wide cache, honoring the runtime enable switch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedImageCache;

impl ImageCacheStore for SharedImageCache {
    fn lookup(&self, key: &str) -> Result<Option<CacheEntry>, ResolveError> {
        lookup(key)
    }

    fn put(&self, key: &str, url: &str) {
        put(key, url);
    }

    fn evict(&self, key: &str) {
        evict(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_clamp_expiry() {
        let settings = AppSettings {
            cache_enabled: false,
            cache_expiry_hours: 10_000,
            ..AppSettings::default()
        };
        assert_eq!(
            RuntimeCacheConfig::from_settings(&settings),
            RuntimeCacheConfig {
                enabled: false,
                expiry_hours: MAX_EXPIRY_HOURS,
            }
        );

        let settings = AppSettings {
            cache_expiry_hours: 0,
            ..AppSettings::default()
        };
        assert_eq!(RuntimeCacheConfig::from_settings(&settings).expiry_hours, 1);
    }

    #[test]
    fn defaults_match_settings_defaults() {
        assert_eq!(
            RuntimeCacheConfig::from_settings(&AppSettings::default()),
            RuntimeCacheConfig::default()
        );
    }
}
