//! Time-boxed image URL cache for UTrippin Imagery
//! Entries live in browser local storage on web and in a JSON file on desktop.

use crate::error::ResolveError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

pub const DEFAULT_EXPIRY_HOURS: u32 = 24;

/// Cached resolution for one normalized destination.
///
/// Serialized as `{"url": ..., "timestamp": <epoch millis>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(skip)]
    pub key: String,
    pub url: String,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, url: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            fetched_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>, expiry: Duration) -> bool {
        now.signed_duration_since(self.fetched_at) > expiry
    }
}

/// Outcome of a raw cache probe.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(CacheEntry),
    Miss,
    Expired(CacheEntry),
    Corrupted,
}

impl CacheLookup {
    pub fn into_hit(self) -> Option<CacheEntry> {
        match self {
            Self::Hit(entry) => Some(entry),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entry_count: usize,
    pub expired_count: usize,
}

/// String key/value backend. Browser local storage has exactly this shape.
pub trait KeyValueStorage {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// Injected cache capability used by the resolver.
pub trait ImageCacheStore {
    /// Fresh entry for `key`. Unreadable entries are removed and reported as
    /// [`ResolveError::CacheCorruption`].
    fn lookup(&self, key: &str) -> Result<Option<CacheEntry>, ResolveError>;
    fn put(&self, key: &str, url: &str);
    fn evict(&self, key: &str);

    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.lookup(key).ok().flatten()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.keys().cloned().collect()
    }
}

/// Expiring URL cache over any [`KeyValueStorage`].
///
/// Expired entries are never deleted eagerly; they are reported as absent and
/// overwritten by the next successful fetch.
#[derive(Debug)]
pub struct ImageCache<S> {
    storage: S,
    expiry: Duration,
}

impl<S: KeyValueStorage> ImageCache<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            expiry: Duration::hours(DEFAULT_EXPIRY_HOURS as i64),
        }
    }

    pub fn with_expiry_hours(mut self, hours: u32) -> Self {
        self.set_expiry_hours(hours);
        self
    }

    pub fn set_expiry_hours(&mut self, hours: u32) {
        self.expiry = Duration::hours(hours.max(1) as i64);
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn probe_at(&self, key: &str, now: DateTime<Utc>) -> CacheLookup {
        let Some(raw) = self.storage.read(key) else {
            return CacheLookup::Miss;
        };

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(mut entry) => {
                entry.key = key.to_string();
                if entry.is_expired_at(now, self.expiry) {
                    debug!(key, "cached image expired");
                    CacheLookup::Expired(entry)
                } else {
                    CacheLookup::Hit(entry)
                }
            }
            Err(error) => {
                warn!(key, %error, "dropping unreadable cache entry");
                self.storage.remove(key);
                CacheLookup::Corrupted
            }
        }
    }

    pub fn probe(&self, key: &str) -> CacheLookup {
        self.probe_at(key, Utc::now())
    }

    pub fn store_entry(&self, entry: &CacheEntry) {
        match serde_json::to_string(entry) {
            Ok(data) => self.storage.write(&entry.key, &data),
            Err(error) => warn!(key = %entry.key, %error, "failed to serialize cache entry"),
        }
    }

    pub fn remove_prefix(&self, prefix: &str) -> usize {
        let doomed = self
            .storage
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect::<Vec<_>>();
        for key in &doomed {
            self.storage.remove(key);
        }
        doomed.len()
    }

    pub fn clear(&self) -> usize {
        keys::PREFIXES
            .iter()
            .map(|prefix| self.remove_prefix(&format!("{prefix}_")))
            .sum()
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> CacheStats {
        let mut stats = CacheStats::default();
        for key in self.storage.keys().iter().filter(|key| keys::is_image_key(key)) {
            let Some(raw) = self.storage.read(key) else {
                continue;
            };
            stats.entry_count += 1;
            let expired = serde_json::from_str::<CacheEntry>(&raw)
                .map(|entry| entry.is_expired_at(now, self.expiry))
                .unwrap_or(true);
            if expired {
                stats.expired_count += 1;
            }
        }
        stats
    }

    pub fn stats(&self) -> CacheStats {
        self.stats_at(Utc::now())
    }
}

impl<S: KeyValueStorage> ImageCacheStore for ImageCache<S> {
    fn lookup(&self, key: &str) -> Result<Option<CacheEntry>, ResolveError> {
        match self.probe(key) {
            CacheLookup::Corrupted => Err(ResolveError::CacheCorruption {
                key: key.to_string(),
            }),
            lookup => Ok(lookup.into_hit()),
        }
    }

    fn put(&self, key: &str, url: &str) {
        self.store_entry(&CacheEntry::new(key, url, Utc::now()));
    }

    fn evict(&self, key: &str) {
        self.storage.remove(key);
    }
}

/// Cache key generation utilities
pub mod keys {
    use crate::utils::normalize_destination;

    pub const VECTEEZY: &str = "vecteezy_only";
    pub const PEXELS: &str = "pexels_image";
    pub const UNSPLASH: &str = "unsplash_image";
    pub const PIXABAY: &str = "destination_image";
    pub const UNIFIED: &str = "smart_destination";
    pub const STATIC_MAP: &str = "static_map";

    pub const PREFIXES: [&str; 6] = [VECTEEZY, PEXELS, UNSPLASH, PIXABAY, UNIFIED, STATIC_MAP];

    pub fn destination(prefix: &str, destination: &str) -> String {
        format!("{prefix}_{}", normalize_destination(destination))
    }

    pub fn is_image_key(key: &str) -> bool {
        PREFIXES
            .iter()
            .any(|prefix| key.strip_prefix(*prefix).is_some_and(|rest| rest.starts_with('_')))
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_impl {
    use super::KeyValueStorage;
    use gloo_storage::{LocalStorage, Storage};

    /// Browser local storage, shared by every component on the origin.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct BrowserStorage;

    impl KeyValueStorage for BrowserStorage {
        fn read(&self, key: &str) -> Option<String> {
            LocalStorage::raw().get_item(key).ok().flatten()
        }

        fn write(&self, key: &str, value: &str) {
            if LocalStorage::raw().set_item(key, value).is_err() {
                tracing::warn!(key, "local storage rejected cache write");
            }
        }

        fn remove(&self, key: &str) {
            LocalStorage::delete(key);
        }

        fn keys(&self) -> Vec<String> {
            let storage = LocalStorage::raw();
            (0..LocalStorage::length())
                .filter_map(|index| storage.key(index).ok().flatten())
                .collect()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native_impl {
    use super::KeyValueStorage;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// JSON file under the user cache directory, mirrored in memory.
    #[derive(Debug)]
    pub struct FileStorage {
        path: Option<PathBuf>,
        values: Mutex<HashMap<String, String>>,
    }

    impl FileStorage {
        pub fn open_default() -> Self {
            Self::open(Self::default_path())
        }

        pub fn open(path: Option<PathBuf>) -> Self {
            let values = path
                .as_ref()
                .and_then(|path| fs::read_to_string(path).ok())
                .and_then(|data| serde_json::from_str::<HashMap<String, String>>(&data).ok())
                .unwrap_or_default();
            Self {
                path,
                values: Mutex::new(values),
            }
        }

        fn default_path() -> Option<PathBuf> {
            dirs::cache_dir()
                .map(|dir: PathBuf| dir.join("utrippin"))
                .map(|dir: PathBuf| {
                    let _ = fs::create_dir_all(&dir);
                    dir.join("image_cache.json")
                })
        }

        fn flush(&self, values: &HashMap<String, String>) {
            let Some(path) = self.path.as_ref() else {
                return;
            };
            match serde_json::to_string(values) {
                Ok(data) => {
                    if let Err(error) = fs::write(path, data) {
                        tracing::warn!(path = %path.display(), %error, "failed to persist image cache");
                    }
                }
                Err(error) => tracing::warn!(%error, "failed to serialize image cache"),
            }
        }
    }

    impl KeyValueStorage for FileStorage {
        fn read(&self, key: &str) -> Option<String> {
            let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
            values.get(key).cloned()
        }

        fn write(&self, key: &str, value: &str) {
            let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
            values.insert(key.to_string(), value.to_string());
            self.flush(&values);
        }

        fn remove(&self, key: &str) {
            let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
            if values.remove(key).is_some() {
                self.flush(&values);
            }
        }

        fn keys(&self) -> Vec<String> {
            let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
            values.keys().cloned().collect()
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_impl::BrowserStorage as PlatformStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use native_impl::FileStorage as PlatformStorage;

impl ImageCache<PlatformStorage> {
    pub fn load_platform() -> Self {
        #[cfg(target_arch = "wasm32")]
        let storage = PlatformStorage;
        #[cfg(not(target_arch = "wasm32"))]
        let storage = PlatformStorage::open_default();
        Self::new(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> ImageCache<MemoryStorage> {
        ImageCache::new(MemoryStorage::new())
    }

    #[test]
    fn round_trip_within_window() {
        let cache = cache();
        cache.put("vecteezy_only_santorini", "https://img.example/santorini.jpg");

        let entry = cache.get("vecteezy_only_santorini").expect("entry");
        assert_eq!(entry.url, "https://img.example/santorini.jpg");
        assert_eq!(entry.key, "vecteezy_only_santorini");
    }

    #[test]
    fn entries_older_than_a_day_are_absent() {
        let cache = cache();
        let now = Utc::now();
        let stale = CacheEntry::new("k", "https://old", now - Duration::hours(25));
        cache.store_entry(&stale);

        assert!(matches!(cache.probe_at("k", now), CacheLookup::Expired(_)));
        assert!(cache.get("k").is_none());
        // still present until overwritten
        assert!(cache.storage().read("k").is_some());
    }

    #[test]
    fn entry_just_inside_window_is_a_hit() {
        let cache = cache();
        let now = Utc::now();
        cache.store_entry(&CacheEntry::new("k", "https://fresh", now - Duration::hours(23)));
        assert!(matches!(cache.probe_at("k", now), CacheLookup::Hit(_)));
    }

    #[test]
    fn corrupted_entry_is_deleted_and_missed() {
        let cache = cache();
        cache.storage().write("k", "{not json");

        assert_eq!(
            cache.lookup("k"),
            Err(ResolveError::CacheCorruption { key: "k".to_string() })
        );
        assert!(cache.storage().read("k").is_none());
        assert_eq!(cache.probe("k"), CacheLookup::Miss);
    }

    #[test]
    fn put_overwrites_and_evict_removes() {
        let cache = cache();
        cache.put("k", "https://one");
        cache.put("k", "https://two");
        assert_eq!(cache.get("k").map(|entry| entry.url), Some("https://two".to_string()));

        cache.evict("k");
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn stored_format_uses_millisecond_timestamp() {
        let cache = cache();
        let at = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).expect("timestamp");
        cache.store_entry(&CacheEntry::new("k", "https://x", at));

        let raw = cache.storage().read("k").expect("raw");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["url"], "https://x");
        assert_eq!(value["timestamp"], 1_700_000_000_000i64);
    }

    #[test]
    fn custom_expiry_is_respected() {
        let cache = cache().with_expiry_hours(2);
        let now = Utc::now();
        cache.store_entry(&CacheEntry::new("k", "https://x", now - Duration::hours(3)));
        assert!(matches!(cache.probe_at("k", now), CacheLookup::Expired(_)));
    }

    #[test]
    fn clear_only_touches_image_keys() {
        let cache = cache();
        cache.put(&keys::destination(keys::VECTEEZY, "Paris"), "https://a");
        cache.put(&keys::destination(keys::UNIFIED, "Tokyo"), "https://b");
        cache.storage().write("utrippin.app_settings", "{}");

        assert_eq!(cache.stats().entry_count, 2);
        assert_eq!(cache.clear(), 2);
        assert!(cache.storage().read("utrippin.app_settings").is_some());
    }

    #[test]
    fn stats_count_expired_and_corrupt_entries() {
        let cache = cache();
        let now = Utc::now();
        cache.store_entry(&CacheEntry::new("pexels_image_rome", "https://a", now));
        cache.store_entry(&CacheEntry::new("pexels_image_oslo", "https://b", now - Duration::days(3)));
        cache.storage().write("pexels_image_lima", "garbage");

        let stats = cache.stats_at(now);
        assert_eq!(stats.entry_count, 3);
        assert_eq!(stats.expired_count, 2);
    }

    #[test]
    fn keys_share_one_normalization() {
        assert_eq!(keys::destination(keys::VECTEEZY, "New York"), "vecteezy_only_new_york");
        assert!(keys::is_image_key("static_map_bhutan"));
        assert!(!keys::is_image_key("static_mapper"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn file_storage_persists_between_opens() {
        let path = std::env::temp_dir().join(format!(
            "utrippin-cache-test-{}.json",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        {
            let cache = ImageCache::new(PlatformStorage::open(Some(path.clone())));
            cache.put("unsplash_image_oslo", "https://oslo");
        }
        let reopened = ImageCache::new(PlatformStorage::open(Some(path.clone())));
        assert_eq!(
            reopened.get("unsplash_image_oslo").map(|entry| entry.url),
            Some("https://oslo".to_string())
        );
        let _ = std::fs::remove_file(path);
    }
}
