//! Cache, provider and fallback glued into one resolution step.

use crate::api::{ImageProvider, ProviderKind};
use crate::cache::{keys, ImageCacheStore};
use crate::diagnostics::{log_perf, perf_start};
use crate::error::ResolveError;
use crate::fallback::{FallbackChain, ImageState};
use crate::query::ImageQuery;
use futures_util::future::{abortable, AbortHandle, LocalBoxFuture};
use futures_util::FutureExt;
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Cache,
    Provider,
    Fallback,
}

/// Outcome of one resolution. Always carries a displayable URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub url: String,
    pub source: ResolutionSource,
    pub chain: FallbackChain,
    pub error: Option<ResolveError>,
}

impl Resolution {
    pub fn into_state(self) -> ImageState {
        match self.source {
            ResolutionSource::Fallback => ImageState::fell_back(self.chain, self.error),
            ResolutionSource::Cache | ResolutionSource::Provider => {
                ImageState::succeeded(self.url, self.chain)
            }
        }
    }
}

pub type ResolveTask = LocalBoxFuture<'static, Result<Option<Resolution>, ResolveError>>;

#[derive(Clone)]
pub struct ImageResolver {
    provider: Rc<dyn ImageProvider>,
    cache: Rc<dyn ImageCacheStore>,
    preferred_fallback: Option<String>,
}

impl ImageResolver {
    pub fn new(provider: Rc<dyn ImageProvider>, cache: Rc<dyn ImageCacheStore>) -> Self {
        Self {
            provider,
            cache,
            preferred_fallback: None,
        }
    }

    pub fn with_fallback_image(mut self, url: Option<String>) -> Self {
        self.preferred_fallback = url;
        self
    }

    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    pub fn cache_key(&self, query: &ImageQuery) -> String {
        keys::destination(self.kind().cache_prefix(), &query.destination)
    }

    pub fn fallback_chain(&self, query: &ImageQuery) -> FallbackChain {
        FallbackChain::for_query(query, self.kind())
            .with_preferred(self.preferred_fallback.as_deref())
    }

    /// Resolve `query` to a URL. `None` only for an empty destination, in
    /// which case nothing is fetched.
    pub async fn resolve(&self, query: &ImageQuery) -> Option<Resolution> {
        if query.is_empty() {
            return None;
        }

        let key = self.cache_key(query);
        let chain = self.fallback_chain(query);

        match self.cache.lookup(&key) {
            Ok(Some(entry)) => {
                debug!(key = %key, "image cache hit");
                return Some(Resolution {
                    url: entry.url,
                    source: ResolutionSource::Cache,
                    chain,
                    error: None,
                });
            }
            Ok(None) => {}
            Err(error) => warn!(%error, "ignoring unreadable image cache entry"),
        }

        let started_at = perf_start();
        let outcome = self.provider.resolve(query).await;
        log_perf(
            "image_provider",
            started_at,
            &format!("{} {}", self.kind().key(), query.destination),
        );

        match outcome {
            Ok(url) => {
                self.cache.put(&key, &url);
                Some(Resolution {
                    url,
                    source: ResolutionSource::Provider,
                    chain,
                    error: None,
                })
            }
            Err(error) => {
                if error.is_provider_failure() {
                    info!(
                        provider = self.kind().key(),
                        destination = %query.destination,
                        %error,
                        "image provider failed, using fallback"
                    );
                } else {
                    warn!(provider = self.kind().key(), %error, "unexpected resolve error");
                }
                Some(Resolution {
                    url: chain.first().to_string(),
                    source: ResolutionSource::Fallback,
                    chain,
                    error: Some(error),
                })
            }
        }
    }

    /// Abortable resolution. Dropping or aborting the task before the
    /// provider answers also skips the cache write.
    pub fn start(&self, query: ImageQuery) -> (ResolveTask, AbortHandle) {
        let resolver = self.clone();
        let (task, handle) = abortable(async move { resolver.resolve(&query).await });
        let task = task
            .map(|result| result.map_err(|_| ResolveError::Aborted))
            .boxed_local();
        (task, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, ImageCache, KeyValueStorage, MemoryStorage};
    use crate::query::ImageCategory;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::cell::Cell;

    struct CountingProvider {
        calls: Rc<Cell<usize>>,
        outcome: Result<String, ResolveError>,
    }

    #[async_trait(?Send)]
    impl ImageProvider for CountingProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Vecteezy
        }

        async fn resolve(&self, _query: &ImageQuery) -> Result<String, ResolveError> {
            self.calls.set(self.calls.get() + 1);
            self.outcome.clone()
        }
    }

    struct StalledProvider {
        calls: Rc<Cell<usize>>,
    }

    #[async_trait(?Send)]
    impl ImageProvider for StalledProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Unified
        }

        async fn resolve(&self, _query: &ImageQuery) -> Result<String, ResolveError> {
            self.calls.set(self.calls.get() + 1);
            futures_util::future::pending::<()>().await;
            Ok("https://never.example/a.jpg".to_string())
        }
    }

    fn setup(
        outcome: Result<String, ResolveError>,
    ) -> (ImageResolver, Rc<ImageCache<MemoryStorage>>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let cache = Rc::new(ImageCache::new(MemoryStorage::new()));
        let provider = Rc::new(CountingProvider {
            calls: calls.clone(),
            outcome,
        });
        (ImageResolver::new(provider, cache.clone()), cache, calls)
    }

    #[tokio::test]
    async fn second_resolution_is_served_from_cache() {
        let (resolver, _cache, calls) = setup(Ok("https://static.vecteezy.com/ny.jpg".to_string()));
        let query = ImageQuery::new("New York");

        let first = resolver.resolve(&query).await.expect("resolution");
        let second = resolver.resolve(&query).await.expect("resolution");

        assert_eq!(calls.get(), 1);
        assert_eq!(first.source, ResolutionSource::Provider);
        assert_eq!(second.source, ResolutionSource::Cache);
        assert_eq!(second.url, first.url);
    }

    #[tokio::test]
    async fn cache_key_uses_provider_prefix() {
        let (resolver, cache, _calls) = setup(Ok("https://static.vecteezy.com/ny.jpg".to_string()));
        resolver.resolve(&ImageQuery::new("New  York")).await;
        assert!(cache.get("vecteezy_only_new_york").is_some());
    }

    #[tokio::test]
    async fn expired_entry_triggers_a_fresh_call() {
        let (resolver, cache, calls) = setup(Ok("https://static.vecteezy.com/new.jpg".to_string()));
        let query = ImageQuery::new("Lisbon");
        let key = resolver.cache_key(&query);
        cache.store_entry(&CacheEntry::new(
            key.clone(),
            "https://static.vecteezy.com/old.jpg",
            Utc::now() - Duration::hours(25),
        ));

        let resolution = resolver.resolve(&query).await.expect("resolution");

        assert_eq!(calls.get(), 1);
        assert_eq!(resolution.url, "https://static.vecteezy.com/new.jpg");
        assert_eq!(
            cache.get(&key).map(|entry| entry.url),
            Some("https://static.vecteezy.com/new.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn corrupted_entry_is_replaced() {
        let (resolver, cache, calls) = setup(Ok("https://static.vecteezy.com/fresh.jpg".to_string()));
        let query = ImageQuery::new("Oslo");
        let key = resolver.cache_key(&query);
        cache.storage().write(&key, "{not json");

        let resolution = resolver.resolve(&query).await.expect("resolution");

        assert_eq!(calls.get(), 1);
        assert_eq!(resolution.source, ResolutionSource::Provider);
        assert!(cache.get(&key).is_some());
    }

    #[tokio::test]
    async fn empty_destination_makes_no_call() {
        let (resolver, _cache, calls) = setup(Ok("https://static.vecteezy.com/x.jpg".to_string()));
        assert_eq!(resolver.resolve(&ImageQuery::new("   ")).await, None);
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn santorini_failure_uses_the_santorini_photo() {
        let (resolver, cache, calls) = setup(Err(ResolveError::network("status 500")));
        let query = ImageQuery::new("santorini").with_category(Some(ImageCategory::Travel));
        assert!(query.search_text().contains("santorini"));

        let resolution = resolver.resolve(&query).await.expect("resolution");

        assert_eq!(calls.get(), 1);
        assert_eq!(resolution.source, ResolutionSource::Fallback);
        assert_eq!(
            resolution.url,
            "https://images.unsplash.com/photo-1570077188670-e3a8d69ac5ff?w=800&h=600&fit=crop"
        );
        assert_eq!(resolution.error, Some(ResolveError::NetworkFailure("status 500".to_string())));
        assert!(cache.get(&resolver.cache_key(&query)).is_none());
    }

    #[tokio::test]
    async fn empty_result_falls_back_and_caller_fallback_wins() {
        let (resolver, _cache, _calls) = setup(Err(ResolveError::EmptyResult));
        let resolver =
            resolver.with_fallback_image(Some("https://cdn.example/custom.jpg".to_string()));

        let resolution = resolver
            .resolve(&ImageQuery::new("Reykjavik"))
            .await
            .expect("resolution");

        assert_eq!(resolution.url, "https://cdn.example/custom.jpg");
        assert!(!resolution.url.is_empty());
    }

    #[tokio::test]
    async fn aborted_before_start_never_calls_the_provider() {
        let (resolver, cache, calls) = setup(Ok("https://static.vecteezy.com/x.jpg".to_string()));
        let query = ImageQuery::new("Prague");
        let key = resolver.cache_key(&query);

        let (task, handle) = resolver.start(query);
        handle.abort();

        assert_eq!(task.await, Err(ResolveError::Aborted));
        assert_eq!(calls.get(), 0);
        assert!(cache.get(&key).is_none());
    }

    #[tokio::test]
    async fn abort_mid_flight_skips_the_cache_write() {
        let calls = Rc::new(Cell::new(0));
        let cache = Rc::new(ImageCache::new(MemoryStorage::new()));
        let resolver = ImageResolver::new(
            Rc::new(StalledProvider {
                calls: calls.clone(),
            }),
            cache.clone(),
        );
        let query = ImageQuery::new("Bhutan");
        let key = resolver.cache_key(&query);

        let (mut task, handle) = resolver.start(query);
        assert!(futures_util::poll!(&mut task).is_pending());
        assert_eq!(calls.get(), 1);

        handle.abort();
        assert_eq!(task.await, Err(ResolveError::Aborted));
        assert!(cache.get(&key).is_none());
        assert!(cache.storage().keys().is_empty());
    }

    #[test]
    fn resolution_maps_onto_image_state() {
        let chain = FallbackChain::for_query(&ImageQuery::new("Paris"), ProviderKind::Unified);
        let hit = Resolution {
            url: "https://cached.example/p.jpg".to_string(),
            source: ResolutionSource::Cache,
            chain: chain.clone(),
            error: None,
        };
        assert_eq!(hit.into_state().src(), Some("https://cached.example/p.jpg"));

        let missed = Resolution {
            url: chain.first().to_string(),
            source: ResolutionSource::Fallback,
            chain: chain.clone(),
            error: Some(ResolveError::EmptyResult),
        };
        let state = missed.into_state();
        assert_eq!(state.phase(), crate::fallback::ImagePhase::Fallback);
        assert_eq!(state.src(), Some(chain.first()));
    }
}
