use thiserror::Error;

/// Everything that can go wrong while resolving a destination image.
///
/// None of these ever reach the user directly: the resolver folds each one
/// into the fallback chain and only the terminal placeholder is visible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("provider returned no usable images")]
    EmptyResult,

    #[error("cached entry for {key} could not be parsed")]
    CacheCorruption { key: String },

    #[error("image failed to load: {url}")]
    ImageLoadFailure { url: String },

    #[error("edge functions are not configured")]
    Misconfigured,

    #[error("request aborted")]
    Aborted,
}

impl ResolveError {
    pub fn network(error: impl std::fmt::Display) -> Self {
        Self::NetworkFailure(error.to_string())
    }

    /// Whether this failure came from the provider call itself, as opposed to
    /// the cache or the rendered image.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::NetworkFailure(_) | Self::EmptyResult | Self::Misconfigured
        )
    }
}
