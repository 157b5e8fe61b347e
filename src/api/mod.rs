//! Remote image providers.
//!
//! Every provider resolves an [`ImageQuery`] to a single image URL. Live
//! providers go through the project's edge functions, which hold the
//! third-party API keys; the static map provider synthesizes a URL locally.

pub mod edge;
pub mod models;
pub mod providers;
pub mod static_map;

use crate::cache::keys;
use crate::error::ResolveError;
use crate::query::ImageQuery;
use async_trait::async_trait;
use std::rc::Rc;

pub use edge::{EdgeConfig, EdgeFunctionClient};
pub use models::*;
pub use providers::EdgeImageProvider;
pub use static_map::{MapSize, StaticMapProvider};

pub const DEFAULT_PROVIDER_KEY: &str = "unified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    Vecteezy,
    Pexels,
    Unsplash,
    Pixabay,
    #[default]
    Unified,
    StaticMap,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 6] = [
        Self::Unified,
        Self::Vecteezy,
        Self::Unsplash,
        Self::Pexels,
        Self::Pixabay,
        Self::StaticMap,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Vecteezy => "vecteezy",
            Self::Pexels => "pexels",
            Self::Unsplash => "unsplash",
            Self::Pixabay => "pixabay",
            Self::Unified => "unified",
            Self::StaticMap => "static-map",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Vecteezy => "Vecteezy",
            Self::Pexels => "Pexels",
            Self::Unsplash => "Unsplash",
            Self::Pixabay => "Pixabay",
            Self::Unified => "Smart search",
            Self::StaticMap => "Static map",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "vecteezy" => Some(Self::Vecteezy),
            "pexels" => Some(Self::Pexels),
            "unsplash" => Some(Self::Unsplash),
            "pixabay" | "destination-images" => Some(Self::Pixabay),
            "unified" | "smart" | "unified-image-search" => Some(Self::Unified),
            "static-map" | "staticmap" | "map" | "osm" => Some(Self::StaticMap),
            _ => None,
        }
    }

    /// Edge function backing this provider, if it makes a network call.
    pub fn function_name(self) -> Option<&'static str> {
        match self {
            Self::Vecteezy => Some("vecteezy-images"),
            Self::Pexels => Some("pexels-images"),
            Self::Unsplash => Some("unsplash-images"),
            Self::Pixabay => Some("destination-images"),
            Self::Unified => Some("unified-image-search"),
            Self::StaticMap => None,
        }
    }

    pub fn cache_prefix(self) -> &'static str {
        match self {
            Self::Vecteezy => keys::VECTEEZY,
            Self::Pexels => keys::PEXELS,
            Self::Unsplash => keys::UNSPLASH,
            Self::Pixabay => keys::PIXABAY,
            Self::Unified => keys::UNIFIED,
            Self::StaticMap => keys::STATIC_MAP,
        }
    }

    /// Results requested from the edge function.
    pub fn page_size(self) -> u32 {
        match self {
            Self::Vecteezy => 10,
            Self::Pexels => 5,
            Self::Unsplash => 20,
            Self::Pixabay | Self::Unified | Self::StaticMap => 1,
        }
    }

    pub fn attribution(self) -> Option<&'static str> {
        match self {
            Self::Vecteezy => Some("Photo via Vecteezy"),
            Self::Pexels => Some("Photo via Pexels"),
            Self::Unsplash => Some("Photo via Unsplash"),
            Self::Pixabay => Some("Photo via Pixabay"),
            Self::StaticMap => Some("© OpenStreetMap contributors"),
            Self::Unified => None,
        }
    }
}

/// A single remote image source.
#[async_trait(?Send)]
pub trait ImageProvider {
    fn kind(&self) -> ProviderKind;

    /// Best candidate URL for the query. Empty results are reported as
    /// [`ResolveError::EmptyResult`].
    async fn resolve(&self, query: &ImageQuery) -> Result<String, ResolveError>;
}

pub fn provider_for(kind: ProviderKind, config: EdgeConfig) -> Rc<dyn ImageProvider> {
    match kind {
        ProviderKind::StaticMap => Rc::new(StaticMapProvider::default()),
        _ => Rc::new(EdgeImageProvider::new(kind, EdgeFunctionClient::new(config))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_keys_round_trip() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(ProviderKind::from_key(" Smart "), Some(ProviderKind::Unified));
        assert_eq!(ProviderKind::from_key("envato"), None);
    }

    #[test]
    fn every_prefix_is_a_known_cache_prefix() {
        for kind in ProviderKind::ALL {
            assert!(keys::PREFIXES.contains(&kind.cache_prefix()));
        }
    }

    #[test]
    fn only_static_map_skips_the_network() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.function_name().is_none(), kind == ProviderKind::StaticMap);
        }
    }

    #[test]
    fn provider_for_builds_requested_kind() {
        let config = EdgeConfig::default();
        for kind in ProviderKind::ALL {
            assert_eq!(provider_for(kind, config.clone()).kind(), kind);
        }
    }
}
