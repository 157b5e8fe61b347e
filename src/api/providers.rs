use crate::error::ResolveError;
use crate::query::ImageQuery;
use async_trait::async_trait;

use super::edge::EdgeFunctionClient;
use super::models::{is_remote_url, EdgeImage, EdgeImageRequest, EdgeImageResponse};
use super::{ImageProvider, ProviderKind};

const VECTEEZY_CAMREF: &str = "utrippin123";
const VECTEEZY_MIN_WIDTH: u32 = 1024;
const UNSPLASH_MIN_WIDTH: u32 = 800;
const UNSPLASH_MIN_HEIGHT: u32 = 600;

/// Provider that relays through one of the image edge functions.
pub struct EdgeImageProvider {
    kind: ProviderKind,
    client: EdgeFunctionClient,
}

impl EdgeImageProvider {
    pub fn new(kind: ProviderKind, client: EdgeFunctionClient) -> Self {
        Self { kind, client }
    }
}

#[async_trait(?Send)]
impl ImageProvider for EdgeImageProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn resolve(&self, query: &ImageQuery) -> Result<String, ResolveError> {
        let function = self.kind.function_name().ok_or(ResolveError::Misconfigured)?;
        let request = EdgeImageRequest::for_provider(self.kind, query);
        let response = self.client.invoke(function, &request).await?;
        select_best(self.kind, &response, query).ok_or(ResolveError::EmptyResult)
    }
}

/// Append the Vecteezy affiliate reference unless it is already present.
pub fn add_camref_tracking(url: &str) -> String {
    if !url.contains("vecteezy.com") || url.contains("camref=") {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}camref={VECTEEZY_CAMREF}")
}

fn first_url(images: &[EdgeImage]) -> Option<String> {
    images
        .iter()
        .find_map(EdgeImage::image_url)
        .map(str::to_string)
}

/// Provider-specific choice of the one image to display.
pub fn select_best(
    kind: ProviderKind,
    response: &EdgeImageResponse,
    query: &ImageQuery,
) -> Option<String> {
    match kind {
        ProviderKind::Vecteezy => {
            let best = response
                .best_image
                .as_ref()
                .and_then(|best| best.url.as_deref())
                .filter(|url| is_remote_url(url))
                .map(str::to_string)
                .or_else(|| {
                    response
                        .images
                        .iter()
                        .filter(|image| {
                            image
                                .pixel_width()
                                .is_some_and(|width| width >= VECTEEZY_MIN_WIDTH)
                        })
                        .find_map(EdgeImage::image_url)
                        .map(str::to_string)
                })
                .or_else(|| first_url(&response.images));
            best.map(|url| add_camref_tracking(&url))
        }
        ProviderKind::Pexels => {
            let destination = query.destination.to_lowercase();
            response
                .images
                .iter()
                .filter(|image| image.searchable_text().contains(&destination))
                .find_map(EdgeImage::image_url)
                .map(str::to_string)
                .or_else(|| first_url(&response.images))
        }
        ProviderKind::Unsplash => response
            .images
            .iter()
            .filter(|image| {
                image.pixel_width().unwrap_or_default() >= UNSPLASH_MIN_WIDTH
                    && image.pixel_height().unwrap_or_default() >= UNSPLASH_MIN_HEIGHT
            })
            .find_map(EdgeImage::image_url)
            .map(str::to_string)
            .or_else(|| first_url(&response.images)),
        ProviderKind::Pixabay => {
            if response
                .provider
                .as_deref()
                .is_some_and(|provider| provider.eq_ignore_ascii_case("fallback"))
            {
                return None;
            }
            response
                .image_url
                .as_deref()
                .map(str::trim)
                .filter(|url| is_remote_url(url))
                .map(str::to_string)
                .or_else(|| first_url(&response.images))
        }
        ProviderKind::Unified => {
            if response.source.as_deref() == Some("placeholder") {
                return None;
            }
            first_url(&response.images)
        }
        ProviderKind::StaticMap => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::EdgeConfig;

    fn image(url: &str, width: u32, height: u32) -> EdgeImage {
        EdgeImage {
            url: Some(url.to_string()),
            width: Some(width),
            height: Some(height),
            ..EdgeImage::default()
        }
    }

    fn response(images: Vec<EdgeImage>) -> EdgeImageResponse {
        EdgeImageResponse {
            images,
            ..EdgeImageResponse::default()
        }
    }

    #[test]
    fn camref_added_once() {
        assert_eq!(
            add_camref_tracking("https://static.vecteezy.com/a.jpg"),
            "https://static.vecteezy.com/a.jpg?camref=utrippin123"
        );
        assert_eq!(
            add_camref_tracking("https://static.vecteezy.com/a.jpg?w=1"),
            "https://static.vecteezy.com/a.jpg?w=1&camref=utrippin123"
        );
        let tracked = "https://static.vecteezy.com/a.jpg?camref=utrippin123";
        assert_eq!(add_camref_tracking(tracked), tracked);
        assert_eq!(add_camref_tracking("https://images.pexels.com/a.jpg"), "https://images.pexels.com/a.jpg");
    }

    #[test]
    fn vecteezy_prefers_wide_images() {
        let query = ImageQuery::new("Lisbon");
        let payload = response(vec![
            image("https://static.vecteezy.com/small.jpg", 640, 480),
            image("https://static.vecteezy.com/wide.jpg", 1600, 900),
        ]);
        assert_eq!(
            select_best(ProviderKind::Vecteezy, &payload, &query).as_deref(),
            Some("https://static.vecteezy.com/wide.jpg?camref=utrippin123")
        );
    }

    #[test]
    fn vecteezy_falls_back_to_first_image() {
        let query = ImageQuery::new("Lisbon");
        let payload = response(vec![image("https://static.vecteezy.com/small.jpg", 640, 480)]);
        assert_eq!(
            select_best(ProviderKind::Vecteezy, &payload, &query).as_deref(),
            Some("https://static.vecteezy.com/small.jpg?camref=utrippin123")
        );
    }

    #[test]
    fn pexels_prefers_alt_mentioning_destination() {
        let query = ImageQuery::new("Porto");
        let mut named = image("https://images.pexels.com/2.jpg", 1200, 800);
        named.alt = Some("Ribeira district in Porto at night".to_string());
        let payload = response(vec![image("https://images.pexels.com/1.jpg", 1200, 800), named]);

        assert_eq!(
            select_best(ProviderKind::Pexels, &payload, &query).as_deref(),
            Some("https://images.pexels.com/2.jpg")
        );
    }

    #[test]
    fn unsplash_applies_quality_filter() {
        let query = ImageQuery::new("Oslo");
        let payload = response(vec![
            image("https://images.unsplash.com/tiny", 400, 300),
            image("https://images.unsplash.com/large", 1920, 1080),
        ]);
        assert_eq!(
            select_best(ProviderKind::Unsplash, &payload, &query).as_deref(),
            Some("https://images.unsplash.com/large")
        );
    }

    #[test]
    fn pixabay_fallback_gradient_counts_as_empty() {
        let query = ImageQuery::new("Nowhere");
        let payload = EdgeImageResponse {
            image_url: Some("data:image/svg+xml,%3Csvg".to_string()),
            provider: Some("Fallback".to_string()),
            ..EdgeImageResponse::default()
        };
        assert_eq!(select_best(ProviderKind::Pixabay, &payload, &query), None);

        let live = EdgeImageResponse {
            image_url: Some("https://pixabay.com/get/abc.jpg".to_string()),
            provider: Some("Pixabay".to_string()),
            ..EdgeImageResponse::default()
        };
        assert_eq!(
            select_best(ProviderKind::Pixabay, &live, &query).as_deref(),
            Some("https://pixabay.com/get/abc.jpg")
        );
    }

    #[test]
    fn unified_placeholders_count_as_empty() {
        let query = ImageQuery::new("Bhutan");
        let mut payload = response(vec![image("https://images.unsplash.com/photo-1649972904349", 800, 600)]);
        payload.source = Some("placeholder".to_string());
        assert_eq!(select_best(ProviderKind::Unified, &payload, &query), None);

        payload.source = Some("mixed".to_string());
        assert!(select_best(ProviderKind::Unified, &payload, &query).is_some());
    }

    #[test]
    fn empty_result_has_no_candidate() {
        let query = ImageQuery::new("Atlantis");
        for kind in ProviderKind::ALL {
            assert_eq!(select_best(kind, &EdgeImageResponse::default(), &query), None);
        }
    }

    #[tokio::test]
    async fn unconfigured_provider_reports_misconfiguration() {
        let provider = EdgeImageProvider::new(
            ProviderKind::Vecteezy,
            EdgeFunctionClient::new(EdgeConfig::default()),
        );
        assert_eq!(
            provider.resolve(&ImageQuery::new("Santorini")).await,
            Err(ResolveError::Misconfigured)
        );
    }
}
