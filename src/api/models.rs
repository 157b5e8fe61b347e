use crate::query::ImageQuery;
use serde::{Deserialize, Serialize};

use super::ProviderKind;

/// Body posted to every image edge function. Functions ignore the fields
/// they do not use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeImageRequest {
    pub query: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: u32,
    pub limit: u32,
}

impl EdgeImageRequest {
    pub fn for_provider(kind: ProviderKind, query: &ImageQuery) -> Self {
        Self {
            query: query.search_text(),
            destination: query.destination.clone(),
            description: query.description.clone(),
            tags: query.tags.clone(),
            category: query.category.map(|category| category.key().to_string()),
            per_page: kind.page_size(),
            limit: kind.page_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
pub struct Dimensions {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Tags arrive either as one space/comma separated string or as a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagField {
    Text(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

impl TagField {
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::List(list) => list.join(" "),
            Self::Other(_) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct EdgeImage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub photographer: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Option<TagField>,
    #[serde(default)]
    pub source: Option<String>,
}

impl EdgeImage {
    /// Displayable URL. Vecteezy resources carry the image in `preview_url`
    /// and a page link in `url`.
    pub fn image_url(&self) -> Option<&str> {
        self.preview_url
            .as_deref()
            .or(self.url.as_deref())
            .map(str::trim)
            .filter(|url| is_remote_url(url))
    }

    pub fn pixel_width(&self) -> Option<u32> {
        self.width
            .or_else(|| self.dimensions.and_then(|dimensions| dimensions.width))
    }

    pub fn pixel_height(&self) -> Option<u32> {
        self.height
            .or_else(|| self.dimensions.and_then(|dimensions| dimensions.height))
    }

    /// Alt text, title and tags lowercased for keyword matching.
    pub fn searchable_text(&self) -> String {
        let tags = self.tags.as_ref().map(TagField::to_text).unwrap_or_default();
        format!(
            "{} {} {}",
            self.alt.as_deref().unwrap_or_default(),
            self.title.as_deref().unwrap_or_default(),
            tags
        )
        .to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct BestImage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct EdgeImageResponse {
    #[serde(default)]
    pub images: Vec<EdgeImage>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default, rename = "bestImage")]
    pub best_image: Option<BestImage>,
    #[serde(default, rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl EdgeImageResponse {
    pub fn has_candidates(&self) -> bool {
        !self.images.is_empty()
            || self.image_url.is_some()
            || self
                .best_image
                .as_ref()
                .is_some_and(|best| best.url.is_some())
    }
}

pub fn is_remote_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("https://") || url.starts_with("http://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ImageCategory;

    #[test]
    fn request_serializes_edge_function_shape() {
        let query = ImageQuery::new("Santorini")
            .with_tags(["sunset"])
            .with_category(Some(ImageCategory::Travel));
        let body = serde_json::to_value(EdgeImageRequest::for_provider(ProviderKind::Pexels, &query))
            .expect("serialize");

        assert_eq!(body["query"], "Santorini travel tourism vacation sunset");
        assert_eq!(body["destination"], "Santorini");
        assert_eq!(body["category"], "travel");
        assert_eq!(body["perPage"], 5);
        assert!(body.get("description").is_none());
    }

    #[test]
    fn parses_vecteezy_resources() {
        let raw = r#"{
            "images": [
                {"id": 42, "url": "https://www.vecteezy.com/photo/42", "preview_url": "https://static.vecteezy.com/42.jpg?camref=utrippin123",
                 "dimensions": {"width": 2048, "height": 1365}, "title": "Oia at dusk", "tags": [{"name": "greece"}]}
            ],
            "bestImage": {"url": "https://static.vecteezy.com/42.jpg?camref=utrippin123", "width": 2048}
        }"#;
        let response: EdgeImageResponse = serde_json::from_str(raw).expect("parse");
        let image = &response.images[0];

        assert_eq!(image.image_url(), Some("https://static.vecteezy.com/42.jpg?camref=utrippin123"));
        assert_eq!(image.pixel_width(), Some(2048));
        assert!(response.has_candidates());
    }

    #[test]
    fn parses_error_body() {
        let response: EdgeImageResponse =
            serde_json::from_str(r#"{"error": "API key not configured"}"#).expect("parse");
        assert_eq!(response.error.as_deref(), Some("API key not configured"));
        assert!(!response.has_candidates());
    }

    #[test]
    fn string_tags_are_searchable() {
        let image: EdgeImage = serde_json::from_str(
            r#"{"url": "https://images.pexels.com/1.jpg", "tags": "Lisbon Tram", "alt": "Yellow tram"}"#,
        )
        .expect("parse");
        assert!(image.searchable_text().contains("lisbon tram"));
        assert!(image.searchable_text().contains("yellow tram"));
    }

    #[test]
    fn data_urls_are_not_remote() {
        let image = EdgeImage {
            url: Some("data:image/svg+xml,%3Csvg".to_string()),
            ..EdgeImage::default()
        };
        assert_eq!(image.image_url(), None);
    }
}
