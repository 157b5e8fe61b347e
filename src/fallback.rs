//! Fallback images and the per-component image state machine.
//!
//! A [`FallbackChain`] is an ordered list of stock photos picked for one
//! query, ending in an inline SVG placeholder that cannot fail to load.
//! [`ImageState`] walks that chain as the rendered `<img>` reports errors.

use crate::api::ProviderKind;
use crate::error::ResolveError;
use crate::query::{ImageCategory, ImageQuery};
use base64::{engine::general_purpose, Engine as _};

pub const MAX_LOAD_ATTEMPTS: u8 = 3;

const UNSPLASH_PHOTO_BASE: &str = "https://images.unsplash.com/photo-";

/// Destination name fragments with a known good photo.
const DESTINATION_PHOTOS: &[(&str, &str)] = &[
    ("santorini", "1570077188670-e3a8d69ac5ff"),
    ("paris", "1502602898536-47ad22581b52"),
    ("london", "1513635269975-59663e0ac1ad"),
    ("tokyo", "1493976040374-85c8e12f0c0e"),
    ("bali", "1537953773345-d172ccf13cf1"),
    ("iceland", "1539066436738-336a9abb9b8a"),
    ("rome", "1552832230-c0197dd311b5"),
    ("new york", "1496442226666-8d4d0e62e6e9"),
    ("athens", "1555993539-1732b0258235"),
    ("grand canyon", "1474044159687-1ee9f3a51722"),
    ("yellowstone", "1474044159687-1ee9f3a51722"),
    ("mexico city", "1518638150340-f706e86654de"),
    ("singapore", "1528127269322-539801943592"),
];

const GENERIC_TRAVEL_PHOTO: &str = "1506905925346-21bda4d32df4";

const VECTEEZY_FALLBACKS: &[&str] = &[
    "https://static.vecteezy.com/system/resources/previews/006/735/723/non_2x/travel-concept-illustration-free-vector.jpg?camref=utrippin123",
    "https://static.vecteezy.com/system/resources/previews/004/141/669/non_2x/no-photo-or-blank-image-icon-loading-images-or-missing-image-mark-image-not-available-or-image-coming-soon-sign-simple-nature-silhouette-in-frame-isolated-illustration-vector.jpg?camref=utrippin123",
    "https://static.vecteezy.com/system/resources/previews/005/337/799/non_2x/icon-image-not-found-free-vector.jpg?camref=utrippin123",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationTheme {
    ThemePark,
    Adventure,
    Nature,
    City,
}

impl DestinationTheme {
    /// Checked in this order; the first theme with a matching keyword wins.
    pub const PRECEDENCE: [DestinationTheme; 4] =
        [Self::ThemePark, Self::Adventure, Self::Nature, Self::City];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::ThemePark => &[
                "theme park",
                "amusement",
                "disney",
                "disneyland",
                "disney world",
                "universal studios",
                "legoland",
                "water park",
                "waterpark",
                "six flags",
            ],
            Self::Adventure => &[
                "adventure",
                "safari",
                "trek",
                "trekking",
                "hiking",
                "expedition",
                "outback",
                "rafting",
                "diving",
                "climbing",
                "patagonia",
            ],
            Self::Nature => &[
                "nature",
                "beach",
                "mountain",
                "mountains",
                "alps",
                "island",
                "islands",
                "lake",
                "forest",
                "national park",
                "waterfall",
                "glacier",
                "jungle",
                "canyon",
                "fjord",
                "coast",
            ],
            Self::City => &[
                "city",
                "downtown",
                "skyline",
                "urban",
                "old town",
                "metropolis",
            ],
        }
    }

    fn photos(self) -> &'static [&'static str] {
        match self {
            Self::ThemePark => &["1594736797933-d0bc5e904d35"],
            Self::Adventure => &["1544735716-392fe2489ffa", "1547036967-23d11aacaee0"],
            Self::Nature => &["1469474968028-56623f02e425", "1441974231531-c6227db76b6e"],
            Self::City => &["1516483638261-f4dbaf036963", "1494522358652-f30e61a5ad5f"],
        }
    }
}

/// Lowercase words separated by single spaces, padded on both ends so
/// `" word "` containment is a whole-word match.
fn match_text(value: &str) -> String {
    let words = value
        .to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    format!(" {} ", words.join(" "))
}

fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack.contains(&format!(" {phrase} "))
}

/// Coarse keyword classification of destination plus description.
pub fn classify(destination: &str, description: Option<&str>) -> Option<DestinationTheme> {
    let text = match_text(&format!(
        "{destination} {}",
        description.unwrap_or_default()
    ));
    DestinationTheme::PRECEDENCE.into_iter().find(|theme| {
        theme
            .keywords()
            .iter()
            .any(|keyword| contains_phrase(&text, keyword))
    })
}

pub fn unsplash_photo(id: &str) -> String {
    format!("{UNSPLASH_PHOTO_BASE}{id}?w=800&h=600&fit=crop")
}

pub fn destination_photo(destination: &str) -> Option<String> {
    let text = match_text(destination);
    DESTINATION_PHOTOS
        .iter()
        .find(|(name, _)| contains_phrase(&text, name))
        .map(|(_, id)| unsplash_photo(id))
}

fn placeholder_emoji(category: Option<ImageCategory>) -> &'static str {
    category.map(ImageCategory::emoji).unwrap_or("🌍")
}

/// Inline gradient SVG with the category emoji, as a base64 data URL.
pub fn placeholder_svg(category: Option<ImageCategory>) -> String {
    let svg = format!(
        "<svg width='800' height='600' xmlns='http://www.w3.org/2000/svg'>\
<defs><linearGradient id='grad' x1='0%' y1='0%' x2='100%' y2='100%'>\
<stop offset='0%' style='stop-color:#3B82F6;stop-opacity:1' />\
<stop offset='100%' style='stop-color:#2563EB;stop-opacity:1' />\
</linearGradient></defs>\
<rect width='100%' height='100%' fill='url(#grad)' />\
<text x='50%' y='50%' font-family='Arial' font-size='48' fill='white' text-anchor='middle' dy='.3em'>{}</text>\
</svg>",
        placeholder_emoji(category)
    );
    format!(
        "data:image/svg+xml;base64,{}",
        general_purpose::STANDARD.encode(svg.as_bytes())
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    candidates: Vec<String>,
    terminal: String,
}

impl FallbackChain {
    pub fn for_query(query: &ImageQuery, provider: ProviderKind) -> Self {
        let mut candidates = Vec::new();

        if let Some(photo) = destination_photo(&query.destination) {
            candidates.push(photo);
        }

        if let Some(theme) = classify(&query.destination, query.description.as_deref()) {
            candidates.extend(theme.photos().iter().map(|id| unsplash_photo(id)));
        }

        match provider {
            ProviderKind::Vecteezy => {
                candidates.extend(VECTEEZY_FALLBACKS.iter().map(|url| url.to_string()))
            }
            ProviderKind::StaticMap => {}
            _ => candidates.push(unsplash_photo(GENERIC_TRAVEL_PHOTO)),
        }

        let mut chain = Self {
            candidates: Vec::new(),
            terminal: placeholder_svg(query.category),
        };
        for url in candidates {
            chain.push_unique(url);
        }
        chain
    }

    /// Put a caller-supplied fallback ahead of the built-in ones.
    pub fn with_preferred(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url.map(str::trim).filter(|url| !url.is_empty()) {
            self.candidates.retain(|existing| existing != url);
            self.candidates.insert(0, url.to_string());
        }
        self
    }

    fn push_unique(&mut self, url: String) {
        if !self.candidates.contains(&url) {
            self.candidates.push(url);
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn terminal(&self) -> &str {
        &self.terminal
    }

    pub fn first(&self) -> &str {
        self.candidates
            .first()
            .map(String::as_str)
            .unwrap_or(&self.terminal)
    }

}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePhase {
    /// No destination, nothing to show.
    Idle,
    Loading,
    Success,
    Fallback,
    FallbackExhausted,
}

/// Render state of one image component.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageState {
    phase: ImagePhase,
    src: Option<String>,
    chain: Option<FallbackChain>,
    position: usize,
    attempts: u8,
    last_error: Option<ResolveError>,
}

impl ImageState {
    pub fn idle() -> Self {
        Self {
            phase: ImagePhase::Idle,
            src: None,
            chain: None,
            position: 0,
            attempts: 0,
            last_error: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            phase: ImagePhase::Loading,
            ..Self::idle()
        }
    }

    pub fn succeeded(url: impl Into<String>, chain: FallbackChain) -> Self {
        Self {
            phase: ImagePhase::Success,
            src: Some(url.into()),
            chain: Some(chain),
            ..Self::idle()
        }
    }

    pub fn fell_back(chain: FallbackChain, error: Option<ResolveError>) -> Self {
        let src = chain.first().to_string();
        let phase = if chain.candidates().is_empty() {
            ImagePhase::FallbackExhausted
        } else {
            ImagePhase::Fallback
        };
        Self {
            phase,
            src: Some(src),
            chain: Some(chain),
            last_error: error,
            ..Self::idle()
        }
    }

    pub fn phase(&self) -> ImagePhase {
        self.phase
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    pub fn last_error(&self) -> Option<&ResolveError> {
        self.last_error.as_ref()
    }

    /// Handle an `onerror` from the rendered image. Returns whether `src`
    /// changed.
    pub fn on_image_error(&mut self) -> bool {
        if !matches!(self.phase, ImagePhase::Success | ImagePhase::Fallback) {
            return false;
        }
        let Some(chain) = self.chain.as_ref() else {
            return false;
        };

        let failed = self.src.clone().unwrap_or_default();
        self.attempts += 1;
        self.last_error = Some(ResolveError::ImageLoadFailure {
            url: failed.clone(),
        });

        let next = if self.attempts >= MAX_LOAD_ATTEMPTS {
            None
        } else {
            let start = match self.phase {
                ImagePhase::Success => 0,
                _ => self.position + 1,
            };
            chain
                .candidates()
                .iter()
                .enumerate()
                .skip(start)
                .find(|(_, url)| **url != failed)
                .map(|(index, url)| (index, url.clone()))
        };

        match next {
            Some((index, url)) => {
                self.phase = ImagePhase::Fallback;
                self.position = index;
                self.src = Some(url);
            }
            None => {
                self.phase = ImagePhase::FallbackExhausted;
                self.src = Some(chain.terminal().to_string());
            }
        }

        self.src.as_deref() != Some(failed.as_str())
    }
}
