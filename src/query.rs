//! Search query construction for destination images.

use crate::utils::compact_whitespace;
use serde::{Deserialize, Serialize};

const STOP_WORDS: [&str; 8] = ["the", "and", "with", "from", "this", "that", "will", "have"];
const MAX_DESCRIPTION_WORDS: usize = 2;
const MAX_TAGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageCategory {
    Places,
    Travel,
    Event,
    People,
}

impl ImageCategory {
    pub const ALL: [ImageCategory; 4] = [Self::Places, Self::Travel, Self::Event, Self::People];

    pub fn key(self) -> &'static str {
        match self {
            Self::Places => "places",
            Self::Travel => "travel",
            Self::Event => "event",
            Self::People => "people",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "places" | "place" => Some(Self::Places),
            "travel" => Some(Self::Travel),
            "event" | "events" => Some(Self::Event),
            "people" | "person" => Some(Self::People),
            _ => None,
        }
    }

    /// Extra search keywords contributed by the category.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::Event => &["festival", "celebration", "gathering"],
            Self::Travel => &["travel", "tourism", "vacation"],
            Self::People => &["traveler", "tourist", "person"],
            Self::Places => &["places"],
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Places => "🏛️",
            Self::Travel => "✈️",
            Self::Event => "🎉",
            Self::People => "👥",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageQuery {
    pub destination: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub category: Option<ImageCategory>,
}

impl ImageQuery {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: compact_whitespace(&destination.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = compact_whitespace(&description.into());
        self.description = Some(description).filter(|text| !text.is_empty());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags
            .into_iter()
            .map(|tag| compact_whitespace(&tag.into()))
            .filter(|tag| !tag.is_empty())
            .collect();
        self
    }

    pub fn with_category(mut self, category: Option<ImageCategory>) -> Self {
        self.category = category;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.destination.trim().is_empty()
    }

    /// Free-text search string sent to the provider.
    pub fn search_text(&self) -> String {
        build_search_query(self)
    }

    pub fn alt_text(&self) -> String {
        format!(
            "{} of {}",
            self.description.as_deref().unwrap_or("Beautiful view"),
            self.destination
        )
    }

    pub fn title_text(&self) -> String {
        format!(
            "{} - {}",
            self.destination,
            self.description.as_deref().unwrap_or("Travel photography")
        )
    }
}

fn is_significant(word: &str) -> bool {
    word.chars().count() > 3 && !STOP_WORDS.contains(&word.to_lowercase().as_str())
}

/// Significant words of a description, in order of appearance.
pub fn significant_words(description: &str) -> Vec<String> {
    description
        .split_whitespace()
        .map(|word| word.trim_matches(|ch: char| !ch.is_alphanumeric()))
        .filter(|word| is_significant(word))
        .map(str::to_string)
        .collect()
}

pub fn build_search_query(query: &ImageQuery) -> String {
    let destination = query.destination.trim();
    if destination.is_empty() {
        return String::new();
    }

    let mut terms: Vec<String> = vec![destination.to_string()];

    if let Some(category) = query.category {
        terms.extend(category.synonyms().iter().map(|word| word.to_string()));
    }

    if let Some(description) = query.description.as_deref() {
        terms.extend(
            significant_words(description)
                .into_iter()
                .take(MAX_DESCRIPTION_WORDS),
        );
    }

    terms.extend(query.tags.iter().take(MAX_TAGS).cloned());

    terms
        .into_iter()
        .filter(|term| !term.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
