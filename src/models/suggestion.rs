use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Short free-text catalog search phrase produced by the phrase synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery(String);

impl TrackQuery {
    /// Wraps a phrase, rejecting blank input
    pub fn new(phrase: impl Into<String>) -> Option<Self> {
        let phrase = phrase.into();
        let trimmed = phrase.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TrackQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single {title, artist} pair suggested by the song-list synthesizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSuggestion {
    #[serde(rename = "name")]
    pub title: String,
    pub artist: String,
}

impl SongSuggestion {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

/// Ordered list of suggestions; order is preserved through resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongSuggestions(pub Vec<SongSuggestion>);
