use serde::{Deserialize, Serialize};

use super::CatalogTrack;

/// Upper bound on tracks in a single recommendation result
pub const MAX_TRACKS: usize = 10;

/// Cover art used when the catalog has no image for a track
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/300x300.png";

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Canonical, UI-facing track record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    /// Catalog web link; empty only for unresolved placeholders
    pub external_url: String,
    pub image_url: String,
    /// `m:ss`
    pub duration: String,
    pub preview_url: Option<String>,
}

impl Track {
    /// Stand-in for a suggestion the catalog could not match
    pub fn placeholder(title: &str, artist: &str) -> Self {
        Self {
            id: format!("{}-{}", title, artist).replace(' ', "-"),
            name: title.to_string(),
            artist: artist.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            external_url: String::new(),
            image_url: PLACEHOLDER_IMAGE_URL.to_string(),
            duration: format_duration(0),
            preview_url: None,
        }
    }

    pub fn has_preview(&self) -> bool {
        self.preview_url.is_some()
    }

    /// Whether the track links to a confirmed catalog entry
    pub fn is_linked(&self) -> bool {
        !self.external_url.is_empty()
    }
}

impl From<CatalogTrack> for Track {
    fn from(track: CatalogTrack) -> Self {
        Self {
            id: track.id,
            name: track.name,
            artist: track
                .artist
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: track.album,
            external_url: track.external_url,
            image_url: track
                .image_url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
            duration: format_duration(track.duration_ms),
            preview_url: track.preview_url,
        }
    }
}

/// Formats a millisecond duration as `m:ss`, e.g. 125000 -> "2:05"
pub fn format_duration(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Terminal envelope returned for one recommendation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub tracks: Vec<Track>,
    pub error: Option<String>,
}

impl RecommendationResult {
    pub fn success(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            tracks: Vec::new(),
            error: Some(message.into()),
        }
    }
}
