use serde::Deserialize;

/// Raw track record returned by the catalog client
///
/// Immutable once returned; the resolution pipeline derives a [`Track`](super::Track) from it.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    /// Primary (first listed) artist, if the catalog reports any
    pub artist: Option<String>,
    pub album: String,
    pub external_url: String,
    /// Largest available cover image
    pub image_url: Option<String>,
    pub duration_ms: u64,
    /// 30-second preview clip, not available for every track
    pub preview_url: Option<String>,
}

// ============================================================================
// Spotify Web API Types
// ============================================================================

/// API response from GET /v1/search?type=track
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSearchResponse {
    #[serde(default)]
    pub tracks: Option<ApiTrackPage>,
}

impl ApiSearchResponse {
    /// Consumes the response, yielding the track items in provider relevance order
    ///
    /// `null` entries in the page are skipped.
    pub fn into_tracks(self) -> Vec<ApiTrack> {
        self.tracks
            .map(|page| page.items.into_iter().flatten().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTrackPage {
    #[serde(default)]
    pub items: Vec<Option<ApiTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
    pub album: ApiAlbum,
    #[serde(default)]
    pub external_urls: ApiExternalUrls,
    pub duration_ms: u64,
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<ApiImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

impl ApiAlbum {
    /// Widest cover image; the first listed image wins when widths are missing or tied
    fn largest_image(&self) -> Option<&ApiImage> {
        self.images
            .iter()
            .enumerate()
            .max_by_key(|(index, image)| (image.width.unwrap_or(0), std::cmp::Reverse(*index)))
            .map(|(_, image)| image)
    }
}

impl From<ApiTrack> for CatalogTrack {
    fn from(track: ApiTrack) -> Self {
        let image_url = track.album.largest_image().map(|image| image.url.clone());

        CatalogTrack {
            id: track.id,
            name: track.name,
            artist: track.artists.into_iter().next().map(|artist| artist.name),
            album: track.album.name,
            external_url: track.external_urls.spotify.unwrap_or_default(),
            image_url,
            duration_ms: track.duration_ms,
            preview_url: track.preview_url,
        }
    }
}
