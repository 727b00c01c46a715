pub mod catalog;
pub mod suggestion;
pub mod track;

pub use catalog::{ApiAlbum, ApiArtist, ApiImage, ApiSearchResponse, ApiTrack, CatalogTrack};
pub use suggestion::{SongSuggestion, SongSuggestions, TrackQuery};
pub use track::{format_duration, RecommendationResult, Track, MAX_TRACKS, PLACEHOLDER_IMAGE_URL};
