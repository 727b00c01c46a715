/// Query synthesis
///
/// Turns a free-text user signal into something the catalog can search for. Two strategies
/// exist and one is wired in at build time:
/// - [`PhraseSynthesizer`]: one short search phrase
/// - [`SongListSynthesizer`]: exactly ten {title, artist} suggestions
///
/// Each strategy calls the model once per request and never retries.
use crate::error::AppResult;

pub mod model;
pub mod phrase;
pub mod song_list;

pub use model::{ChatCompletionsModel, GenerativeModel};
pub use phrase::PhraseSynthesizer;
pub use song_list::SongListSynthesizer;

#[async_trait::async_trait]
pub trait Synthesizer: Send + Sync {
    /// What the strategy hands to the resolution pipeline
    type Output: Send;

    async fn produce(&self, raw_input: &str) -> AppResult<Self::Output>;

    /// Strategy name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Strategy selected for this build
#[cfg(not(feature = "song-list"))]
pub type ActiveSynthesizer = PhraseSynthesizer;

/// Strategy selected for this build
#[cfg(feature = "song-list")]
pub type ActiveSynthesizer = SongListSynthesizer;
