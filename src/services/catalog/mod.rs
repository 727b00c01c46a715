/// Music catalog abstraction
///
/// The resolution pipeline only ever talks to the catalog through [`CatalogClient`], so the
/// Spotify implementation can be swapped for a mock in tests.
use crate::{error::AppResult, models::CatalogTrack};

pub mod session;
pub mod spotify;

pub use session::{AccessToken, CatalogSession, ClientCredentialsGrant, CredentialGrant};
pub use spotify::SpotifyCatalog;

/// Trait for catalog search providers
///
/// Both operations authenticate first. Finding nothing is a normal outcome and never an error;
/// only auth and transport failures are reported as `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fuzzy multi-result search
    ///
    /// Returns up to `limit` tracks ordered by provider relevance.
    async fn search_broad(&self, query: &str, limit: usize) -> AppResult<Vec<CatalogTrack>>;

    /// Field-scoped `track:<title> artist:<artist>` lookup returning the top hit, if any
    async fn search_exact(&self, title: &str, artist: &str) -> AppResult<Option<CatalogTrack>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Builds the field-scoped query used for exact lookups
pub fn exact_query(title: &str, artist: &str) -> String {
    format!("track:{} artist:{}", title, artist)
}
