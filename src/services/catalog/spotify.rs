/// Spotify Web API catalog provider
///
/// API Flow:
/// 1. Token: client-credentials grant via [`CatalogSession`], cached until shortly before expiry
/// 2. Search: /v1/search?type=track → relevance-ordered track objects
use crate::{
    error::{AppError, AppResult},
    models::{ApiSearchResponse, ApiTrack, CatalogTrack},
    services::catalog::{exact_query, CatalogClient, CatalogSession},
};
use reqwest::{Client as HttpClient, StatusCode};
use std::sync::Arc;

/// Largest page size the search endpoint accepts
const MAX_SEARCH_LIMIT: usize = 50;

#[derive(Clone)]
pub struct SpotifyCatalog {
    http_client: HttpClient,
    api_url: String,
    session: Arc<CatalogSession>,
}

impl SpotifyCatalog {
    pub fn new(http_client: HttpClient, api_url: &str, session: Arc<CatalogSession>) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> AppResult<Vec<ApiTrack>> {
        let token = self.session.authenticate().await?;

        let url = format!("{}/v1/search", self.api_url);
        let limit = clamp_limit(limit).to_string();
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::Auth(
                "Spotify rejected the access token".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                query = %query,
                status = %status,
                body = %body,
                "Spotify search request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Spotify API returned status {}: {}",
                status, body
            )));
        }

        let search: ApiSearchResponse = response.json().await?;
        Ok(search.into_tracks())
    }
}

fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_SEARCH_LIMIT)
}

#[async_trait::async_trait]
impl CatalogClient for SpotifyCatalog {
    async fn search_broad(&self, query: &str, limit: usize) -> AppResult<Vec<CatalogTrack>> {
        let tracks: Vec<CatalogTrack> = self
            .search_tracks(query, limit)
            .await?
            .into_iter()
            .take(limit)
            .map(CatalogTrack::from)
            .collect();

        tracing::info!(
            query = %query,
            results = tracks.len(),
            provider = self.name(),
            "Track search completed"
        );

        Ok(tracks)
    }

    async fn search_exact(&self, title: &str, artist: &str) -> AppResult<Option<CatalogTrack>> {
        let query = exact_query(title, artist);
        let track = self
            .search_tracks(&query, 1)
            .await?
            .into_iter()
            .next()
            .map(CatalogTrack::from);

        tracing::debug!(
            title = %title,
            artist = %artist,
            matched = track.is_some(),
            provider = self.name(),
            "Exact track lookup completed"
        );

        Ok(track)
    }

    fn name(&self) -> &'static str {
        "spotify"
    }
}
