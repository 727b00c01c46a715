/// Recommendation resolution pipeline
///
/// Drives one synthesizer call and the catalog lookups it implies, then normalizes the raw
/// catalog records into the canonical [`Track`] list:
///
/// - phrase → one broad search, preview filter, unfiltered fallback, cap at [`MAX_TRACKS`]
/// - song list → ten concurrent exact lookups, placeholders for misses, keep linked tracks
///
/// The pipeline never retries; collaborator errors propagate unchanged.
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogTrack, SongSuggestion, SongSuggestions, Track, TrackQuery, MAX_TRACKS},
    services::{catalog::CatalogClient, synthesis::Synthesizer},
};

/// How many raw tracks a phrase search asks the catalog for
pub const BROAD_SEARCH_LIMIT: usize = 20;

/// Synthesizer output that knows how to turn itself into tracks
#[async_trait::async_trait]
pub trait Resolvable: Send + Sized {
    async fn resolve(self, catalog: Arc<dyn CatalogClient>) -> AppResult<Vec<Track>>;
}

#[async_trait::async_trait]
impl Resolvable for TrackQuery {
    async fn resolve(self, catalog: Arc<dyn CatalogClient>) -> AppResult<Vec<Track>> {
        resolve_phrase(catalog.as_ref(), &self).await
    }
}

#[async_trait::async_trait]
impl Resolvable for SongSuggestions {
    async fn resolve(self, catalog: Arc<dyn CatalogClient>) -> AppResult<Vec<Track>> {
        resolve_suggestions(catalog, self).await
    }
}

/// Anything that can turn raw user text into a track list
#[async_trait::async_trait]
pub trait RecommendationSource: Send + Sync {
    async fn recommend(&self, raw_input: &str) -> AppResult<Vec<Track>>;
}

pub struct RecommendationPipeline<S> {
    synthesizer: S,
    catalog: Arc<dyn CatalogClient>,
}

impl<S: Synthesizer> RecommendationPipeline<S> {
    pub fn new(synthesizer: S, catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            synthesizer,
            catalog,
        }
    }
}

#[async_trait::async_trait]
impl<S> RecommendationSource for RecommendationPipeline<S>
where
    S: Synthesizer,
    S::Output: Resolvable,
{
    async fn recommend(&self, raw_input: &str) -> AppResult<Vec<Track>> {
        let plan = self.synthesizer.produce(raw_input).await?;
        let tracks = plan.resolve(self.catalog.clone()).await?;

        tracing::info!(
            strategy = self.synthesizer.name(),
            tracks = tracks.len(),
            "Recommendations resolved"
        );

        Ok(tracks)
    }
}

/// Resolves a search phrase into at most [`MAX_TRACKS`] tracks
///
/// Tracks with a preview are preferred. When none of them has one, the first raw results are
/// returned unfiltered instead of nothing.
pub async fn resolve_phrase(catalog: &dyn CatalogClient, query: &TrackQuery) -> AppResult<Vec<Track>> {
    let raw = catalog.search_broad(query.as_str(), BROAD_SEARCH_LIMIT).await?;
    let raw = dedup_by_id(raw, |track: &CatalogTrack| track.id.as_str());

    if raw.is_empty() {
        tracing::info!(query = %query, "No catalog matches for phrase");
        return Ok(Vec::new());
    }

    let tracks: Vec<Track> = raw.into_iter().map(Track::from).collect();
    let playable: Vec<Track> = tracks
        .iter()
        .filter(|track| track.has_preview())
        .take(MAX_TRACKS)
        .cloned()
        .collect();

    if playable.is_empty() {
        tracing::warn!(
            query = %query,
            raw_count = tracks.len(),
            "No tracks with previews, falling back to unfiltered results"
        );
        return Ok(tracks.into_iter().take(MAX_TRACKS).collect());
    }

    Ok(playable)
}

/// Resolves song suggestions with one concurrent exact lookup each
///
/// All lookups are joined before anything is returned. A miss degrades to a placeholder, and
/// placeholders are then dropped along with every other track that has no catalog link, so the
/// result keeps suggestion order with the misses removed.
pub async fn resolve_suggestions(
    catalog: Arc<dyn CatalogClient>,
    suggestions: SongSuggestions,
) -> AppResult<Vec<Track>> {
    let tasks: Vec<_> = suggestions
        .0
        .into_iter()
        .map(|suggestion| {
            let catalog = catalog.clone();
            tokio::spawn(async move { resolve_suggestion(catalog.as_ref(), suggestion).await })
        })
        .collect();

    let mut slots = Vec::with_capacity(tasks.len());
    let mut first_error = None;

    for task in tasks {
        match task.await {
            Ok(Ok(track)) => slots.push(track),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Exact track lookup failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Task join error");
                if first_error.is_none() {
                    first_error = Some(AppError::Internal(e.to_string()));
                }
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    let suggested = slots.len();
    let linked = slots.into_iter().filter(Track::is_linked);
    let mut tracks = dedup_by_id(linked, |track: &Track| track.id.as_str());
    tracks.truncate(MAX_TRACKS);

    tracing::debug!(
        suggested,
        matched = tracks.len(),
        "Discarded unmatched suggestions"
    );

    Ok(tracks)
}

async fn resolve_suggestion(catalog: &dyn CatalogClient, suggestion: SongSuggestion) -> AppResult<Track> {
    let track = match catalog
        .search_exact(&suggestion.title, &suggestion.artist)
        .await?
    {
        Some(found) => Track::from(found),
        None => Track::placeholder(&suggestion.title, &suggestion.artist),
    };

    Ok(track)
}

/// Keeps the first occurrence of every id, preserving order
fn dedup_by_id<T, I, F>(items: I, id: F) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(id(item).to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::MockCatalogClient;
    use crate::services::synthesis::model::MockGenerativeModel;
    use crate::services::synthesis::{PhraseSynthesizer, SongListSynthesizer};
    use serde_json::json;

    fn raw_track(index: usize, with_preview: bool) -> CatalogTrack {
        CatalogTrack {
            id: format!("track-{}", index),
            name: format!("Song {}", index),
            artist: Some(format!("Artist {}", index)),
            album: format!("Album {}", index),
            external_url: format!("https://open.spotify.com/track/track-{}", index),
            image_url: Some(format!("https://i.scdn.co/image/{}", index)),
            duration_ms: 180_000 + index as u64 * 1_000,
            preview_url: with_preview.then(|| format!("https://p.scdn.co/mp3-preview/{}", index)),
        }
    }

    fn catalog_with_broad_results(results: Vec<CatalogTrack>) -> MockCatalogClient {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_search_broad()
            .withf(|query, limit| query == "lo-fi beats" && *limit == BROAD_SEARCH_LIMIT)
            .times(1)
            .returning(move |_, _| Ok(results.clone()));
        catalog
    }

    fn query() -> TrackQuery {
        TrackQuery::new("lo-fi beats").unwrap()
    }

    fn suggestions() -> SongSuggestions {
        SongSuggestions(
            (1..=10)
                .map(|i| SongSuggestion::new(format!("Song {}", i), format!("Artist {}", i)))
                .collect(),
        )
    }

    fn ids(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|track| track.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_phrase_keeps_only_tracks_with_previews() {
        let raw: Vec<CatalogTrack> = (0..20)
            .map(|i| raw_track(i, matches!(i, 2 | 7 | 15)))
            .collect();
        let catalog = catalog_with_broad_results(raw);

        let tracks = resolve_phrase(&catalog, &query()).await.unwrap();

        assert_eq!(ids(&tracks), vec!["track-2", "track-7", "track-15"]);
        assert!(tracks.iter().all(Track::has_preview));
    }

    #[tokio::test]
    async fn test_phrase_falls_back_when_no_previews() {
        let raw: Vec<CatalogTrack> = (0..5).map(|i| raw_track(i, false)).collect();
        let catalog = catalog_with_broad_results(raw);

        let tracks = resolve_phrase(&catalog, &query()).await.unwrap();

        assert_eq!(
            ids(&tracks),
            vec!["track-0", "track-1", "track-2", "track-3", "track-4"]
        );
        assert!(tracks.iter().all(|track| track.preview_url.is_none()));
    }

    #[tokio::test]
    async fn test_phrase_fallback_capped_at_ten() {
        let raw: Vec<CatalogTrack> = (0..20).map(|i| raw_track(i, false)).collect();
        let catalog = catalog_with_broad_results(raw);

        let tracks = resolve_phrase(&catalog, &query()).await.unwrap();

        assert_eq!(tracks.len(), MAX_TRACKS);
        assert_eq!(tracks[0].id, "track-0");
        assert_eq!(tracks[9].id, "track-9");
    }

    #[tokio::test]
    async fn test_phrase_truncates_to_ten_in_relevance_order() {
        let raw: Vec<CatalogTrack> = (0..20).map(|i| raw_track(i, i % 4 != 0)).collect();
        let catalog = catalog_with_broad_results(raw);

        let tracks = resolve_phrase(&catalog, &query()).await.unwrap();

        assert_eq!(
            ids(&tracks),
            vec![
                "track-1", "track-2", "track-3", "track-5", "track-6", "track-7", "track-9",
                "track-10", "track-11", "track-13"
            ]
        );
    }

    #[tokio::test]
    async fn test_phrase_no_matches_is_empty() {
        let catalog = catalog_with_broad_results(Vec::new());
        let tracks = resolve_phrase(&catalog, &query()).await.unwrap();
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn test_phrase_drops_duplicate_ids() {
        let raw = vec![
            raw_track(1, true),
            raw_track(2, true),
            raw_track(1, true),
            raw_track(3, false),
        ];
        let catalog = catalog_with_broad_results(raw);

        let tracks = resolve_phrase(&catalog, &query()).await.unwrap();

        assert_eq!(ids(&tracks), vec!["track-1", "track-2"]);
    }

    #[tokio::test]
    async fn test_phrase_search_error_propagates() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_search_broad()
            .times(1)
            .returning(|_, _| Err(AppError::ExternalApi("status 503".to_string())));

        let result = resolve_phrase(&catalog, &query()).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_suggestions_keep_matches_in_order() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_search_exact()
            .times(10)
            .returning(|title, _| match title {
                "Song 1" => Ok(Some(raw_track(1, true))),
                "Song 3" => Ok(Some(raw_track(3, false))),
                "Song 5" => Ok(Some(raw_track(5, true))),
                _ => Ok(None),
            });

        let tracks = resolve_suggestions(Arc::new(catalog), suggestions())
            .await
            .unwrap();

        assert_eq!(ids(&tracks), vec!["track-1", "track-3", "track-5"]);
        assert!(tracks.iter().all(Track::is_linked));
    }

    #[tokio::test]
    async fn test_suggestions_all_missed_is_empty() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_search_exact()
            .times(10)
            .returning(|_, _| Ok(None));

        let tracks = resolve_suggestions(Arc::new(catalog), suggestions())
            .await
            .unwrap();

        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn test_suggestions_lookup_error_propagates() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_search_exact()
            .times(10)
            .returning(|title, _| {
                if title == "Song 4" {
                    Err(AppError::Auth("Spotify rejected the access token".to_string()))
                } else {
                    Ok(Some(raw_track(0, true)))
                }
            });

        let result = resolve_suggestions(Arc::new(catalog), suggestions()).await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_suggestions_duplicate_matches_collapsed() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_search_exact()
            .times(10)
            .returning(|_, _| Ok(Some(raw_track(7, true))));

        let tracks = resolve_suggestions(Arc::new(catalog), suggestions())
            .await
            .unwrap();

        assert_eq!(ids(&tracks), vec!["track-7"]);
    }

    #[tokio::test]
    async fn test_phrase_pipeline_end_to_end() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_json()
            .times(1)
            .returning(|_| Ok(json!({ "query": "lo-fi beats" })));
        let catalog = catalog_with_broad_results((0..4).map(|i| raw_track(i, true)).collect());

        let pipeline =
            RecommendationPipeline::new(PhraseSynthesizer::new(Arc::new(model)), Arc::new(catalog));
        let tracks = pipeline.recommend("rainy day").await.unwrap();

        assert_eq!(tracks.len(), 4);
        assert_eq!(tracks[0].duration, "3:00");
    }

    #[tokio::test]
    async fn test_song_list_pipeline_end_to_end() {
        let mut model = MockGenerativeModel::new();
        model.expect_generate_json().times(1).returning(|_| {
            let songs: Vec<_> = (1..=10)
                .map(|i| json!({ "name": format!("Song {}", i), "artist": format!("Artist {}", i) }))
                .collect();
            Ok(json!({ "songs": songs }))
        });
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_search_exact()
            .times(10)
            .returning(|title, _| match title {
                "Song 2" => Ok(Some(raw_track(2, true))),
                _ => Ok(None),
            });

        let pipeline =
            RecommendationPipeline::new(SongListSynthesizer::new(Arc::new(model)), Arc::new(catalog));
        let tracks = pipeline.recommend("NIKI").await.unwrap();

        assert_eq!(ids(&tracks), vec!["track-2"]);
    }

    #[tokio::test]
    async fn test_synthesis_failure_skips_catalog() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_json()
            .times(1)
            .returning(|_| Ok(json!({ "query": "   " })));
        let mut catalog = MockCatalogClient::new();
        catalog.expect_search_broad().times(0);

        let pipeline =
            RecommendationPipeline::new(PhraseSynthesizer::new(Arc::new(model)), Arc::new(catalog));
        let result = pipeline.recommend("rainy day").await;

        assert!(matches!(result, Err(AppError::Synthesis(_))));
    }
}
