use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::TrackQuery,
    services::synthesis::{GenerativeModel, Synthesizer},
};

#[derive(Debug, Deserialize)]
struct PhraseOutput {
    #[serde(default)]
    query: Option<String>,
}

/// Maps free text to one catalog search phrase of at most five words
pub struct PhraseSynthesizer {
    model: Arc<dyn GenerativeModel>,
}

impl PhraseSynthesizer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }
}

fn instruction(raw_input: &str) -> String {
    format!(
        r#"You write Spotify track search queries for a music curator. Turn the listener's request into one concise query of at most 5 words built from genres, moods, or artist names.

- A mood or activity (e.g. "rainy day", "workout") becomes genre and mood keywords (e.g. "lo-fi chill beats", "high-energy pop workout").
- An artist becomes a query for that artist or similar ones (e.g. "artists like Tame Impala").
- A song becomes a query describing its style (e.g. "80s synth-pop revival").

Prefer queries that surface fresh, relevant results.

Reply with a JSON object of the form {{"query": "<search query>"}}.

Listener's request: "{}""#,
        raw_input
    )
}

#[async_trait::async_trait]
impl Synthesizer for PhraseSynthesizer {
    type Output = TrackQuery;

    async fn produce(&self, raw_input: &str) -> AppResult<TrackQuery> {
        let output = self.model.generate_json(&instruction(raw_input)).await?;

        let parsed: PhraseOutput = serde_json::from_value(output)
            .map_err(|e| AppError::Synthesis(format!("Unexpected phrase output: {}", e)))?;

        let query = parsed
            .query
            .and_then(TrackQuery::new)
            .ok_or_else(|| AppError::Synthesis("Could not generate a search query".to_string()))?;

        tracing::info!(query = %query, strategy = self.name(), "Search phrase synthesized");

        Ok(query)
    }

    fn name(&self) -> &'static str {
        "phrase"
    }
}
