use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{SongSuggestion, SongSuggestions},
    services::synthesis::{GenerativeModel, Synthesizer},
};

/// Number of suggestions the model must return
pub const SUGGESTION_COUNT: usize = 10;

#[derive(Debug, Deserialize)]
struct SongListOutput {
    #[serde(default)]
    songs: Vec<SongSuggestion>,
}

/// Maps free text to exactly ten {title, artist} suggestions
pub struct SongListSynthesizer {
    model: Arc<dyn GenerativeModel>,
}

impl SongListSynthesizer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }
}

fn instruction(raw_input: &str) -> String {
    format!(
        r#"You are a music curator. Recommend exactly {count} songs for the listener's request.

First decide what the request is:
- an artist name: recommend that artist's songs and songs by similar artists
- a song title: recommend songs with a similar sound and feel
- a mood or activity: recommend songs that fit it

Favour tracks released in recent years, but classics are welcome where they fit. Every song must be a real, released track that exists on Spotify.

Reply with a JSON object of the form {{"songs": [{{"name": "<song title>", "artist": "<primary artist>"}}]}} containing exactly {count} entries.

Listener's request: "{input}""#,
        count = SUGGESTION_COUNT,
        input = raw_input
    )
}

fn validate(output: SongListOutput) -> AppResult<SongSuggestions> {
    if output.songs.len() != SUGGESTION_COUNT {
        return Err(AppError::Synthesis(format!(
            "Expected {} song suggestions, got {}",
            SUGGESTION_COUNT,
            output.songs.len()
        )));
    }

    let songs = output
        .songs
        .into_iter()
        .map(|song| SongSuggestion::new(song.title.trim(), song.artist.trim()))
        .collect::<Vec<_>>();

    if songs
        .iter()
        .any(|song| song.title.is_empty() || song.artist.is_empty())
    {
        return Err(AppError::Synthesis(
            "Song suggestion with blank title or artist".to_string(),
        ));
    }

    Ok(SongSuggestions(songs))
}

#[async_trait::async_trait]
impl Synthesizer for SongListSynthesizer {
    type Output = SongSuggestions;

    async fn produce(&self, raw_input: &str) -> AppResult<SongSuggestions> {
        let output = self.model.generate_json(&instruction(raw_input)).await?;

        let parsed: SongListOutput = serde_json::from_value(output)
            .map_err(|e| AppError::Synthesis(format!("Unexpected song list output: {}", e)))?;
        let suggestions = validate(parsed)?;

        tracing::info!(
            suggestions = suggestions.0.len(),
            strategy = self.name(),
            "Song suggestions synthesized"
        );

        Ok(suggestions)
    }

    fn name(&self) -> &'static str {
        "song_list"
    }
}
