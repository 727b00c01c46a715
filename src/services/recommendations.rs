use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::RecommendationResult,
    services::resolution::RecommendationSource,
};

/// Shortest accepted prompt, counted in characters after trimming
const MIN_PROMPT_CHARS: usize = 2;

pub const INVALID_PROMPT_MESSAGE: &str = "Please enter a valid prompt.";
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Boundary between raw user input and the resolution pipeline
///
/// Validates the prompt, runs the pipeline, and folds every outcome into a
/// [`RecommendationResult`]. Internal error detail is logged here and never returned.
#[derive(Clone)]
pub struct RecommendationService {
    source: Arc<dyn RecommendationSource>,
}

impl RecommendationService {
    pub fn new(source: Arc<dyn RecommendationSource>) -> Self {
        Self { source }
    }

    pub async fn resolve(&self, raw_input: Option<&str>) -> RecommendationResult {
        let prompt = match validate_prompt(raw_input) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::info!(error = %e, "Rejected recommendation prompt");
                return RecommendationResult::failure(INVALID_PROMPT_MESSAGE);
            }
        };

        match self.source.recommend(prompt).await {
            Ok(tracks) => RecommendationResult::success(tracks),
            Err(e) => {
                if e.is_client_error() {
                    tracing::warn!(error = %e, "Recommendation request rejected downstream");
                } else {
                    tracing::error!(error = %e, error_debug = ?e, "Recommendation pipeline failed");
                }
                RecommendationResult::failure(GENERIC_FAILURE_MESSAGE)
            }
        }
    }
}

/// Rejects missing prompts and prompts shorter than two characters once trimmed
///
/// The untrimmed text is what reaches the model.
fn validate_prompt(raw_input: Option<&str>) -> AppResult<&str> {
    let prompt =
        raw_input.ok_or_else(|| AppError::Validation("Prompt is missing".to_string()))?;

    if prompt.trim().chars().count() < MIN_PROMPT_CHARS {
        return Err(AppError::Validation(format!(
            "Prompt must be at least {} characters",
            MIN_PROMPT_CHARS
        )));
    }

    Ok(prompt)
}
