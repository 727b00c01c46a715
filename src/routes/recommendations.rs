use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{middleware::RequestId, models::RecommendationResult, routes::AppState};

/// Body of a recommendation request
///
/// `prompt` is left untyped so a non-string value is treated like a missing prompt.
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub prompt: Option<Value>,
}

/// Handler for recommendations endpoint
///
/// Always answers 200; failures are reported in the envelope's `error` field. A body that is
/// not a JSON object counts as a missing prompt.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Json<RecommendationResult> {
    let request = match body {
        Ok(Json(request)) => Some(request),
        Err(rejection) => {
            tracing::info!(
                request_id = %request_id,
                rejection = %rejection.body_text(),
                "Unreadable recommendation request body"
            );
            None
        }
    };
    let prompt = request
        .as_ref()
        .and_then(|request| request.prompt.as_ref())
        .and_then(Value::as_str);

    tracing::info!(
        request_id = %request_id,
        prompt_chars = ?prompt.map(|p| p.chars().count()),
        "Processing recommendation request"
    );

    let result = state.recommendations.resolve(prompt).await;

    tracing::info!(
        request_id = %request_id,
        tracks = result.tracks.len(),
        failed = result.error.is_some(),
        "Recommendation request completed"
    );

    Json(result)
}
