pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::{sync::Arc, time::Duration};

use config::Config;
use routes::AppState;
use services::{
    catalog::{CatalogSession, ClientCredentialsGrant, SpotifyCatalog},
    synthesis::{ActiveSynthesizer, ChatCompletionsModel},
    RecommendationPipeline, RecommendationService,
};

/// Wires the production collaborators together
///
/// The catalog session is created here once and shared by every request. Every outbound call
/// shares one client whose timeout bounds how long a token refresh can hold the session lock.
pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let session = Arc::new(CatalogSession::new(ClientCredentialsGrant::new(
        http_client.clone(),
        &config.spotify_accounts_url,
        config.spotify_client_id.clone(),
        config.spotify_client_secret.clone(),
    )));
    let catalog = Arc::new(SpotifyCatalog::new(
        http_client.clone(),
        &config.spotify_api_url,
        session,
    ));

    let model = Arc::new(ChatCompletionsModel::new(
        http_client,
        &config.llm_api_url,
        config.llm_api_key.clone(),
        config.llm_model.clone(),
    ));
    let pipeline = RecommendationPipeline::new(ActiveSynthesizer::new(model), catalog);

    Ok(Arc::new(AppState::new(RecommendationService::new(
        Arc::new(pipeline),
    ))))
}
