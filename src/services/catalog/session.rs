/// Catalog access-token lifecycle
///
/// One `CatalogSession` is built per process and shared by reference. The cached token is
/// guarded by an async mutex that stays locked for the whole refresh, so requests arriving while
/// the token is expired wait for the single in-flight grant instead of starting their own.
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};

/// Tokens are treated as expired this long before the provider says they are
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Body of a successful client-credentials grant
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn from_grant(grant: TokenGrant, issued_at: DateTime<Utc>) -> Self {
        Self {
            value: grant.access_token,
            expires_at: issued_at + TimeDelta::seconds(grant.expires_in - EXPIRY_MARGIN_SECS),
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// A single credential exchange with the catalog's token endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialGrant: Send + Sync {
    async fn request_token(&self) -> AppResult<TokenGrant>;
}

/// OAuth2 client-credentials grant against the Spotify accounts service
pub struct ClientCredentialsGrant {
    http_client: HttpClient,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentialsGrant {
    pub fn new(
        http_client: HttpClient,
        accounts_url: &str,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http_client,
            token_url: format!("{}/api/token", accounts_url.trim_end_matches('/')),
            client_id,
            client_secret,
        }
    }
}

#[async_trait::async_trait]
impl CredentialGrant for ClientCredentialsGrant {
    async fn request_token(&self) -> AppResult<TokenGrant> {
        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Token endpoint returned status {}: {}",
                status, body
            )));
        }

        response
            .json::<TokenGrant>()
            .await
            .map_err(|e| AppError::Auth(format!("Unreadable token response: {}", e)))
    }
}

pub struct CatalogSession {
    grant: Box<dyn CredentialGrant>,
    token: Mutex<Option<AccessToken>>,
}

impl CatalogSession {
    pub fn new(grant: impl CredentialGrant + 'static) -> Self {
        Self {
            grant: Box::new(grant),
            token: Mutex::new(None),
        }
    }

    /// Returns a bearer token, requesting a new one only when the cached token has expired
    ///
    /// Grant failures are not retried.
    pub async fn authenticate(&self) -> AppResult<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_valid_at(Utc::now())) {
            return Ok(token.value.clone());
        }

        let grant = self.grant.request_token().await.map_err(|e| {
            tracing::error!(error = %e, "Catalog credential grant failed");
            e
        })?;

        let token = AccessToken::from_grant(grant, Utc::now());
        tracing::info!(expires_at = %token.expires_at, "Catalog access token refreshed");

        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}
