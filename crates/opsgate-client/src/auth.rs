//! OAuth2 client-credentials token management.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{ClientError, ClientResult};

/// Buffer subtracted from the advertised expiry so a token is refreshed
/// before the upstream actually rejects it.
const EXPIRY_BUFFER_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Fetches and caches OAuth2 client-credentials tokens for the management API.
pub struct AuthClient {
    auth_url: String,
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl AuthClient {
    pub fn new(auth_url: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            auth_url: auth_url.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            http: reqwest::Client::new(),
            cached: Mutex::new(None),
        }
    }

    /// Return a valid bearer token, refreshing if the cached one expired.
    pub async fn token(&self) -> ClientResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(t) = cached.as_ref() {
            if Instant::now() < t.expires_at {
                tracing::debug!("using cached management API token");
                return Ok(t.token.clone());
            }
        }

        tracing::info!("fetching new management API token from {}", self.auth_url);
        let resp = self.fetch_token().await?;

        let lifetime = resp.expires_in.saturating_sub(EXPIRY_BUFFER_SECS);
        *cached = Some(CachedToken {
            token: resp.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });

        Ok(resp.access_token)
    }

    async fn fetch_token(&self) -> ClientResult<TokenResponse> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self.http.post(&self.auth_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ClientError::Auth(format!("invalid token response: {e}")))
    }
}
