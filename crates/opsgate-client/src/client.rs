//! Thin JSON HTTP client for the management API with bearer injection.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::AuthClient;
use crate::error::{ClientError, ClientResult};

/// Connection settings for one management API tenant.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct UpstreamConfig {
    pub tenant_url: String,
    pub auth_url: String,
    pub auth_key: String,
    pub auth_secret: String,
    pub tenant_id: String,
}

/// HTTP client for the management API. Cheap to clone; the auth cache is shared.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    tenant_id: String,
    auth: Arc<AuthClient>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            base_url: config.tenant_url.trim_end_matches('/').to_string(),
            tenant_id: config.tenant_id.clone(),
            auth: Arc::new(AuthClient::new(
                &config.auth_url,
                &config.auth_key,
                &config.auth_secret,
            )),
            http: reqwest::Client::new(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ClientResult<T> {
        self.request(reqwest::Method::GET, endpoint, None::<&()>).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.request(reqwest::Method::POST, endpoint, Some(body)).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.request(reqwest::Method::PUT, endpoint, Some(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> ClientResult<()> {
        let _: serde_json::Value = self
            .request(reqwest::Method::DELETE, endpoint, None::<&()>)
            .await?;
        Ok(())
    }

    async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> ClientResult<T> {
        let url = format!("{}{endpoint}", self.base_url);
        let token = self.auth.token().await?;

        tracing::debug!(%method, %url, "management API request");

        let mut req = self.http.request(method, &url).bearer_auth(token);
        if let Some(b) = body {
            req = req.json(b);
        }

        let response = req.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(endpoint.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // DELETE and state-change endpoints may legitimately return no body.
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }

        Ok(serde_json::from_str(&text)?)
    }
}
