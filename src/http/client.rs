//! Low-level HTTP client — `MarketHttp`.
//!
//! One method per API endpoint. Returns wire types (conversion to domain
//! types happens at the sub-client boundary). Internal to the SDK — the
//! high-level `MarketClient` wraps this.
//!
//! There is deliberately no retry machinery here: a failed call surfaces to
//! the caller and the next scheduled or manual poll is the only recovery.

use crate::auth::{LoginRequest, LoginResponse};
use crate::domain::project::wire::TabItemsResponse;
use crate::error::HttpError;
use crate::shared::TabId;

use async_lock::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Low-level HTTP client for the marketplace REST API.
pub struct MarketHttp {
    base_url: String,
    client: Client,
    /// Bearer token once logged in. NEVER exposed publicly.
    auth_token: Arc<RwLock<Option<String>>>,
}

impl MarketHttp {
    pub fn new(base_url: &str) -> Self {
        let builder = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build().expect("Failed to build HTTP client"),
            auth_token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the bearer token attached to subsequent requests.
    pub(crate) async fn set_auth_token(&self, token: Option<String>) {
        *self.auth_token.write().await = token;
    }

    /// Clear the bearer token.
    pub(crate) async fn clear_auth_token(&self) {
        *self.auth_token.write().await = None;
    }

    /// Check if a bearer token is currently set.
    #[allow(dead_code)]
    pub(crate) async fn has_auth_token(&self) -> bool {
        self.auth_token.read().await.is_some()
    }

    // ── Projects ─────────────────────────────────────────────────────────

    pub async fn get_tab_items(&self, tab_id: &TabId) -> Result<TabItemsResponse, HttpError> {
        let url = format!(
            "{}/v1/nft/project/tab/items?tab_id={}",
            self.base_url,
            tab_id.as_str()
        );
        self.get(&url).await
    }

    // ── Auth ─────────────────────────────────────────────────────────────

    pub async fn login(&self, body: &LoginRequest) -> Result<LoginResponse, HttpError> {
        let url = format!("{}/v1/user/auth/login", self.base_url);
        self.post(&url, body).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        self.do_request(reqwest::Method::GET, url, None::<&()>).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, HttpError> {
        self.do_request(reqwest::Method::POST, url, Some(body)).await
    }

    async fn do_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, HttpError> {
        let mut req = self
            .client
            .request(method, url)
            .header("accept", "application/json")
            .header("content-type", "application/json");

        if let Some(token) = self.auth_token.read().await.as_ref() {
            if !token.is_empty() {
                req = req.header("authorization", format!("Bearer {}", token));
            }
        }

        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::Reqwest(e)
            }
        })?;
        let status = resp.status();

        if status.is_success() {
            // Decode from text; a shape mismatch is a decode error, not a
            // transport failure.
            let text = resp.text().await?;
            return serde_json::from_str::<T>(&text).map_err(|e| {
                tracing::warn!("Malformed response from {}: {}", url, e);
                HttpError::Decode(e)
            });
        }

        let status_code = status.as_u16();
        let body_text = resp.text().await.unwrap_or_default();
        tracing::debug!(status = status_code, url, "Request rejected");

        match status_code {
            401 => Err(HttpError::Unauthorized),
            404 => Err(HttpError::NotFound(body_text)),
            400..=499 => Err(HttpError::BadRequest(body_text)),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }
}

impl Clone for MarketHttp {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
            auth_token: self.auth_token.clone(),
        }
    }
}
