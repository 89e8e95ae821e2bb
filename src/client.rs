//! High-level client — `MarketClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs` (auth in
//! `auth/client.rs`). This module keeps the builder, shared auth state, and
//! accessor methods.

use crate::auth::client::Auth;
use crate::auth::AuthCredentials;
use crate::domain::project::client::Projects;
use crate::error::SdkError;
use crate::http::MarketHttp;

use async_lock::RwLock;
use std::sync::Arc;

// Re-export sub-client types for convenience.
pub use crate::auth::client::Auth as AuthClient;
pub use crate::domain::project::client::Projects as ProjectsClient;

/// The primary entry point for the marketplace API.
///
/// Provides nested sub-client accessors: `client.projects()`, `client.auth()`.
pub struct MarketClient {
    pub(crate) http: MarketHttp,
    /// Internal auth state.
    pub(crate) auth_credentials: Arc<RwLock<Option<AuthCredentials>>>,
}

impl MarketClient {
    pub fn builder() -> MarketClientBuilder {
        MarketClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn projects(&self) -> Projects<'_> {
        Projects { client: self }
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth { client: self }
    }

    /// Install a previously persisted bearer token (e.g. from a
    /// [`crate::store::PreferenceStore`]). Empty tokens are treated as none.
    pub async fn restore_token(&self, token: &str) {
        if token.is_empty() {
            self.http.set_auth_token(None).await;
        } else {
            self.http.set_auth_token(Some(token.to_string())).await;
        }
    }
}

impl Clone for MarketClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            auth_credentials: self.auth_credentials.clone(),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct MarketClientBuilder {
    base_url: String,
}

impl Default for MarketClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
        }
    }
}

impl MarketClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn build(self) -> Result<MarketClient, SdkError> {
        if self.base_url.is_empty() {
            return Err(SdkError::Validation("base_url must not be empty".into()));
        }

        Ok(MarketClient {
            http: MarketHttp::new(&self.base_url),
            auth_credentials: Arc::new(RwLock::new(None)),
        })
    }
}
