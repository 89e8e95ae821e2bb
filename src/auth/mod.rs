//! Authentication — login request/response wire types and session state.
//!
//! ## Security Model
//!
//! - The raw password is consumed transiently by [`client::Auth::login`] and
//!   never stored. Only the account label and the access token survive the
//!   call (and may be persisted through a [`crate::store::PreferenceStore`]).
//! - The token is injected as an `authorization: Bearer <token>` header on
//!   subsequent requests. An absent or empty token means unauthenticated.

pub mod client;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ─── Session types ───────────────────────────────────────────────────────────

/// Internal auth session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCredentials {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthCredentials {
    /// Whether the session is still valid (not expired).
    pub fn is_authenticated(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Account identity attached to a running watcher.
///
/// Holds the account label and the bearer token only — never the password.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub account: String,
    pub access_token: Option<String>,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

/// Login request body sent to `POST /v1/user/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub account: String,
    pub password: String,
    #[serde(rename = "dialingCode")]
    pub dialing_code: String,
    pub captcha: String,
    #[serde(rename = "clientInfo")]
    pub client_info: ClientInfo,
}

/// Device descriptor inside the login body. `device_id` is minted per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub device: String,
    pub device_id: String,
}

/// Response envelope for the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "isSuccess")]
    pub is_success: bool,
    pub code: String,
    pub msg: String,
    pub data: LoginData,
}

/// Payload of the login envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
}

impl LoginData {
    /// Absolute expiry derived from `expires_in` (seconds from now).
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.expires_in)
    }
}
