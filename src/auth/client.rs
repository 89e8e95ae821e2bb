//! Auth sub-client — credential login and logout.

use uuid::Uuid;

use crate::auth::{AuthCredentials, ClientInfo, LoginData, LoginRequest};
use crate::client::MarketClient;
use crate::error::SdkError;
use crate::network::DEVICE_LABEL;

/// Sub-client for authentication operations.
pub struct Auth<'a> {
    pub(crate) client: &'a MarketClient,
}

impl<'a> Auth<'a> {
    /// Login with account + password and return the token payload.
    ///
    /// On success the bearer token is installed into the HTTP layer (every
    /// subsequent request carries it) and session credentials are recorded.
    /// Emptiness of the inputs is the caller's concern; the backend rejects
    /// bad credentials with a non-2xx status.
    ///
    /// The password is consumed here and not retained anywhere in the SDK.
    pub async fn login(&self, account: &str, password: &str) -> Result<LoginData, SdkError> {
        let request = LoginRequest {
            account: account.to_string(),
            password: password.to_string(),
            dialing_code: "+86".to_string(),
            captcha: String::new(),
            client_info: ClientInfo {
                device: DEVICE_LABEL.to_string(),
                device_id: Uuid::new_v4().to_string(),
            },
        };

        let resp = self.client.http.login(&request).await?;
        let data = resp.data;

        self.client
            .http
            .set_auth_token(Some(data.access_token.clone()))
            .await;

        let credentials = AuthCredentials {
            user_id: data.user_id.clone(),
            expires_at: data.expires_at(),
        };
        *self.client.auth_credentials.write().await = Some(credentials);

        Ok(data)
    }

    /// Forget the token and credentials. Local only; the backend keeps no
    /// session state beyond token expiry.
    pub async fn logout(&self) {
        self.client.http.clear_auth_token().await;
        *self.client.auth_credentials.write().await = None;
    }

    /// Get current auth credentials (if authenticated).
    pub async fn credentials(&self) -> Option<AuthCredentials> {
        self.client.auth_credentials.read().await.clone()
    }

    /// Check if currently authenticated (based on cached credentials).
    pub async fn is_authenticated(&self) -> bool {
        self.client
            .auth_credentials
            .read()
            .await
            .as_ref()
            .map(|c| c.is_authenticated())
            .unwrap_or(false)
    }
}
