//! Credential acquisition for the remote store
//!
//! The store authenticates each request with a short-lived token appended as
//! a query parameter. Token issuance is opaque to the core: a provider either
//! hands out a static pre-issued token or drives the identity endpoint's
//! password grant with refresh.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use contracts::CoreError;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Opaque credential provider
///
/// Implementations must be cheap to call; callers request a token per
/// operation and rely on the provider to cache/refresh internally.
pub trait CredentialProvider: Send + Sync {
    /// Current valid token
    fn token(&self) -> impl Future<Output = Result<String, CoreError>> + Send;
}

/// Pre-issued token (tests, service accounts)
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    async fn token(&self) -> Result<String, CoreError> {
        Ok(self.0.clone())
    }
}

/// Password-grant credentials against the identity endpoint
///
/// Signs in once, then refreshes with the refresh token. Tokens are renewed
/// 60 seconds before expiry.
pub struct PasswordCredentials {
    api_key: String,
    email: String,
    password: String,
    sign_in_url: String,
    refresh_url: String,
    client: reqwest::Client,
    state: Mutex<TokenState>,
}

#[derive(Debug, Default)]
struct TokenState {
    id_token: Option<String>,
    refresh_token: Option<String>,
    expiry_epoch_s: u64,
}

const SIGN_IN_ENDPOINT: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword";
const REFRESH_ENDPOINT: &str = "https://securetoken.googleapis.com/v1/token";
const RENEW_MARGIN_S: u64 = 60;

#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(rename = "idToken")]
    id_token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
    #[serde(rename = "expiresIn")]
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

impl PasswordCredentials {
    /// Create a provider for the given identity key and account
    pub fn new(
        api_key: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Auth {
                message: format!("http client build failed: {e}"),
            })?;

        Ok(Self {
            api_key: api_key.into(),
            email: email.into(),
            password: password.into(),
            sign_in_url: SIGN_IN_ENDPOINT.to_string(),
            refresh_url: REFRESH_ENDPOINT.to_string(),
            client,
            state: Mutex::new(TokenState::default()),
        })
    }

    /// Override identity endpoints (tests)
    pub fn with_endpoints(mut self, sign_in_url: String, refresh_url: String) -> Self {
        self.sign_in_url = sign_in_url;
        self.refresh_url = refresh_url;
        self
    }

    #[instrument(name = "auth_sign_in", skip_all)]
    async fn sign_in(&self, state: &mut TokenState) -> Result<(), CoreError> {
        let url = format!("{}?key={}", self.sign_in_url, self.api_key);
        let body = serde_json::json!({
            "email": self.email,
            "password": self.password,
            "returnSecureToken": true,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(auth_error)?
            .error_for_status()
            .map_err(auth_error)?;

        let parsed: SignInResponse = response.json().await.map_err(auth_error)?;
        state.expiry_epoch_s = now_epoch_s() + parse_expiry(&parsed.expires_in);
        state.id_token = Some(parsed.id_token);
        state.refresh_token = Some(parsed.refresh_token);
        debug!("signed in to remote store");
        Ok(())
    }

    #[instrument(name = "auth_refresh", skip_all)]
    async fn refresh(&self, state: &mut TokenState, refresh_token: String) -> Result<(), CoreError> {
        let url = format!("{}?key={}", self.refresh_url, self.api_key);
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(auth_error)?
            .error_for_status()
            .map_err(auth_error)?;

        let parsed: RefreshResponse = response.json().await.map_err(auth_error)?;
        state.expiry_epoch_s = now_epoch_s() + parse_expiry(&parsed.expires_in);
        state.id_token = Some(parsed.id_token);
        state.refresh_token = Some(parsed.refresh_token);
        Ok(())
    }
}

impl CredentialProvider for PasswordCredentials {
    async fn token(&self) -> Result<String, CoreError> {
        let mut state = self.state.lock().await;

        let expired = now_epoch_s() + RENEW_MARGIN_S >= state.expiry_epoch_s;
        if state.id_token.is_none() || expired {
            match state.refresh_token.clone() {
                Some(refresh_token) => self.refresh(&mut state, refresh_token).await?,
                None => self.sign_in(&mut state).await?,
            }
        }

        state.id_token.clone().ok_or_else(|| CoreError::Auth {
            message: "identity endpoint returned no token".to_string(),
        })
    }
}

/// Runtime-selected credential provider
///
/// Lets callers hold one store type whether the deployment uses a pre-issued
/// token or the password grant.
pub enum Credentials {
    Static(StaticToken),
    Password(PasswordCredentials),
}

impl CredentialProvider for Credentials {
    async fn token(&self) -> Result<String, CoreError> {
        match self {
            Credentials::Static(provider) => provider.token().await,
            Credentials::Password(provider) => provider.token().await,
        }
    }
}

fn auth_error(e: reqwest::Error) -> CoreError {
    CoreError::Auth {
        message: e.to_string(),
    }
}

fn parse_expiry(expires_in: &str) -> u64 {
    expires_in.parse().unwrap_or(3600)
}

fn now_epoch_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let provider = StaticToken("abc123".to_string());
        assert_eq!(provider.token().await.unwrap(), "abc123");
    }

    #[test]
    fn test_parse_expiry_fallback() {
        assert_eq!(parse_expiry("3600"), 3600);
        assert_eq!(parse_expiry("garbage"), 3600);
        assert_eq!(parse_expiry("120"), 120);
    }
}
