//! OAuth token exchange for the GigaChat API.
//!
//! Tokens are short-lived; a cached token is reused until it comes within
//! a safety margin of its expiry, then refreshed on demand.

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::{GigaChatError, Result};

const EXPIRY_MARGIN_MS: i64 = 60_000;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Millisecond epoch expiry, as returned by the auth endpoint.
    expires_at: i64,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

pub struct TokenManager {
    client: reqwest::Client,
    auth_url: String,
    credentials: String,
    scope: String,
    cached: RwLock<Option<CachedToken>>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("auth_url", &self.auth_url)
            .field("credentials", &"<redacted>")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    #[must_use]
    pub fn new(
        auth_url: impl Into<String>,
        credentials: impl Into<String>,
        scope: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            auth_url: auth_url.into(),
            credentials: credentials.into(),
            scope: scope.into(),
            cached: RwLock::new(None),
        }
    }

    pub(crate) fn set_auth_url(&mut self, url: impl Into<String>) {
        self.auth_url = url.into();
    }

    /// Return a valid access token, refreshing if the cached one is absent
    /// or within [`EXPIRY_MARGIN_MS`] of expiry.
    ///
    /// # Errors
    ///
    /// Returns `GigaChatError::Unavailable` on network failure and
    /// `GigaChatError::Auth` if the exchange is rejected.
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.cached.read().await.as_ref()
            && now_ms() + EXPIRY_MARGIN_MS < token.expires_at
        {
            return Ok(token.access_token.clone());
        }
        self.refresh().await
    }

    async fn refresh(&self) -> Result<String> {
        let response = self
            .client
            .post(&self.auth_url)
            .header("Authorization", format!("Basic {}", self.credentials))
            .header("RqUID", uuid::Uuid::new_v4().to_string())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!("scope={}", self.scope))
            .send()
            .await
            .map_err(|e| GigaChatError::Unavailable(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(GigaChatError::Http)?;
        if !status.is_success() {
            tracing::error!("token exchange failed with status {status}");
            return Err(GigaChatError::Auth(format!(
                "token request failed (status {status})"
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&text)?;
        let mut guard = self.cached.write().await;
        *guard = Some(CachedToken {
            access_token: parsed.access_token.clone(),
            expires_at: parsed.expires_at,
        });
        Ok(parsed.access_token)
    }
}

fn now_ms() -> i64 {
    i64::try_from(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
    )
    .unwrap_or(i64::MAX)
}
