// File: zyra-core/src/platforms/spotify/auth.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::Error;
use crate::http::HttpClient;

pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Tokens are treated as expired this long before Spotify says they are.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Client-credentials flow: public catalog data only, no user authorization.
/// Concurrent callers share one refresh because the cache lock is held across it.
pub struct SpotifyAuthenticator {
    http: Arc<dyn HttpClient>,
    credentials: SpotifyCredentials,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyAuthenticator {
    pub fn new(http: Arc<dyn HttpClient>, credentials: SpotifyCredentials) -> Self {
        Self {
            http,
            credentials,
            token: Mutex::new(None),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    /// Returns a valid bearer token, fetching a fresh one when the cached one
    /// is missing or about to expire.
    pub async fn bearer_token(&self) -> Result<String, Error> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
            debug!("(SpotifyAuth) cached token expired => refreshing");
        }

        let fresh = self.request_token().await?;
        let token = fresh.access_token.clone();
        *guard = Some(fresh);
        Ok(token)
    }

    /// Drops the cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        let mut guard = self.token.lock().await;
        *guard = None;
    }

    async fn request_token(&self) -> Result<CachedToken, Error> {
        let basic = BASE64.encode(format!(
            "{}:{}",
            self.credentials.client_id, self.credentials.client_secret
        ));
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), format!("Basic {basic}"));

        let resp = self
            .http
            .post_form(TOKEN_URL, headers, &[("grant_type", "client_credentials")])
            .await
            .map_err(|e| Error::Auth(format!("Spotify: token request failed => {e}")))?;

        if !resp.is_success() {
            warn!("(SpotifyAuth) token endpoint returned HTTP {} => {}", resp.status, resp.body);
            return Err(Error::Auth(format!(
                "Failed to authenticate with Spotify API (HTTP {})",
                resp.status
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&resp.body)?;
        let lifetime = Duration::from_secs(parsed.expires_in).saturating_sub(EXPIRY_MARGIN);
        info!("(SpotifyAuth) obtained access token, valid for {}s", lifetime.as_secs());
        Ok(CachedToken {
            access_token: parsed.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }
}
