use std::collections::HashMap;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::{
    alphabet,
    engine::{self, general_purpose},
};
use tokio::sync::Mutex;

use crate::spotify::types::SpotifyTokenResponse;

const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Refresh this long before the reported expiry so a token is never
/// handed out moments before the API starts rejecting it.
const EXPIRY_LEEWAY: Duration = Duration::from_secs(60);

// RFC 7617 Basic credentials: standard alphabet, with padding
const BASIC_ENGINE: engine::GeneralPurpose =
    engine::GeneralPurpose::new(&alphabet::STANDARD, general_purpose::PAD);

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token request rejected: {reason}")]
    Rejected { reason: String },
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        BASIC_ENGINE.encode(format!("{}:{}", client_id, client_secret))
    )
}

/// How long a freshly fetched token should be served from the cache.
fn token_ttl(expires_in: u64) -> Duration {
    Duration::from_secs(expires_in).saturating_sub(EXPIRY_LEEWAY)
}

/// Request an app token via the client-credentials exchange
/// https://developer.spotify.com/documentation/web-api/tutorials/client-credentials-flow
pub async fn request_client_credentials_token(
    client: &reqwest::Client,
    client_id: &str,
    client_secret: &str,
) -> Result<SpotifyTokenResponse, TokenError> {
    let mut params = HashMap::new();
    params.insert("grant_type", "client_credentials");

    let response = client
        .post(SPOTIFY_TOKEN_URL)
        // This automatically serializes to x-www-form-urlencoded and sets the header (as required by spotify)
        .form(&params)
        .header("Authorization", basic_auth_header(client_id, client_secret))
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(|error| TokenError::FailedToSendRequest(error))?;

    if !response.status().is_success() {
        return Err(TokenError::Rejected {
            reason: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    let token_response: SpotifyTokenResponse = response
        .json()
        .await
        .map_err(|error| TokenError::FailedToParseResponse(error))?;

    Ok(token_response)
}

#[derive(Debug)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Client-credentials token provider with a process-lifetime cache.
///
/// The token is reused while valid and refreshed once it is within
/// [`EXPIRY_LEEWAY`] of expiry. Concurrent callers serialize on the
/// cache mutex, so an expired token is refreshed at most once.
pub struct TokenProvider {
    client_id: String,
    client_secret: String,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            client: reqwest::Client::new(),
            cached: Mutex::new(None),
        }
    }

    pub async fn get_token(&self) -> Result<String, TokenError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
            log::debug!("Cached catalog token expired, refreshing");
        }

        let response =
            request_client_credentials_token(&self.client, &self.client_id, &self.client_secret)
                .await?;

        log::debug!(
            "Fetched catalog token, valid for {}s",
            response.expires_in
        );

        let token = CachedToken {
            access_token: response.access_token.clone(),
            expires_at: Instant::now() + token_ttl(response.expires_in),
        };
        *cached = Some(token);

        Ok(response.access_token)
    }
}
