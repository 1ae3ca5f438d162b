use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::Context;
use governor::{
    Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::direct::NotKeyed,
};

use crate::ports::catalog::{ArtistHit, Catalog, TopTrack};
use crate::spotify::auth::TokenProvider;
use crate::spotify::types::{SpotifySearchResponse, SpotifyTopTracksResponse};

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

// Process-wide limiter shared by every client instance: 10 requests per
// second stays under the Web API's rolling rate window even with a full
// languages x genres fan-out in flight.
static RATE_LIMITER: std::sync::OnceLock<Arc<DirectRateLimiter>> = std::sync::OnceLock::new();

fn get_rate_limiter() -> &'static Arc<DirectRateLimiter> {
    RATE_LIMITER.get_or_init(|| {
        let quota = Quota::per_second(NonZeroU32::new(10).unwrap());
        Arc::new(RateLimiter::direct(quota))
    })
}

/// Spotify Web API client
pub struct SpotifyCatalog {
    token_provider: TokenProvider,
    client: reqwest::Client,
}

impl SpotifyCatalog {
    pub fn new(token_provider: TokenProvider) -> Self {
        Self {
            token_provider,
            client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        get_rate_limiter().until_ready().await;

        let token = self.token_provider.get_token().await?;

        log::debug!("Catalog API request: {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&token)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .wrap_err_with(|| format!("Failed to send catalog API request to {}", url))?
            .error_for_status()
            .wrap_err_with(|| format!("Catalog API rejected request to {}", url))?;

        response
            .json()
            .await
            .wrap_err_with(|| format!("Failed to parse catalog API response from {}", url))
    }
}

#[async_trait::async_trait]
impl Catalog for SpotifyCatalog {
    async fn search_artists(
        &self,
        query: &str,
        market: Option<String>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ArtistHit>> {
        let mut url = format!(
            "{}/search?q={}&type=artist&limit={}&offset={}",
            SPOTIFY_API_BASE,
            urlencoding::encode(query),
            limit,
            offset
        );
        if let Some(market) = market {
            url.push_str(&format!("&market={}", urlencoding::encode(&market)));
        }

        let page: SpotifySearchResponse = self.get_json(&url).await?;

        log::debug!(
            "Search '{}' returned {} artists",
            query,
            page.artists.items.len()
        );

        Ok(page
            .artists
            .items
            .into_iter()
            .map(|artist| ArtistHit {
                image_url: artist.images.first().map(|image| image.url.clone()),
                followers: artist.followers.map(|followers| followers.total).unwrap_or(0),
                popularity: artist.popularity,
                id: artist.id,
                name: artist.name,
            })
            .collect())
    }

    async fn artist_top_tracks(&self, artist_id: &str, market: &str) -> Result<Vec<TopTrack>> {
        let url = format!(
            "{}/artists/{}/top-tracks?market={}",
            SPOTIFY_API_BASE,
            urlencoding::encode(artist_id),
            urlencoding::encode(market)
        );

        let response: SpotifyTopTracksResponse = self.get_json(&url).await?;

        Ok(response
            .tracks
            .into_iter()
            .map(|track| TopTrack {
                image_url: track.album.images.first().map(|image| image.url.clone()),
                album_name: track.album.name,
                artists: track.artists.into_iter().map(|artist| artist.name).collect(),
                duration_ms: track.duration_ms,
                id: track.id,
                name: track.name,
            })
            .collect())
    }
}
