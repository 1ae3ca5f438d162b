use serde::{Deserialize, Serialize};

/// Spotify client-credentials token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyFollowers {
    pub total: u64,
}

/// Artist object from the Web API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    pub followers: Option<SpotifyFollowers>,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// One page of artist search results
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtistPage {
    pub items: Vec<SpotifyArtist>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifySearchResponse {
    pub artists: SpotifyArtistPage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrackArtist {
    pub id: String,
    pub name: String,
}

/// Track object as returned by the top-tracks endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    pub artists: Vec<SpotifyTrackArtist>,
    pub album: SpotifyAlbum,
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub popularity: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTopTracksResponse {
    pub tracks: Vec<SpotifyTrack>,
}
