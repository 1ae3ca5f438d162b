use color_eyre::eyre::Result;
use serde::Serialize;

/// Decoupled representation of an artist search hit from the catalog API.
///
/// Carries only what the search itself knows; the aggregator stamps on
/// the genre/language/market of the query that surfaced the hit.
#[derive(Debug, Clone)]
pub struct ArtistHit {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    /// 0-100, current relative prominence per the catalog.
    pub popularity: u32,
    pub followers: u64,
}

/// Decoupled representation of a top track from the catalog API.
#[derive(Debug, Clone, Serialize)]
pub struct TopTrack {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album_name: String,
    pub image_url: Option<String>,
    pub duration_ms: Option<i64>,
}

/// Port trait wrapping the catalog API capabilities used by business logic.
///
/// Implementations live in `spotify::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    async fn search_artists(
        &self,
        query: &str,
        market: Option<String>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ArtistHit>>;

    async fn artist_top_tracks(&self, artist_id: &str, market: &str) -> Result<Vec<TopTrack>>;
}
