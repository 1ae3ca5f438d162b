use std::collections::HashSet;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::ports::catalog::{Catalog, TopTrack};
use crate::services::recommend::DEFAULT_CONCURRENCY;

/// Default size cap for an assembled starter playlist.
pub const DEFAULT_PLAYLIST_CAP: usize = 100;

/// Assembles a starter playlist from the artists a listener picked out
/// of the aggregation result.
pub struct PlaylistBuilder<C: Catalog> {
    catalog: C,
    concurrency: usize,
}

impl<C: Catalog> PlaylistBuilder<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_concurrency(catalog, DEFAULT_CONCURRENCY)
    }

    pub fn with_concurrency(catalog: C, concurrency: usize) -> Self {
        Self {
            catalog,
            concurrency,
        }
    }

    /// Fetch every picked artist's top tracks concurrently and weave them
    /// into one list.
    ///
    /// Tracks are interleaved round-robin across artists so the head of
    /// the playlist has variety, deduplicated by track id, and capped. An
    /// artist whose lookup fails simply contributes nothing.
    pub async fn starter_playlist(
        &self,
        artist_ids: &[String],
        market: &str,
        cap: usize,
    ) -> Vec<TopTrack> {
        let semaphore = Semaphore::new(self.concurrency);

        let tasks: Vec<_> = artist_ids
            .iter()
            .map(|artist_id| {
                let semaphore = &semaphore;
                async move {
                    let _permit = semaphore.acquire().await.unwrap();

                    match self.catalog.artist_top_tracks(artist_id, market).await {
                        Ok(tracks) => tracks,
                        Err(error) => {
                            log::warn!("Top tracks lookup for '{}' failed: {:?}", artist_id, error);
                            Vec::new()
                        }
                    }
                }
            })
            .collect();

        let per_artist = join_all(tasks).await;

        let playlist = interleave_and_dedup(per_artist, cap);
        log::info!("Assembled starter playlist with {} tracks", playlist.len());
        playlist
    }
}

fn interleave_and_dedup(per_artist: Vec<Vec<TopTrack>>, cap: usize) -> Vec<TopTrack> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut playlist: Vec<TopTrack> = Vec::new();

    let longest = per_artist.iter().map(Vec::len).max().unwrap_or(0);
    'filling: for position in 0..longest {
        for tracks in &per_artist {
            if let Some(track) = tracks.get(position) {
                if seen.insert(track.id.clone()) {
                    playlist.push(track.clone());
                    if playlist.len() == cap {
                        break 'filling;
                    }
                }
            }
        }
    }

    playlist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::catalog::MockCatalog;
    use color_eyre::eyre::eyre;

    fn track(id: &str) -> TopTrack {
        TopTrack {
            id: id.into(),
            name: format!("Track {}", id),
            artists: vec!["Someone".into()],
            album_name: "Album".into(),
            image_url: None,
            duration_ms: Some(180_000),
        }
    }

    #[test]
    fn test_interleave_alternates_across_artists() {
        let per_artist = vec![
            vec![track("a1"), track("a2")],
            vec![track("b1"), track("b2"), track("b3")],
        ];

        let result = interleave_and_dedup(per_artist, 100);
        let ids: Vec<_> = result.iter().map(|t| t.id.as_str()).collect();

        assert_eq!(ids, vec!["a1", "b1", "a2", "b2", "b3"]);
    }

    #[test]
    fn test_interleave_dedups_by_track_id() {
        // Collaborations show up in both artists' top tracks
        let per_artist = vec![
            vec![track("shared"), track("a2")],
            vec![track("shared"), track("b2")],
        ];

        let result = interleave_and_dedup(per_artist, 100);
        let ids: Vec<_> = result.iter().map(|t| t.id.as_str()).collect();

        assert_eq!(ids, vec!["shared", "a2", "b2"]);
    }

    #[test]
    fn test_interleave_respects_cap() {
        let per_artist = vec![vec![track("a1"), track("a2"), track("a3")]];

        let result = interleave_and_dedup(per_artist, 2);

        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_interleave_with_no_artists() {
        assert!(interleave_and_dedup(vec![], 10).is_empty());
    }

    #[tokio::test]
    async fn test_starter_playlist_fetches_each_artist() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_artist_top_tracks()
            .withf(|_, market| market == "US")
            .times(2)
            .returning(|artist_id, _| Ok(vec![track(&format!("{}-hit", artist_id))]));

        let builder = PlaylistBuilder::new(catalog);
        let result = builder
            .starter_playlist(&["one".into(), "two".into()], "US", 100)
            .await;

        let ids: Vec<_> = result.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["one-hit", "two-hit"]);
    }

    #[tokio::test]
    async fn test_failed_artist_contributes_nothing() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_artist_top_tracks()
            .returning(|artist_id, _| {
                if artist_id == "broken" {
                    Err(eyre!("catalog unavailable"))
                } else {
                    Ok(vec![track("ok")])
                }
            });

        let builder = PlaylistBuilder::new(catalog);
        let result = builder
            .starter_playlist(&["broken".into(), "fine".into()], "US", 100)
            .await;

        let ids: Vec<_> = result.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }
}
