use std::collections::HashSet;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::ports::catalog::Catalog;
use crate::preferences::{self, Language, YearRange};

/// Each sub-query asks the catalog for this many candidates.
const RESULTS_PER_QUERY: u32 = 20;

/// Hard cap on the merged, ranked result list.
const MAX_RESULTS: usize = 50;

/// Default cap on concurrent in-flight catalog requests. The languages x
/// genres cross product can otherwise reach hundreds of queries at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// One artist candidate surfaced by the onboarding search, tagged with
/// the genre/language/market of the query that found it first.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateArtist {
    pub id: String,
    pub name: String,
    pub country: Option<String>,
    pub language: Option<String>,
    pub genre: String,
    pub image_url: Option<String>,
    pub popularity: u32,
    pub followers: u64,
}

/// A single catalog query derived from the listener's selections.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchPlan {
    query: String,
    market: Option<&'static str>,
    language: Option<&'static str>,
    genre: &'static str,
}

fn build_search_plans(
    genres: &[&'static str],
    languages: &[Language],
    range: YearRange,
) -> Vec<SearchPlan> {
    let era = preferences::era_keyword(range);
    let query_for = |genre: &str| {
        if era.is_empty() {
            genre.to_string()
        } else {
            format!("{} {}", era, genre)
        }
    };

    if languages.is_empty() {
        genres
            .iter()
            .map(|&genre| SearchPlan {
                query: query_for(genre),
                market: None,
                language: None,
                genre,
            })
            .collect()
    } else {
        languages
            .iter()
            .flat_map(|language| {
                genres.iter().map(move |&genre| SearchPlan {
                    query: query_for(genre),
                    market: Some(language.market),
                    language: Some(language.name),
                    genre,
                })
            })
            .collect()
    }
}

/// Fans onboarding selections out into parallel catalog searches and
/// shapes the merged results into a ranked candidate list.
pub struct Recommender<C: Catalog> {
    catalog: C,
    concurrency: usize,
}

impl<C: Catalog> Recommender<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_concurrency(catalog, DEFAULT_CONCURRENCY)
    }

    pub fn with_concurrency(catalog: C, concurrency: usize) -> Self {
        Self {
            catalog,
            concurrency,
        }
    }

    /// Aggregate artist candidates for the listener's selections.
    ///
    /// Unknown genre/language ids are dropped; with no resolvable genre
    /// no query is issued and the result is empty. Every sub-query that
    /// fails degrades to an empty contribution, so an empty list can mean
    /// "zero matches" or "everything failed" - callers must treat both as
    /// a no-results state.
    pub async fn artists_for_selection(
        &self,
        genre_ids: &[u32],
        language_ids: &[u32],
        year_range: YearRange,
        offset: u32,
    ) -> Vec<CandidateArtist> {
        let genres = preferences::resolve_genres(genre_ids);
        let languages = preferences::resolve_languages(language_ids);

        let plans = build_search_plans(&genres, &languages, year_range);
        log::debug!("Built {} catalog queries", plans.len());

        let semaphore = Semaphore::new(self.concurrency);

        let tasks: Vec<_> = plans
            .iter()
            .map(|plan| {
                let semaphore = &semaphore;
                async move {
                    let _permit = semaphore.acquire().await.unwrap();

                    match self
                        .catalog
                        .search_artists(
                            &plan.query,
                            plan.market.map(String::from),
                            RESULTS_PER_QUERY,
                            offset,
                        )
                        .await
                    {
                        Ok(hits) => hits,
                        Err(error) => {
                            // One failed query must not sink the aggregation.
                            log::warn!("Catalog query '{}' failed: {:?}", plan.query, error);
                            Vec::new()
                        }
                    }
                }
            })
            .collect();

        let results = join_all(tasks).await;

        // Merge in query order; the first query to surface an id decides
        // which genre/language tags the candidate carries.
        let mut seen: HashSet<String> = HashSet::new();
        let mut merged: Vec<CandidateArtist> = Vec::new();
        for (plan, hits) in plans.iter().zip(results) {
            for hit in hits {
                if seen.insert(hit.id.clone()) {
                    merged.push(CandidateArtist {
                        id: hit.id,
                        name: hit.name,
                        country: plan.market.map(String::from),
                        language: plan.language.map(String::from),
                        genre: plan.genre.to_string(),
                        image_url: hit.image_url,
                        popularity: hit.popularity,
                        followers: hit.followers,
                    });
                }
            }
        }
        log::debug!("{} unique candidates after merge", merged.len());

        let rule = preferences::era_popularity_rule(year_range);
        merged.retain(|candidate| rule.keeps(candidate.popularity));

        merged.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        merged.truncate(MAX_RESULTS);

        log::info!("Aggregation produced {} candidates", merged.len());
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::catalog::{ArtistHit, MockCatalog};
    use color_eyre::eyre::eyre;

    fn hit(id: &str, popularity: u32) -> ArtistHit {
        ArtistHit {
            id: id.into(),
            name: format!("Artist {}", id),
            image_url: None,
            popularity,
            followers: 1000,
        }
    }

    fn range(from: i32, to: i32) -> YearRange {
        YearRange { from, to }
    }

    // 1995-2022 resolves to no era keyword and the keep-all popularity
    // rule, so queries are bare genre tags.
    const NEUTRAL_RANGE: YearRange = YearRange {
        from: 1995,
        to: 2022,
    };

    #[tokio::test]
    async fn test_one_query_per_resolvable_genre_without_languages() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_artists()
            .withf(|_, market, limit, offset| market.is_none() && *limit == 20 && *offset == 0)
            .times(2)
            .returning(|_, _, _, _| Ok(vec![]));

        let recommender = Recommender::new(catalog);
        let result = recommender
            .artists_for_selection(&[1, 2], &[], NEUTRAL_RANGE, 0)
            .await;

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_cross_product_of_languages_and_genres() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_artists()
            .withf(|_, market, _, _| {
                matches!(market.as_deref(), Some("IL") | Some("US"))
            })
            .times(4)
            .returning(|_, _, _, _| Ok(vec![]));

        let recommender = Recommender::new(catalog);
        recommender
            .artists_for_selection(&[1, 2], &[12, 1], NEUTRAL_RANGE, 0)
            .await;
    }

    #[tokio::test]
    async fn test_unknown_genre_ids_are_dropped_silently() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_artists()
            .withf(|query, _, _, _| query == "pop")
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));

        let recommender = Recommender::new(catalog);
        let result = recommender
            .artists_for_selection(&[999, 1], &[], NEUTRAL_RANGE, 0)
            .await;

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_no_resolvable_genres_issues_no_queries() {
        let catalog = MockCatalog::new();

        let recommender = Recommender::new(catalog);
        let result = recommender
            .artists_for_selection(&[999], &[], NEUTRAL_RANGE, 0)
            .await;

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_offset_is_passed_to_every_query() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_artists()
            .withf(|_, _, _, offset| *offset == 40)
            .times(2)
            .returning(|_, _, _, _| Ok(vec![]));

        let recommender = Recommender::new(catalog);
        recommender
            .artists_for_selection(&[1, 2], &[], NEUTRAL_RANGE, 40)
            .await;
    }

    #[tokio::test]
    async fn test_era_keyword_prefixes_queries() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_artists()
            .withf(|query, _, _, _| query == "1960s 60s sixties pop")
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));

        let recommender = Recommender::new(catalog);
        recommender
            .artists_for_selection(&[1], &[], range(1960, 1965), 0)
            .await;
    }

    #[tokio::test]
    async fn test_duplicate_ids_keep_first_occurrence() {
        let mut catalog = MockCatalog::new();
        catalog.expect_search_artists().returning(|query, _, _, _| {
            if query == "pop" {
                Ok(vec![hit("X", 70), hit("A", 60)])
            } else {
                Ok(vec![hit("X", 70), hit("B", 50)])
            }
        });

        let recommender = Recommender::new(catalog);
        let result = recommender
            .artists_for_selection(&[1, 2], &[], NEUTRAL_RANGE, 0)
            .await;

        let ids: Vec<_> = result.iter().map(|candidate| candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["X", "A", "B"]);

        // The pop query ran first, so X carries its genre tag
        assert_eq!(result[0].genre, "pop");
    }

    #[tokio::test]
    async fn test_results_are_sorted_and_capped_at_50() {
        let mut catalog = MockCatalog::new();
        catalog.expect_search_artists().returning(|_, _, _, _| {
            Ok((0..60)
                .map(|n| hit(&format!("artist-{}", n), n % 100))
                .collect())
        });

        let recommender = Recommender::new(catalog);
        let result = recommender
            .artists_for_selection(&[1], &[], NEUTRAL_RANGE, 0)
            .await;

        assert_eq!(result.len(), 50);
        for pair in result.windows(2) {
            assert!(pair[0].popularity >= pair[1].popularity);
        }
    }

    #[tokio::test]
    async fn test_old_era_excludes_currently_popular_artists() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_artists()
            .returning(|_, _, _, _| Ok(vec![hit("a", 85), hit("b", 80), hit("c", 79)]));

        let recommender = Recommender::new(catalog);
        let result = recommender
            .artists_for_selection(&[1], &[], range(1960, 1965), 0)
            .await;

        let ids: Vec<_> = result.iter().map(|candidate| candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[tokio::test]
    async fn test_recent_era_excludes_long_tail_artists() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_artists()
            .returning(|_, _, _, _| Ok(vec![hit("a", 90), hit("b", 51), hit("c", 50), hit("d", 10)]));

        let recommender = Recommender::new(catalog);
        let result = recommender
            .artists_for_selection(&[1], &[], range(2021, 2025), 0)
            .await;

        let ids: Vec<_> = result.iter().map(|candidate| candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_mixed_range_keeps_all_popularities() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_artists()
            .returning(|_, _, _, _| Ok(vec![hit("a", 100), hit("b", 50), hit("c", 0)]));

        let recommender = Recommender::new(catalog);
        let result = recommender
            .artists_for_selection(&[1], &[], range(1995, 2022), 0)
            .await;

        assert_eq!(result.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_query_degrades_to_empty_contribution() {
        let mut catalog = MockCatalog::new();
        catalog.expect_search_artists().returning(|query, _, _, _| {
            if query == "pop" {
                Err(eyre!("catalog unavailable"))
            } else {
                Ok(vec![hit("survivor", 40)])
            }
        });

        let recommender = Recommender::new(catalog);
        let result = recommender
            .artists_for_selection(&[1, 2], &[], NEUTRAL_RANGE, 0)
            .await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "survivor");
    }

    #[tokio::test]
    async fn test_total_failure_resolves_to_empty_list() {
        // Credential failure surfaces as every sub-query erroring; the
        // call must still resolve instead of propagating.
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_artists()
            .returning(|_, _, _, _| Err(eyre!("no token")));

        let recommender = Recommender::new(catalog);
        let result = recommender
            .artists_for_selection(&[1, 2], &[12], range(1960, 1965), 0)
            .await;

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_candidates_carry_language_and_market_tags() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_artists()
            .returning(|_, _, _, _| Ok(vec![hit("a", 60)]));

        let recommender = Recommender::new(catalog);
        let result = recommender
            .artists_for_selection(&[1], &[12], NEUTRAL_RANGE, 0)
            .await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].country.as_deref(), Some("IL"));
        assert_eq!(result[0].language.as_deref(), Some("Hebrew"));
        assert_eq!(result[0].genre, "pop");
    }
}
