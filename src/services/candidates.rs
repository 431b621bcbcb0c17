use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{CandidateMovie, FilterCriteria, Genre, MovieId, UserPreferenceProfile},
    services::providers::MetadataProvider,
};

/// Tuning for candidate acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSettings {
    /// Pool size at which no further sources are queried
    pub min_pool_size: usize,
}

impl Default for CandidateSettings {
    fn default() -> Self {
        Self { min_pool_size: 20 }
    }
}

/// Deduplicating accumulator; the first record seen for an id wins
struct CandidatePool {
    seen: HashSet<MovieId>,
    movies: Vec<CandidateMovie>,
    queried: usize,
    failed: usize,
}

impl CandidatePool {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            movies: Vec::new(),
            queried: 0,
            failed: 0,
        }
    }

    /// Merges one source's answer; a failed source is logged and counted
    fn merge(&mut self, source: &str, provider: &str, result: AppResult<Vec<CandidateMovie>>) {
        self.queried += 1;
        let movies = match result {
            Ok(movies) => movies,
            Err(e) => {
                self.failed += 1;
                tracing::warn!(
                    error = %e,
                    source,
                    provider,
                    "Metadata source failed, continuing without it"
                );
                return;
            }
        };

        let before = self.movies.len();
        for movie in movies {
            if self.seen.insert(movie.id.clone()) {
                self.movies.push(movie);
            }
        }
        tracing::debug!(
            source,
            added = self.movies.len() - before,
            pool = self.movies.len(),
            "Merged candidate source"
        );
    }

    fn len(&self) -> usize {
        self.movies.len()
    }
}

/// Result of one acquisition run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateBatch {
    /// Deduplicated candidates in source priority order
    pub movies: Vec<CandidateMovie>,
    /// Candidate sources that were queried
    pub queried: usize,
    /// Queried sources that answered with an error
    pub failed: usize,
}

impl CandidateBatch {
    /// True when at least one source was queried and every one of them failed
    pub fn all_sources_failed(&self) -> bool {
        self.queried > 0 && self.failed == self.queried
    }
}

/// Builds the unscored candidate pool from the metadata provider
///
/// Provider failures never abort acquisition: each failing source is logged
/// and skipped, and the failure count is reported with the pool.
#[derive(Clone)]
pub struct CandidateFetcher {
    provider: Arc<dyn MetadataProvider>,
    settings: CandidateSettings,
}

impl CandidateFetcher {
    pub fn new(provider: Arc<dyn MetadataProvider>, settings: CandidateSettings) -> Self {
        Self { provider, settings }
    }

    /// Queries sources in priority order until the pool is large enough
    ///
    /// 1. the user's top genre (or first explicit favorite)
    /// 2. trending movies
    /// 3. each genre of an active genre filter
    /// 4. the user's top director
    ///
    /// The genre list is loaded at most once per call.
    pub async fn fetch_candidates(
        &self,
        profile: &UserPreferenceProfile,
        explicit_favorites: &[String],
        filters: &FilterCriteria,
    ) -> CandidateBatch {
        let mut pool = CandidatePool::new();
        let min = self.settings.min_pool_size;
        let provider = self.provider.name();

        let primary_genre = profile.primary_genre(explicit_favorites);
        let genres = if primary_genre.is_some() || !filters.genres.is_empty() {
            self.genre_list().await
        } else {
            Vec::new()
        };

        if let Some(id) = primary_genre.and_then(|genre| genre_id(&genres, genre)) {
            let result = self.provider.search_by_genre(id).await;
            pool.merge("top_genre", provider, result);
        }

        if pool.len() < min {
            let result = self.provider.trending().await;
            pool.merge("trending", provider, result);
        }

        for genre in &filters.genres {
            if pool.len() >= min {
                break;
            }
            if let Some(id) = genre_id(&genres, genre) {
                let result = self.provider.search_by_genre(id).await;
                pool.merge("filter_genre", provider, result);
            }
        }

        if pool.len() < min {
            if let Some(director) = profile.top_directors.first() {
                let result = self.provider.search_by_text(director).await;
                pool.merge("top_director", provider, result);
            }
        }

        tracing::info!(
            candidates = pool.len(),
            sources = pool.queried,
            failed_sources = pool.failed,
            provider,
            "Candidate pool assembled"
        );

        CandidateBatch {
            movies: pool.movies,
            queried: pool.queried,
            failed: pool.failed,
        }
    }

    /// Provider genre catalogue; empty when it cannot be loaded
    async fn genre_list(&self) -> Vec<Genre> {
        self.provider.list_genres().await.unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                provider = self.provider.name(),
                "Genre list unavailable, skipping genre sources"
            );
            Vec::new()
        })
    }

    pub fn provider(&self) -> &Arc<dyn MetadataProvider> {
        &self.provider
    }
}

/// Provider id of a genre name, matched case-insensitively
pub fn genre_id(genres: &[Genre], name: &str) -> Option<u64> {
    let wanted = name.trim().to_lowercase();
    let found = genres
        .iter()
        .find(|genre| genre.name.to_lowercase() == wanted)
        .map(|genre| genre.id);

    if found.is_none() {
        tracing::debug!(genre = %name, "No provider id for genre");
    }
    found
}
