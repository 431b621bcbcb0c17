use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{
        CandidateMovie, ExplicitPreferences, FilterCriteria, MovieId, ScoredMovie, UserMovie,
        UserPreferenceProfile,
    },
    services::{
        candidates::CandidateFetcher,
        profile::{build_profile, ProfileLimits},
        scoring::Scorer,
    },
};

/// Everything a caller supplies for one recommendation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationInput {
    #[serde(default)]
    pub preferences: ExplicitPreferences,
    #[serde(default)]
    pub watched: Vec<UserMovie>,
    #[serde(default)]
    pub watchlist: Vec<UserMovie>,
    #[serde(default)]
    pub filters: FilterCriteria,
}

impl RecommendationInput {
    pub fn profile(&self, limits: ProfileLimits) -> UserPreferenceProfile {
        build_profile(&self.preferences, &self.watched, &self.watchlist, limits)
    }

    /// Ids the user has already watched or queued
    pub fn seen_ids(&self) -> HashSet<MovieId> {
        self.watched
            .iter()
            .chain(self.watchlist.iter())
            .map(|entry| entry.id().clone())
            .collect()
    }
}

/// Profile → candidates → scores → exclusion → ranking
#[derive(Clone)]
pub struct RecommendationService {
    fetcher: CandidateFetcher,
    scorer: Arc<dyn Scorer>,
    fallback_scorer: Arc<dyn Scorer>,
    limits: ProfileLimits,
}

impl RecommendationService {
    pub fn new(
        fetcher: CandidateFetcher,
        scorer: Arc<dyn Scorer>,
        fallback_scorer: Arc<dyn Scorer>,
        limits: ProfileLimits,
    ) -> Self {
        Self {
            fetcher,
            scorer,
            fallback_scorer,
            limits,
        }
    }

    /// Ranked recommendations for one user
    ///
    /// Returns every remaining candidate; truncation is up to the caller.
    ///
    /// # Errors
    /// [`AppError::RecommendationUnavailable`] when the metadata provider has
    /// no credentials, or when every candidate source it was asked for failed.
    /// A reachable provider that yields nothing produces an empty list instead.
    pub async fn recommend(
        &self,
        user_id: &str,
        input: &RecommendationInput,
    ) -> AppResult<Vec<ScoredMovie>> {
        let start = Instant::now();
        let provider = self.fetcher.provider();

        if !provider.is_configured() {
            tracing::warn!(
                user_id = %user_id,
                provider = provider.name(),
                "Metadata provider not configured"
            );
            return Err(AppError::RecommendationUnavailable(format!(
                "metadata provider '{}' is not configured",
                provider.name()
            )));
        }

        let profile = input.profile(self.limits);
        let batch = self
            .fetcher
            .fetch_candidates(&profile, &input.preferences.favorite_genres, &input.filters)
            .await;

        if batch.movies.is_empty() && batch.all_sources_failed() {
            tracing::warn!(
                user_id = %user_id,
                provider = provider.name(),
                failed_sources = batch.failed,
                "Every metadata source failed"
            );
            return Err(AppError::RecommendationUnavailable(format!(
                "metadata provider '{}' is unreachable",
                provider.name()
            )));
        }

        let candidate_count = batch.movies.len();
        let ranked = rank(
            self.scorer.as_ref(),
            batch.movies,
            &profile,
            &input.filters,
            &input.seen_ids(),
        );

        tracing::info!(
            user_id = %user_id,
            candidates = candidate_count,
            recommendations = ranked.len(),
            scorer = self.scorer.name(),
            processing_time_ms = start.elapsed().as_millis(),
            "Recommendations computed"
        );

        Ok(ranked)
    }

    /// Ranks a static catalog with the fallback scorer
    ///
    /// Used when live recommendations are unavailable; applies the same
    /// exclusion and ordering as [`Self::recommend`].
    pub fn rank_fallback(
        &self,
        user_id: &str,
        catalog: &[CandidateMovie],
        input: &RecommendationInput,
    ) -> Vec<ScoredMovie> {
        let profile = input.profile(self.limits);
        let ranked = rank(
            self.fallback_scorer.as_ref(),
            catalog.to_vec(),
            &profile,
            &input.filters,
            &input.seen_ids(),
        );

        tracing::info!(
            user_id = %user_id,
            catalog = catalog.len(),
            recommendations = ranked.len(),
            scorer = self.fallback_scorer.name(),
            "Fallback recommendations computed"
        );

        ranked
    }
}

/// Scores, drops already-seen ids and sorts by descending score
///
/// The sort is stable: equal scores keep candidate order.
pub fn rank(
    scorer: &dyn Scorer,
    candidates: Vec<CandidateMovie>,
    profile: &UserPreferenceProfile,
    filters: &FilterCriteria,
    seen: &HashSet<MovieId>,
) -> Vec<ScoredMovie> {
    let mut scored: Vec<ScoredMovie> = scorer
        .score(candidates, profile, filters)
        .into_iter()
        .filter(|scored| !seen.contains(&scored.movie.id))
        .collect();

    scored.sort_by(|a, b| b.recommendation_score.total_cmp(&a.recommendation_score));
    scored
}
