//! Candidate scoring strategies
//!
//! Scores are additive points around a base of 50. Component scores in
//! `0.0..=1.0` are multiplied by their weight; people bonuses and filter
//! adjustments are flat points. Nothing is clamped or normalised, so filter
//! penalties can push a score below zero. Callers only rely on ordering.

use std::sync::Arc;

use crate::models::{
    profile::decade_of, CandidateMovie, FilterCriteria, ScoredMovie, UserPreferenceProfile,
};
use crate::services::clock::Clock;

pub const BASE_SCORE: f64 = 50.0;

const GENRE_WEIGHT: f64 = 15.0;
const RECENCY_WEIGHT: f64 = 5.0;
const POPULARITY_WEIGHT: f64 = 10.0;
const STREAMING_WEIGHT: f64 = 5.0;
const YEAR_WEIGHT: f64 = 5.0;

const DIRECTOR_BONUS: f64 = 10.0;
const ACTOR_BONUS: f64 = 2.0;
const ACTOR_BONUS_CAP: f64 = 10.0;

const GENRE_FILTER_MATCH: f64 = 20.0;
const GENRE_FILTER_MISS: f64 = -30.0;
const RATING_FILTER_MATCH: f64 = 10.0;
const RATING_FILTER_MISS: f64 = -20.0;
const SERVICE_FILTER_MATCH: f64 = 15.0;
const SERVICE_FILTER_MISS: f64 = -25.0;

const NEUTRAL: f64 = 0.5;
const YEAR_FLOOR: f64 = 0.2;
const FRESH_YEARS: i32 = 2;
const DECAY_YEARS: f64 = 20.0;

/// A way of turning candidates into scored movies
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn score_movie(
        &self,
        movie: &CandidateMovie,
        profile: &UserPreferenceProfile,
        filters: &FilterCriteria,
    ) -> f64;

    /// Scores every candidate, preserving input order
    fn score(
        &self,
        candidates: Vec<CandidateMovie>,
        profile: &UserPreferenceProfile,
        filters: &FilterCriteria,
    ) -> Vec<ScoredMovie> {
        candidates
            .into_iter()
            .map(|movie| {
                let recommendation_score = self.score_movie(&movie, profile, filters);
                ScoredMovie {
                    movie,
                    recommendation_score,
                }
            })
            .collect()
    }
}

/// Full heuristic scorer: genre, recency, popularity, streaming, year and people
#[derive(Clone)]
pub struct PrimaryScorer {
    clock: Arc<dyn Clock>,
}

impl PrimaryScorer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn genre_score(&self, movie: &CandidateMovie, profile: &UserPreferenceProfile) -> f64 {
        let mut score = 0.0;
        for genre in &movie.genres {
            if profile.favorite_genres.contains(genre) {
                score += 0.3;
            }
            score += 0.3 * profile.genre_watch_share(genre);
            if let Some(average) = profile.genre_average_rating(genre) {
                score += 0.2 * (average / 5.0);
            }
            if profile.watchlist_genres.contains_key(genre) {
                score += 0.2;
            }
        }
        score.min(1.0)
    }

    pub fn recency_score(&self, movie: &CandidateMovie) -> f64 {
        let Some(year) = movie.year else {
            return NEUTRAL;
        };
        let age = self.clock.current_year().saturating_sub(year);
        if age <= FRESH_YEARS {
            1.0
        } else {
            (1.0 - f64::from(age - FRESH_YEARS) / DECAY_YEARS).max(0.0)
        }
    }

    pub fn popularity_score(&self, movie: &CandidateMovie) -> f64 {
        movie
            .rating
            .map(|rating| (rating / 10.0).clamp(0.0, 1.0))
            .unwrap_or(NEUTRAL)
    }

    pub fn streaming_score(&self, movie: &CandidateMovie, profile: &UserPreferenceProfile) -> f64 {
        if movie.streaming_on.is_empty() || profile.streaming_services.is_empty() {
            return NEUTRAL;
        }
        if movie
            .streaming_on
            .iter()
            .any(|service| profile.streaming_services.contains(service))
        {
            1.0
        } else {
            0.0
        }
    }

    pub fn year_score(
        &self,
        movie: &CandidateMovie,
        profile: &UserPreferenceProfile,
        filters: &FilterCriteria,
    ) -> f64 {
        match (movie.year, filters.year_range.is_some()) {
            (Some(year), true) => {
                if filters.year_in_range(year) == Some(true) {
                    1.0
                } else {
                    YEAR_FLOOR
                }
            }
            (None, true) => YEAR_FLOOR,
            (Some(year), false) => profile
                .decade_share(decade_of(year))
                .map(|share| share.max(YEAR_FLOOR))
                .unwrap_or(NEUTRAL),
            (None, false) => NEUTRAL,
        }
    }

    pub fn people_bonus(&self, movie: &CandidateMovie, profile: &UserPreferenceProfile) -> f64 {
        let director = match &movie.director {
            Some(director) if profile.top_directors.contains(director) => DIRECTOR_BONUS,
            _ => 0.0,
        };
        let matching_cast = movie
            .cast
            .iter()
            .filter(|actor| profile.top_actors.contains(*actor))
            .count();
        let cast = (ACTOR_BONUS * matching_cast as f64).min(ACTOR_BONUS_CAP);
        director + cast
    }
}

impl Scorer for PrimaryScorer {
    fn name(&self) -> &'static str {
        "primary"
    }

    fn score_movie(
        &self,
        movie: &CandidateMovie,
        profile: &UserPreferenceProfile,
        filters: &FilterCriteria,
    ) -> f64 {
        BASE_SCORE
            + GENRE_WEIGHT * self.genre_score(movie, profile)
            + RECENCY_WEIGHT * self.recency_score(movie)
            + POPULARITY_WEIGHT * self.popularity_score(movie)
            + STREAMING_WEIGHT * self.streaming_score(movie, profile)
            + YEAR_WEIGHT * self.year_score(movie, profile, filters)
            + self.people_bonus(movie, profile)
            + filter_adjustment(movie, filters)
    }
}

const FALLBACK_GENRE_POINTS: f64 = 10.0;
const FALLBACK_GENRE_CAP: f64 = 30.0;
const FALLBACK_RATING_FACTOR: f64 = 3.0;
const FALLBACK_RECENT_YEARS: i32 = 5;
const FALLBACK_RECENT_POINTS: f64 = 10.0;
const FALLBACK_DECADE_POINTS: f64 = 5.0;

/// Genre, rating and year only; used to rank a static catalog
#[derive(Clone)]
pub struct FallbackScorer {
    clock: Arc<dyn Clock>,
}

impl FallbackScorer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Scorer for FallbackScorer {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn score_movie(
        &self,
        movie: &CandidateMovie,
        profile: &UserPreferenceProfile,
        filters: &FilterCriteria,
    ) -> f64 {
        let liked_genres = movie
            .genres
            .iter()
            .filter(|genre| {
                profile.favorite_genres.contains(*genre) || profile.top_genres.contains(*genre)
            })
            .count();
        let genre = (FALLBACK_GENRE_POINTS * liked_genres as f64).min(FALLBACK_GENRE_CAP);

        let rating = movie.rating.unwrap_or(0.0) * FALLBACK_RATING_FACTOR;

        let year = match movie.year {
            Some(year)
                if self.clock.current_year().saturating_sub(year) <= FALLBACK_RECENT_YEARS =>
            {
                FALLBACK_RECENT_POINTS
            }
            Some(year) if profile.decade_preferences.contains_key(&decade_of(year)) => {
                FALLBACK_DECADE_POINTS
            }
            _ => 0.0,
        };

        BASE_SCORE + genre + rating + year + filter_adjustment(movie, filters)
    }
}

/// Flat bonus or penalty for each active filter
pub fn filter_adjustment(movie: &CandidateMovie, filters: &FilterCriteria) -> f64 {
    let mut adjustment = 0.0;

    if filters.has_genre_filter() {
        adjustment += if movie.genres.iter().any(|g| filters.genres.contains(g)) {
            GENRE_FILTER_MATCH
        } else {
            GENRE_FILTER_MISS
        };
    }

    if let Some(threshold) = filters.min_rating_threshold() {
        adjustment += match movie.rating {
            Some(rating) if rating >= threshold => RATING_FILTER_MATCH,
            _ => RATING_FILTER_MISS,
        };
    }

    if filters.has_service_filter() {
        adjustment += if movie
            .streaming_on
            .iter()
            .any(|service| filters.services.contains(service))
        {
            SERVICE_FILTER_MATCH
        } else {
            SERVICE_FILTER_MISS
        };
    }

    adjustment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::FixedClock;

    const YEAR: i32 = 2026;

    fn primary() -> PrimaryScorer {
        PrimaryScorer::new(Arc::new(FixedClock(YEAR)))
    }

    fn movie(id: u64, genres: &[&str], rating: f64, year: i32) -> CandidateMovie {
        let mut movie = CandidateMovie::new(id, format!("Movie {}", id));
        movie.genres = genres.iter().map(|g| g.to_string()).collect();
        movie.rating = Some(rating);
        movie.year = Some(year);
        movie
    }

    fn sci_fi_fan() -> UserPreferenceProfile {
        let mut profile = UserPreferenceProfile::default();
        profile.favorite_genres.insert("Sci-Fi".to_string());
        profile
    }

    #[test]
    fn test_favorite_genre_outscores_other_genre() {
        let scorer = primary();
        let profile = sci_fi_fan();
        let filters = FilterCriteria::default();
        let sci_fi = movie(1, &["Sci-Fi", "Drama"], 8.8, YEAR - 1);
        let romance = movie(2, &["Romance"], 8.8, YEAR - 1);

        let a = scorer.score_movie(&sci_fi, &profile, &filters);
        let b = scorer.score_movie(&romance, &profile, &filters);

        assert!(a > b);
        assert!((a - b - GENRE_WEIGHT * 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_unmet_min_rating_costs_twenty_points() {
        let scorer = primary();
        let profile = sci_fi_fan();
        let open = FilterCriteria::default();
        let strict = FilterCriteria {
            min_rating: Some(9.0),
            ..Default::default()
        };
        let sci_fi = movie(1, &["Sci-Fi", "Drama"], 8.8, YEAR - 1);
        let romance = movie(2, &["Romance"], 8.8, YEAR - 1);

        for candidate in [&sci_fi, &romance] {
            let before = scorer.score_movie(candidate, &profile, &open);
            let after = scorer.score_movie(candidate, &profile, &strict);
            assert!((before - after - 20.0).abs() < 1e-9);
        }
        assert!(
            scorer.score_movie(&sci_fi, &profile, &strict)
                > scorer.score_movie(&romance, &profile, &strict)
        );
    }

    #[test]
    fn test_genre_filter_swing_is_fifty_points() {
        let scorer = primary();
        let profile = UserPreferenceProfile::default();
        let filters = FilterCriteria {
            genres: vec!["Horror".to_string()],
            ..Default::default()
        };
        let matching = movie(1, &["Horror"], 7.0, 2015);
        let missing = movie(2, &["Comedy"], 7.0, 2015);

        let gap = scorer.score_movie(&matching, &profile, &filters)
            - scorer.score_movie(&missing, &profile, &filters);
        assert!(gap >= 50.0);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = primary();
        let profile = sci_fi_fan();
        let filters = FilterCriteria {
            services: vec!["Netflix".to_string()],
            ..Default::default()
        };
        let candidates = vec![
            movie(1, &["Sci-Fi"], 7.1, 1999),
            movie(2, &["Drama"], 6.4, 2024),
        ];

        let first = scorer.score(candidates.clone(), &profile, &filters);
        let second = scorer.score(candidates, &profile, &filters);
        assert_eq!(first, second);
    }

    #[test]
    fn test_score_preserves_order_and_length() {
        let scorer = primary();
        let candidates = vec![movie(3, &[], 5.0, 2000), movie(1, &[], 9.0, 2020)];
        let scored = scorer.score(
            candidates,
            &UserPreferenceProfile::default(),
            &FilterCriteria::default(),
        );
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].movie.id.as_str(), "3");
        assert_eq!(scored[1].movie.id.as_str(), "1");
    }

    #[test]
    fn test_genre_score_clamped_to_one() {
        let scorer = primary();
        let mut profile = sci_fi_fan();
        profile.favorite_genres.insert("Drama".to_string());
        profile.genre_preferences.insert("Sci-Fi".to_string(), 3);
        profile.genre_preferences.insert("Drama".to_string(), 3);
        profile.watchlist_genres.insert("Sci-Fi".to_string(), 1);

        let candidate = movie(1, &["Sci-Fi", "Drama"], 8.0, 2020);
        assert_eq!(scorer.genre_score(&candidate, &profile), 1.0);
    }

    #[test]
    fn test_genre_score_uses_rated_average() {
        let scorer = primary();
        let mut profile = UserPreferenceProfile::default();
        profile.rated_genres.insert(
            "Drama".to_string(),
            crate::models::RatedGenre {
                count: 2,
                total_rating: 5.0,
            },
        );

        let candidate = movie(1, &["Drama"], 8.0, 2020);
        assert!((scorer.genre_score(&candidate, &profile) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_recency_decay() {
        let scorer = primary();
        assert_eq!(scorer.recency_score(&movie(1, &[], 5.0, YEAR)), 1.0);
        assert_eq!(scorer.recency_score(&movie(1, &[], 5.0, YEAR - 2)), 1.0);
        assert!((scorer.recency_score(&movie(1, &[], 5.0, YEAR - 12)) - 0.5).abs() < 1e-9);
        assert_eq!(scorer.recency_score(&movie(1, &[], 5.0, YEAR - 40)), 0.0);
        assert_eq!(scorer.recency_score(&CandidateMovie::new(1u64, "Undated")), 0.5);
    }

    #[test]
    fn test_extreme_years_do_not_overflow() {
        let scorer = primary();
        let fallback = FallbackScorer::new(Arc::new(FixedClock(YEAR)));
        let mut profile = sci_fi_fan();
        profile.decade_preferences.insert(1990, 1);
        let filters = FilterCriteria::default();

        let ancient = movie(1, &["Sci-Fi"], 7.0, i32::MIN);
        assert_eq!(scorer.recency_score(&ancient), 0.0);
        assert!(scorer.score_movie(&ancient, &profile, &filters).is_finite());
        assert!(fallback.score_movie(&ancient, &profile, &filters).is_finite());

        let far_future = movie(2, &["Sci-Fi"], 7.0, i32::MAX);
        assert_eq!(scorer.recency_score(&far_future), 1.0);
        assert!(scorer.score_movie(&far_future, &profile, &filters).is_finite());
        assert!(fallback.score_movie(&far_future, &profile, &filters).is_finite());
    }

    #[test]
    fn test_popularity_defaults_when_rating_missing() {
        let scorer = primary();
        assert_eq!(scorer.popularity_score(&CandidateMovie::new(1u64, "x")), 0.5);
        assert!((scorer.popularity_score(&movie(1, &[], 7.5, 2000)) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_streaming_score_cases() {
        let scorer = primary();
        let mut profile = UserPreferenceProfile::default();
        let mut candidate = movie(1, &[], 5.0, 2000);

        assert_eq!(scorer.streaming_score(&candidate, &profile), 0.5);

        profile.streaming_services.insert("Hulu".to_string());
        candidate.streaming_on = vec!["Netflix".to_string()];
        assert_eq!(scorer.streaming_score(&candidate, &profile), 0.0);

        candidate.streaming_on.push("Hulu".to_string());
        assert_eq!(scorer.streaming_score(&candidate, &profile), 1.0);
    }

    #[test]
    fn test_year_score_cases() {
        let scorer = primary();
        let mut profile = UserPreferenceProfile::default();
        let candidate = movie(1, &[], 5.0, 1995);
        let open = FilterCriteria::default();
        let nineties = FilterCriteria {
            year_range: Some((1990, 1999)),
            ..Default::default()
        };
        let eighties = FilterCriteria {
            year_range: Some((1980, 1989)),
            ..Default::default()
        };

        assert_eq!(scorer.year_score(&candidate, &profile, &open), 0.5);
        assert_eq!(scorer.year_score(&candidate, &profile, &nineties), 1.0);
        assert_eq!(scorer.year_score(&candidate, &profile, &eighties), 0.2);

        profile.decade_preferences.insert(1990, 1);
        profile.decade_preferences.insert(2000, 4);
        assert_eq!(scorer.year_score(&candidate, &profile, &open), 0.25);

        profile.decade_preferences.insert(2000, 10);
        assert_eq!(scorer.year_score(&candidate, &profile, &open), 0.2);
    }

    #[test]
    fn test_people_bonus_caps_cast() {
        let scorer = primary();
        let mut profile = UserPreferenceProfile::default();
        profile.top_directors = vec!["Denis Villeneuve".to_string()];
        profile.top_actors = (0..8).map(|i| format!("Actor {}", i)).collect();

        let mut candidate = movie(1, &[], 5.0, 2000);
        candidate.director = Some("Denis Villeneuve".to_string());
        candidate.cast = (0..7).map(|i| format!("Actor {}", i)).collect();

        assert_eq!(scorer.people_bonus(&candidate, &profile), 20.0);

        candidate.cast.truncate(2);
        candidate.director = None;
        assert_eq!(scorer.people_bonus(&candidate, &profile), 4.0);
    }

    #[test]
    fn test_filter_adjustment_penalties_can_go_negative() {
        let mut candidate = movie(1, &["Comedy"], 4.0, 2000);
        candidate.streaming_on = vec!["Peacock".to_string()];
        let filters = FilterCriteria {
            genres: vec!["Horror".to_string()],
            services: vec!["Netflix".to_string()],
            min_rating: Some(8.0),
            year_range: None,
        };

        assert_eq!(filter_adjustment(&candidate, &filters), -75.0);

        let unrated = CandidateMovie::new(2u64, "Unrated");
        let rating_only = FilterCriteria {
            min_rating: Some(5.0),
            ..Default::default()
        };
        assert_eq!(filter_adjustment(&unrated, &rating_only), -20.0);
    }

    #[test]
    fn test_fallback_scorer_genre_rating_year() {
        let scorer = FallbackScorer::new(Arc::new(FixedClock(YEAR)));
        let mut profile = sci_fi_fan();
        profile.top_genres = vec!["Drama".to_string()];
        profile.decade_preferences.insert(1990, 2);
        let filters = FilterCriteria::default();

        let recent = movie(1, &["Sci-Fi", "Drama", "Action"], 8.0, YEAR - 1);
        assert!((scorer.score_movie(&recent, &profile, &filters) - (50.0 + 20.0 + 24.0 + 10.0)).abs() < 1e-9);

        let nineties = movie(2, &["Romance"], 6.0, 1994);
        assert!((scorer.score_movie(&nineties, &profile, &filters) - (50.0 + 18.0 + 5.0)).abs() < 1e-9);

        let old = movie(3, &[], 6.0, 1970);
        assert!((scorer.score_movie(&old, &profile, &filters) - 68.0).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_scorer_applies_filters() {
        let scorer = FallbackScorer::new(Arc::new(FixedClock(YEAR)));
        let profile = UserPreferenceProfile::default();
        let candidate = movie(1, &["Drama"], 5.0, 1970);
        let filters = FilterCriteria {
            genres: vec!["Drama".to_string()],
            ..Default::default()
        };
        assert_eq!(scorer.score_movie(&candidate, &profile, &filters), 50.0 + 15.0 + 20.0);
    }
}
