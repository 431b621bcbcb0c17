use std::collections::HashMap;

use crate::models::{
    profile::decade_of, ExplicitPreferences, RatedGenre, UserMovie, UserPreferenceProfile,
};

/// How many entries each top list keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileLimits {
    pub top_genres: usize,
    pub top_actors: usize,
    pub top_directors: usize,
}

impl Default for ProfileLimits {
    fn default() -> Self {
        Self {
            top_genres: 5,
            top_actors: 10,
            top_directors: 5,
        }
    }
}

/// Occurrence counter that remembers first-encounter order
#[derive(Default)]
struct Tally {
    order: Vec<String>,
    counts: HashMap<String, u32>,
}

impl Tally {
    fn add(&mut self, key: &str) {
        if key.trim().is_empty() {
            return;
        }
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.order.push(key.to_string());
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    /// Keys by count descending; equal counts keep encounter order
    fn top(&self, n: usize) -> Vec<String> {
        let mut ranked: Vec<&String> = self.order.iter().collect();
        ranked.sort_by(|a, b| self.counts[*b].cmp(&self.counts[*a]));
        ranked.into_iter().take(n).cloned().collect()
    }
}

/// Derives a taste profile from explicit choices, watch history and watchlist
///
/// Pure and deterministic. Entries with missing genres, cast or director
/// contribute nothing for that field.
pub fn build_profile(
    explicit: &ExplicitPreferences,
    watched: &[UserMovie],
    watchlist: &[UserMovie],
    limits: ProfileLimits,
) -> UserPreferenceProfile {
    let mut genres = Tally::default();
    let mut actors = Tally::default();
    let mut directors = Tally::default();
    let mut rated_genres: HashMap<String, RatedGenre> = HashMap::new();
    let mut decade_preferences: HashMap<i32, u32> = HashMap::new();
    let mut rating_sum = 0.0;
    let mut ratings: Vec<f64> = Vec::new();

    for entry in watched {
        let movie = &entry.movie;

        for genre in &movie.genres {
            genres.add(genre);
            if let Some(rating) = entry.user_rating {
                let rated = rated_genres.entry(genre.clone()).or_default();
                rated.count += 1;
                rated.total_rating += rating;
            }
        }
        for actor in &movie.cast {
            actors.add(actor);
        }
        if let Some(director) = &movie.director {
            directors.add(director);
        }
        if let Some(year) = movie.year {
            *decade_preferences.entry(decade_of(year)).or_default() += 1;
        }
        if let Some(rating) = entry.user_rating {
            rating_sum += rating;
            ratings.push(rating);
        }
    }

    let (average_rating, rating_variance) = if ratings.is_empty() {
        (0.0, 0.0)
    } else {
        let count = ratings.len() as f64;
        let mean = rating_sum / count;
        let variance = ratings.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / count;
        (mean, variance)
    };

    let mut watchlist_genres: HashMap<String, u32> = HashMap::new();
    for entry in watchlist {
        for genre in &entry.movie.genres {
            if !genre.trim().is_empty() {
                *watchlist_genres.entry(genre.clone()).or_default() += 1;
            }
        }
    }

    let profile = UserPreferenceProfile {
        favorite_genres: explicit.favorite_genres.iter().cloned().collect(),
        streaming_services: explicit.streaming_services.iter().cloned().collect(),
        top_genres: genres.top(limits.top_genres),
        top_actors: actors.top(limits.top_actors),
        top_directors: directors.top(limits.top_directors),
        genre_preferences: genres.counts,
        rated_genres,
        actor_preferences: actors.counts,
        director_preferences: directors.counts,
        decade_preferences,
        average_rating,
        rating_variance,
        watchlist_genres,
    };

    tracing::debug!(
        watched = watched.len(),
        watchlist = watchlist.len(),
        top_genres = ?profile.top_genres,
        average_rating = profile.average_rating,
        "Built preference profile"
    );

    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateMovie;

    fn watched(id: u64, genres: &[&str], year: i32, rating: Option<f64>) -> UserMovie {
        let mut movie = CandidateMovie::new(id, format!("Movie {}", id));
        movie.genres = genres.iter().map(|g| g.to_string()).collect();
        movie.year = Some(year);
        UserMovie {
            user_rating: rating,
            ..UserMovie::from(movie)
        }
    }

    #[test]
    fn test_empty_inputs_give_empty_profile() {
        let profile = build_profile(
            &ExplicitPreferences::default(),
            &[],
            &[],
            ProfileLimits::default(),
        );

        assert!(profile.favorite_genres.is_empty());
        assert!(profile.genre_preferences.is_empty());
        assert!(profile.rated_genres.is_empty());
        assert!(profile.decade_preferences.is_empty());
        assert!(profile.watchlist_genres.is_empty());
        assert!(profile.top_genres.is_empty());
        assert!(profile.top_actors.is_empty());
        assert!(profile.top_directors.is_empty());
        assert_eq!(profile.average_rating, 0.0);
        assert_eq!(profile.rating_variance, 0.0);
    }

    #[test]
    fn test_counts_and_decades() {
        let history = vec![
            watched(1, &["Drama", "Crime"], 1994, None),
            watched(2, &["Drama"], 1999, None),
            watched(3, &["Comedy"], 2004, None),
        ];
        let profile = build_profile(
            &ExplicitPreferences::default(),
            &history,
            &[],
            ProfileLimits::default(),
        );

        assert_eq!(profile.genre_preferences["Drama"], 2);
        assert_eq!(profile.genre_preferences["Crime"], 1);
        assert_eq!(profile.decade_preferences[&1990], 2);
        assert_eq!(profile.decade_preferences[&2000], 1);
        assert_eq!(profile.top_genres[0], "Drama");
    }

    #[test]
    fn test_rating_mean_and_population_variance() {
        let history = vec![
            watched(1, &["Drama"], 2000, Some(2.0)),
            watched(2, &["Drama"], 2000, Some(4.0)),
            watched(3, &["Horror"], 2000, None),
        ];
        let profile = build_profile(
            &ExplicitPreferences::default(),
            &history,
            &[],
            ProfileLimits::default(),
        );

        assert_eq!(profile.average_rating, 3.0);
        assert_eq!(profile.rating_variance, 1.0);
        assert_eq!(profile.rated_genres["Drama"].count, 2);
        assert_eq!(profile.rated_genres["Drama"].average(), 3.0);
        assert!(!profile.rated_genres.contains_key("Horror"));
    }

    #[test]
    fn test_top_lists_break_ties_by_encounter_order() {
        let history = vec![
            watched(1, &["Western", "Noir"], 1950, None),
            watched(2, &["Noir", "Musical"], 1952, None),
            watched(3, &["Musical", "Western"], 1953, None),
        ];
        let limits = ProfileLimits {
            top_genres: 2,
            ..ProfileLimits::default()
        };
        let profile = build_profile(&ExplicitPreferences::default(), &history, &[], limits);

        assert_eq!(profile.top_genres, vec!["Western", "Noir"]);
    }

    #[test]
    fn test_people_preferences_and_limits() {
        let mut first = CandidateMovie::new(1u64, "Heat");
        first.cast = vec!["Al Pacino".to_string(), "Robert De Niro".to_string()];
        first.director = Some("Michael Mann".to_string());
        let mut second = CandidateMovie::new(2u64, "The Irishman");
        second.cast = vec!["Robert De Niro".to_string()];
        second.director = Some("Martin Scorsese".to_string());

        let history = vec![UserMovie::from(first), UserMovie::from(second)];
        let limits = ProfileLimits {
            top_actors: 1,
            ..ProfileLimits::default()
        };
        let profile = build_profile(&ExplicitPreferences::default(), &history, &[], limits);

        assert_eq!(profile.top_actors, vec!["Robert De Niro"]);
        assert_eq!(profile.actor_preferences["Al Pacino"], 1);
        assert_eq!(profile.top_directors, vec!["Michael Mann", "Martin Scorsese"]);
    }

    #[test]
    fn test_malformed_entries_are_tolerated() {
        let history: Vec<UserMovie> =
            serde_json::from_str(r#"[{"id": 1}, {"id": "2", "genre": ["Drama"], "userRating": 5}]"#)
                .unwrap();
        let profile = build_profile(
            &ExplicitPreferences::default(),
            &history,
            &history,
            ProfileLimits::default(),
        );

        assert_eq!(profile.genre_preferences.len(), 1);
        assert_eq!(profile.average_rating, 5.0);
        assert_eq!(profile.watchlist_genres["Drama"], 1);
        assert!(profile.top_directors.is_empty());
    }

    #[test]
    fn test_explicit_preferences_copied() {
        let explicit = ExplicitPreferences {
            favorite_genres: vec!["Sci-Fi".to_string()],
            streaming_services: vec!["Netflix".to_string(), "Hulu".to_string()],
        };
        let profile = build_profile(&explicit, &[], &[], ProfileLimits::default());

        assert!(profile.favorite_genres.contains("Sci-Fi"));
        assert_eq!(profile.streaming_services.len(), 2);
    }
}
