use serde::Serialize;
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Per-genre rating aggregate
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct RatedGenre {
    pub count: u32,
    pub total_rating: f64,
}

impl RatedGenre {
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_rating / f64::from(self.count)
        }
    }
}

/// Taste profile derived from one request's inputs
///
/// Never persisted; rebuilt from the current watch/watchlist snapshot on every
/// recommendation request.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UserPreferenceProfile {
    pub favorite_genres: HashSet<String>,
    pub streaming_services: HashSet<String>,
    pub genre_preferences: HashMap<String, u32>,
    pub rated_genres: HashMap<String, RatedGenre>,
    pub actor_preferences: HashMap<String, u32>,
    pub director_preferences: HashMap<String, u32>,
    /// Keyed by the first year of the decade
    pub decade_preferences: HashMap<i32, u32>,
    pub average_rating: f64,
    pub rating_variance: f64,
    pub watchlist_genres: HashMap<String, u32>,
    pub top_genres: Vec<String>,
    pub top_actors: Vec<String>,
    pub top_directors: Vec<String>,
}

impl UserPreferenceProfile {
    /// Watch count of `genre` relative to the most-watched genre, in `0.0..=1.0`
    pub fn genre_watch_share(&self, genre: &str) -> f64 {
        share_of_max(&self.genre_preferences, genre)
    }

    /// Average user rating of `genre`, when any watched title of it was rated
    pub fn genre_average_rating(&self, genre: &str) -> Option<f64> {
        self.rated_genres
            .get(genre)
            .filter(|rated| rated.count > 0)
            .map(RatedGenre::average)
    }

    /// Frequency of `decade` relative to the most-watched decade, `None` without history
    pub fn decade_share(&self, decade: i32) -> Option<f64> {
        if self.decade_preferences.is_empty() {
            return None;
        }
        Some(share_of_max(&self.decade_preferences, &decade))
    }

    /// The genre candidate acquisition searches first
    ///
    /// Falls back to an explicit favorite when there is no watch history.
    pub fn primary_genre<'a>(&'a self, explicit_favorites: &'a [String]) -> Option<&'a str> {
        self.top_genres
            .first()
            .or_else(|| explicit_favorites.first())
            .map(String::as_str)
    }
}

fn share_of_max<K, Q>(counts: &HashMap<K, u32>, key: &Q) -> f64
where
    K: Eq + Hash + Borrow<Q>,
    Q: Eq + Hash + ?Sized,
{
    let max = counts.values().copied().max().unwrap_or(0);
    if max == 0 {
        return 0.0;
    }
    let count = counts.get(key).copied().unwrap_or(0);
    f64::from(count) / f64::from(max)
}

/// Decade start year for `year` (1994 -> 1990, -5 -> -10)
///
/// Saturates at `i32::MIN` for the few years below the lowest full decade.
pub fn decade_of(year: i32) -> i32 {
    year.saturating_sub(year.rem_euclid(10))
}
