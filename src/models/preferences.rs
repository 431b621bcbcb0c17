use serde::{Deserialize, Serialize};

use super::{CandidateMovie, MovieId};

/// Taste signals the user picked explicitly
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExplicitPreferences {
    #[serde(default, alias = "favoriteGenres")]
    pub favorite_genres: Vec<String>,
    #[serde(default, alias = "streamingServices")]
    pub streaming_services: Vec<String>,
}

/// An entry of one of the user's lists (watched, watchlist, favorites)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserMovie {
    #[serde(flatten)]
    pub movie: CandidateMovie,
    /// Star rating given by the user, 0-5
    #[serde(default, alias = "userRating")]
    pub user_rating: Option<f64>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default, alias = "favoriteRank")]
    pub favorite_rank: Option<i32>,
}

impl UserMovie {
    pub fn id(&self) -> &MovieId {
        &self.movie.id
    }
}

impl From<CandidateMovie> for UserMovie {
    fn from(movie: CandidateMovie) -> Self {
        Self {
            movie,
            user_rating: None,
            favorite: false,
            favorite_rank: None,
        }
    }
}

/// Everything the recommender needs to know about one user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserSnapshot {
    #[serde(default)]
    pub preferences: ExplicitPreferences,
    #[serde(default)]
    pub watched: Vec<UserMovie>,
    #[serde(default)]
    pub watchlist: Vec<UserMovie>,
    #[serde(default)]
    pub favorites: Vec<UserMovie>,
}

impl UserSnapshot {
    /// Watch history with favorites folded in
    ///
    /// A favorite is a movie the user has seen, so it counts as watched unless
    /// the watched list already holds the same id.
    pub fn watch_history(&self) -> Vec<UserMovie> {
        let mut history = self.watched.clone();
        for favorite in &self.favorites {
            if !history.iter().any(|m| m.id() == favorite.id()) {
                history.push(favorite.clone());
            }
        }
        history
    }
}
