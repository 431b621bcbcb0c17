use sqlx::{FromRow, PgPool};

use crate::{
    error::AppResult,
    models::{CandidateMovie, ExplicitPreferences, MovieId, UserMovie, UserSnapshot},
};

/// Read-only access to a user's lists and explicit preferences
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Loads preferences, watched, watchlist and favorites for `user_id`
    ///
    /// An unknown user yields an empty snapshot.
    async fn load_snapshot(&self, user_id: &str) -> AppResult<UserSnapshot>;
}

#[derive(Debug, FromRow)]
struct PreferencesRow {
    favorite_genres: Option<Vec<String>>,
    streaming_services: Option<Vec<String>>,
}

#[derive(Debug, FromRow)]
struct UserMovieRow {
    list: String,
    movie_id: String,
    title: String,
    year: Option<i32>,
    genres: Option<Vec<String>>,
    rating: Option<f64>,
    cast_members: Option<Vec<String>>,
    director: Option<String>,
    streaming_on: Option<Vec<String>>,
    user_rating: Option<f64>,
    favorite: bool,
    favorite_rank: Option<i32>,
}

impl From<UserMovieRow> for UserMovie {
    fn from(row: UserMovieRow) -> Self {
        UserMovie {
            movie: CandidateMovie {
                id: MovieId::from(row.movie_id.as_str()),
                title: row.title,
                year: row.year,
                genres: row.genres.unwrap_or_default(),
                rating: row.rating,
                cast: row.cast_members.unwrap_or_default(),
                director: row.director,
                streaming_on: row.streaming_on.unwrap_or_default(),
            },
            user_rating: row.user_rating,
            favorite: row.favorite,
            favorite_rank: row.favorite_rank,
        }
    }
}

fn assemble_snapshot(
    preferences: Option<PreferencesRow>,
    rows: Vec<UserMovieRow>,
) -> UserSnapshot {
    let preferences = preferences
        .map(|row| ExplicitPreferences {
            favorite_genres: row.favorite_genres.unwrap_or_default(),
            streaming_services: row.streaming_services.unwrap_or_default(),
        })
        .unwrap_or_default();

    let mut snapshot = UserSnapshot {
        preferences,
        ..Default::default()
    };

    for row in rows {
        let list = row.list.clone();
        let entry = UserMovie::from(row);
        match list.as_str() {
            "watched" => snapshot.watched.push(entry),
            "watchlist" => snapshot.watchlist.push(entry),
            "favorites" => snapshot.favorites.push(entry),
            other => {
                tracing::debug!(list = %other, movie_id = %entry.id(), "Ignoring unknown user list");
            }
        }
    }

    snapshot
}

/// PostgreSQL-backed user store (see `schema/user_lists.sql`)
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn load_snapshot(&self, user_id: &str) -> AppResult<UserSnapshot> {
        let preferences = sqlx::query_as::<_, PreferencesRow>(
            r#"
            SELECT favorite_genres, streaming_services
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, UserMovieRow>(
            r#"
            SELECT list, movie_id, title, year, genres, rating, cast_members,
                   director, streaming_on, user_rating, favorite, favorite_rank
            FROM user_movies
            WHERE user_id = $1
            ORDER BY list, COALESCE(favorite_rank, 2147483647), added_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let snapshot = assemble_snapshot(preferences, rows);

        tracing::info!(
            user_id = %user_id,
            watched = snapshot.watched.len(),
            watchlist = snapshot.watchlist.len(),
            favorites = snapshot.favorites.len(),
            "Loaded user snapshot"
        );

        Ok(snapshot)
    }
}
