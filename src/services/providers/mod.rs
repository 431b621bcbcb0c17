/// Movie metadata provider abstraction
///
/// Candidate acquisition only talks to this trait, so the scorer can be
/// exercised against fakes. The TMDB adapter is the production implementation.
use crate::{
    error::AppResult,
    models::{CandidateMovie, Genre},
};

pub mod tmdb;

/// Source of unscored movies and the genre catalogue
///
/// Implementations without credentials must answer with empty lists rather
/// than errors, and report `is_configured() == false` so callers can switch
/// to their fallback path.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Popular movies tagged with the provider's genre id
    async fn search_by_genre(&self, genre_id: u64) -> AppResult<Vec<CandidateMovie>>;

    /// Globally trending movies
    async fn trending(&self) -> AppResult<Vec<CandidateMovie>>;

    /// Free-text movie search
    async fn search_by_text(&self, query: &str) -> AppResult<Vec<CandidateMovie>>;

    /// All genres with their provider ids
    async fn list_genres(&self) -> AppResult<Vec<Genre>>;

    /// Whether credentials are present
    fn is_configured(&self) -> bool;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
