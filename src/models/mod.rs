use serde::Deserialize;
use std::collections::HashMap;

pub mod filters;
pub mod movie;
pub mod preferences;
pub mod profile;

pub use filters::FilterCriteria;
pub use movie::{CandidateMovie, Genre, MovieId, ScoredMovie};
pub use preferences::{ExplicitPreferences, UserMovie, UserSnapshot};
pub use profile::{RatedGenre, UserPreferenceProfile};

// ============================================================================
// TMDB API Types
// ============================================================================

/// Paged list response shared by discover, trending and search endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// Movie summary as returned in list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl TmdbMovie {
    /// Converts to a candidate, resolving genre ids through `genre_names`
    ///
    /// Ids missing from the lookup are dropped.
    pub fn into_candidate(self, genre_names: &HashMap<u64, String>) -> CandidateMovie {
        let genres = self
            .genre_ids
            .iter()
            .filter_map(|id| genre_names.get(id).cloned())
            .collect();

        CandidateMovie {
            id: MovieId::from(self.id),
            title: self.title.unwrap_or_default(),
            year: release_year(self.release_date.as_deref()),
            genres,
            rating: self.vote_average,
            cast: Vec::new(),
            director: None,
            streaming_on: Vec::new(),
        }
    }
}

/// Response of GET /genre/movie/list
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Response of GET /movie/{id}?append_to_response=credits,watch/providers
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub credits: Option<TmdbCredits>,
    #[serde(default, rename = "watch/providers")]
    pub watch_providers: Option<TmdbWatchProviders>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbWatchProviders {
    #[serde(default)]
    pub results: HashMap<String, TmdbRegionProviders>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbRegionProviders {
    #[serde(default)]
    pub flatrate: Vec<TmdbProviderEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbProviderEntry {
    pub provider_name: String,
}

impl TmdbMovieDetails {
    /// Converts to a candidate, keeping `max_cast` billed actors and the
    /// subscription providers of `region`
    pub fn into_candidate(self, region: &str, max_cast: usize) -> CandidateMovie {
        let credits = self.credits.unwrap_or_default();
        let director = credits
            .crew
            .iter()
            .find(|member| member.job.as_deref() == Some("Director"))
            .map(|member| member.name.clone());
        let cast = credits
            .cast
            .into_iter()
            .take(max_cast)
            .map(|member| member.name)
            .collect();
        let streaming_on = self
            .watch_providers
            .and_then(|mut providers| providers.results.remove(region))
            .map(|region| {
                region
                    .flatrate
                    .into_iter()
                    .map(|entry| entry.provider_name)
                    .collect()
            })
            .unwrap_or_default();

        CandidateMovie {
            id: MovieId::from(self.id),
            title: self.title.unwrap_or_default(),
            year: release_year(self.release_date.as_deref()),
            genres: self.genres.into_iter().map(|genre| genre.name).collect(),
            rating: self.vote_average,
            cast,
            director,
            streaming_on,
        }
    }
}

/// Year part of a `YYYY-MM-DD` release date
fn release_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}
