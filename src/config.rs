use serde::Deserialize;

use crate::services::{candidates::CandidateSettings, profile::ProfileLimits};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key; without it the metadata provider serves empty results
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Region used to pick subscription providers from TMDB watch data
    #[serde(default = "default_watch_region")]
    pub watch_region: String,

    /// Fetch credits and watch providers for every listed movie
    #[serde(default = "default_enrich_details")]
    pub enrich_details: bool,

    /// Redis connection URL; caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// PostgreSQL URL of the user store; user-backed routes are disabled when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// JSON file with a static catalog ranked when live recommendations are unavailable
    #[serde(default)]
    pub fallback_catalog_path: Option<String>,

    /// Candidate pool size at which acquisition stops querying further sources
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: usize,

    #[serde(default = "default_top_genres")]
    pub top_genres: usize,

    #[serde(default = "default_top_actors")]
    pub top_actors: usize,

    #[serde(default = "default_top_directors")]
    pub top_directors: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_watch_region() -> String {
    "US".to_string()
}

fn default_enrich_details() -> bool {
    true
}

fn default_min_pool_size() -> usize {
    20
}

fn default_top_genres() -> usize {
    5
}

fn default_top_actors() -> usize {
    10
}

fn default_top_directors() -> usize {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn profile_limits(&self) -> ProfileLimits {
        ProfileLimits {
            top_genres: self.top_genres,
            top_actors: self.top_actors,
            top_directors: self.top_directors,
        }
    }

    pub fn candidate_settings(&self) -> CandidateSettings {
        CandidateSettings {
            min_pool_size: self.min_pool_size,
        }
    }
}
