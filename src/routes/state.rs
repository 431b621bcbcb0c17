use std::sync::Arc;

use crate::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, CacheWriterHandle, PgUserStore, UserStore},
    models::CandidateMovie,
    services::{
        providers::{tmdb::TmdbProvider, MetadataProvider},
        CandidateFetcher, Clock, FallbackScorer, PrimaryScorer, RecommendationService,
        SystemClock,
    },
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub recommendations: RecommendationService,
    pub provider: Arc<dyn MetadataProvider>,
    /// Absent when no database is configured
    pub user_store: Option<Arc<dyn UserStore>>,
    /// Static catalog ranked when live recommendations are unavailable
    pub fallback_catalog: Arc<Vec<CandidateMovie>>,
}

impl AppState {
    /// Wires providers, stores and scorers from configuration
    ///
    /// The returned handle, when present, must be shut down to flush pending
    /// cache writes.
    pub async fn from_config(config: &Config) -> anyhow::Result<(Self, Option<CacheWriterHandle>)> {
        let (cache, cache_handle) = match &config.redis_url {
            Some(url) => {
                let (cache, handle) = Cache::new(create_redis_client(url)?).await;
                (cache, Some(handle))
            }
            None => {
                tracing::info!("REDIS_URL not set, provider cache disabled");
                (Cache::disabled(), None)
            }
        };

        let provider: Arc<dyn MetadataProvider> = Arc::new(
            TmdbProvider::new(
                cache,
                config.tmdb_api_key.clone(),
                config.tmdb_api_url.clone(),
                config.watch_region.clone(),
            )
            .with_enrichment(config.enrich_details),
        );

        let user_store: Option<Arc<dyn UserStore>> = match &config.database_url {
            Some(url) => Some(Arc::new(PgUserStore::new(create_pool(url).await?))),
            None => {
                tracing::info!("DATABASE_URL not set, user store disabled");
                None
            }
        };

        let fallback_catalog = match &config.fallback_catalog_path {
            Some(path) => load_fallback_catalog(path)?,
            None => Vec::new(),
        };

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let recommendations = RecommendationService::new(
            CandidateFetcher::new(provider.clone(), config.candidate_settings()),
            Arc::new(PrimaryScorer::new(clock.clone())),
            Arc::new(FallbackScorer::new(clock)),
            config.profile_limits(),
        );

        let state = Self {
            recommendations,
            provider,
            user_store,
            fallback_catalog: Arc::new(fallback_catalog),
        };

        Ok((state, cache_handle))
    }
}

/// Reads a fallback catalog (a JSON array of movies) from disk
pub fn load_fallback_catalog(path: &str) -> anyhow::Result<Vec<CandidateMovie>> {
    let raw = std::fs::read_to_string(path)?;
    let catalog: Vec<CandidateMovie> = serde_json::from_str(&raw)?;
    tracing::info!(path = %path, movies = catalog.len(), "Loaded fallback catalog");
    Ok(catalog)
}
