/// TMDB (The Movie Database) v3 provider
///
/// List endpoints only carry genre ids and an average vote, so list results
/// are resolved against the cached genre catalogue and, when enrichment is on,
/// completed with credits and subscription providers from the details endpoint.
///
/// API Flow:
/// 1. Genres: /genre/movie/list → id/name pairs
/// 2. Lists: /discover/movie, /trending/movie/week, /search/movie → movie summaries
/// 3. Details: /movie/{id}?append_to_response=credits,watch/providers
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{CandidateMovie, Genre, TmdbGenreList, TmdbMovieDetails, TmdbPage},
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

const LIST_CACHE_TTL: u64 = 3600; // 1 hour
const GENRE_CACHE_TTL: u64 = 86400; // 1 day
const DETAILS_CACHE_TTL: u64 = 604800; // 1 week
const MAX_CAST: usize = 10;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    region: String,
    enrich_details: bool,
    cache: Cache,
    /// Genre catalogue, loaded once per provider and shared by its clones
    genres: Arc<OnceCell<Vec<Genre>>>,
}

impl TmdbProvider {
    /// Creates a provider; a missing or blank `api_key` leaves it unconfigured
    pub fn new(cache: Cache, api_key: Option<String>, api_url: String, region: String) -> Self {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("TMDB API key missing, metadata provider will return empty results");
        }

        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            region,
            enrich_details: true,
            cache,
            genres: Arc::new(OnceCell::new()),
        }
    }

    /// Enables or disables the per-movie details lookup
    pub fn with_enrichment(mut self, enabled: bool) -> Self {
        self.enrich_details = enabled;
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);
        let api_key = self.api_key.as_deref().unwrap_or_default();

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key)])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {} for {}: {}",
                status, path, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Genre id → name lookup; empty when the genre list cannot be loaded
    async fn genre_names(&self) -> HashMap<u64, String> {
        match self.list_genres().await {
            Ok(genres) => genres.into_iter().map(|g| (g.id, g.name)).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Genre list unavailable, list results lose genres");
                HashMap::new()
            }
        }
    }

    async fn fetch_list(
        &self,
        key: CacheKey,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<Vec<CandidateMovie>> {
        cached!(self.cache, key, LIST_CACHE_TTL, async move {
            let page: TmdbPage = self.get_json(path, query).await?;
            let names = self.genre_names().await;
            let movies: Vec<CandidateMovie> = page
                .results
                .into_iter()
                .map(|movie| movie.into_candidate(&names))
                .collect();

            let movies = if self.enrich_details {
                self.enrich(movies).await
            } else {
                movies
            };

            tracing::info!(
                path = %path,
                results = movies.len(),
                provider = "tmdb",
                "Movie list fetched"
            );

            Ok::<_, AppError>(movies)
        })
    }

    /// Failures are not memoised, so the next call retries
    async fn load_genres(&self) -> AppResult<Vec<Genre>> {
        cached!(self.cache, CacheKey::GenreList, GENRE_CACHE_TTL, async move {
            let list: TmdbGenreList = self.get_json("/genre/movie/list", &[]).await?;
            tracing::info!(genres = list.genres.len(), provider = "tmdb", "Genre list fetched");
            Ok::<_, AppError>(list.genres)
        })
    }

    async fn movie_details(&self, movie_id: u64) -> AppResult<CandidateMovie> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(movie_id),
            DETAILS_CACHE_TTL,
            async move {
                let details: TmdbMovieDetails = self
                    .get_json(
                        &format!("/movie/{}", movie_id),
                        &[("append_to_response", "credits,watch/providers")],
                    )
                    .await?;
                Ok::<_, AppError>(details.into_candidate(&self.region, MAX_CAST))
            }
        )
    }

    /// Replaces list records with their detailed version, in parallel
    ///
    /// A failed lookup keeps the list record; order is preserved.
    async fn enrich(&self, movies: Vec<CandidateMovie>) -> Vec<CandidateMovie> {
        let mut tasks = Vec::with_capacity(movies.len());

        for movie in movies {
            let task = movie.id.as_str().parse::<u64>().ok().map(|movie_id| {
                let provider = self.clone();
                tokio::spawn(async move { provider.movie_details(movie_id).await })
            });
            tasks.push((movie, task));
        }

        let mut enriched = Vec::with_capacity(tasks.len());
        let mut failures = 0;

        for (movie, task) in tasks {
            let Some(task) = task else {
                enriched.push(movie);
                continue;
            };
            match task.await {
                Ok(Ok(details)) => enriched.push(details),
                Ok(Err(e)) => {
                    tracing::debug!(error = %e, movie_id = %movie.id, "Details fetch failed");
                    failures += 1;
                    enriched.push(movie);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                    failures += 1;
                    enriched.push(movie);
                }
            }
        }

        if failures > 0 {
            tracing::warn!(
                success_count = enriched.len() - failures,
                error_count = failures,
                "Partial details enrichment failure"
            );
        }

        enriched
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_by_genre(&self, genre_id: u64) -> AppResult<Vec<CandidateMovie>> {
        if !self.is_configured() {
            return Ok(Vec::new());
        }
        let genre = genre_id.to_string();
        self.fetch_list(
            CacheKey::Genre(genre_id),
            "/discover/movie",
            &[("with_genres", genre.as_str()), ("sort_by", "popularity.desc")],
        )
        .await
    }

    async fn trending(&self) -> AppResult<Vec<CandidateMovie>> {
        if !self.is_configured() {
            return Ok(Vec::new());
        }
        self.fetch_list(CacheKey::Trending, "/trending/movie/week", &[])
            .await
    }

    async fn search_by_text(&self, query: &str) -> AppResult<Vec<CandidateMovie>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }
        if !self.is_configured() {
            return Ok(Vec::new());
        }
        self.fetch_list(
            CacheKey::MovieSearch(query.to_string()),
            "/search/movie",
            &[("query", query.trim())],
        )
        .await
    }

    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        if !self.is_configured() {
            return Ok(Vec::new());
        }
        let genres = self.genres.get_or_try_init(|| self.load_genres()).await?;
        Ok(genres.clone())
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
