use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{CandidateMovie, Genre},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

/// Handler for GET /movies/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<CandidateMovie>>> {
    let movies = state.provider.search_by_text(&params.q).await?;
    Ok(Json(movies))
}

/// Handler for GET /genres
///
/// Fails soft: an unreachable provider yields an empty list.
pub async fn genres(State(state): State<Arc<AppState>>) -> Json<Vec<Genre>> {
    let genres = state.provider.list_genres().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, provider = state.provider.name(), "Genre list unavailable");
        Vec::new()
    });
    Json(genres)
}
