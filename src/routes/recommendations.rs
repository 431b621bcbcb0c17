use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{FilterCriteria, ScoredMovie},
    routes::AppState,
    services::RecommendationInput,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub input: RecommendationInput,
}

/// Filters for the user-store backed endpoint
///
/// `genres` and `services` are comma-separated lists.
#[derive(Debug, Default, Deserialize)]
pub struct UserRecommendationQuery {
    pub genres: Option<String>,
    pub services: Option<String>,
    pub min_rating: Option<f64>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

impl From<UserRecommendationQuery> for FilterCriteria {
    fn from(query: UserRecommendationQuery) -> Self {
        let year_range = match (query.year_from, query.year_to) {
            (None, None) => None,
            (from, to) => Some((from.unwrap_or(i32::MIN), to.unwrap_or(i32::MAX))),
        };
        FilterCriteria {
            genres: split_list(query.genres.as_deref()),
            services: split_list(query.services.as_deref()),
            min_rating: query.min_rating,
            year_range,
        }
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Primary,
    Fallback,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub source: RecommendationSource,
    pub movies: Vec<ScoredMovie>,
}

/// Handler for POST /recommendations
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %request.user_id,
        watched = request.input.watched.len(),
        watchlist = request.input.watchlist.len(),
        "Processing recommendation request"
    );

    let response = recommend_with_fallback(&state, &request.user_id, &request.input).await?;
    Ok(Json(response))
}

/// Handler for GET /users/:user_id/recommendations
pub async fn recommend_for_user(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Query(query): Query<UserRecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let store = state
        .user_store
        .as_ref()
        .ok_or_else(|| AppError::NotConfigured("user store".to_string()))?;

    let snapshot = store.load_snapshot(&user_id).await?;
    let input = RecommendationInput {
        watched: snapshot.watch_history(),
        preferences: snapshot.preferences,
        watchlist: snapshot.watchlist,
        filters: FilterCriteria::from(query),
    };

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        watched = input.watched.len(),
        watchlist = input.watchlist.len(),
        "Processing stored-user recommendation request"
    );

    let response = recommend_with_fallback(&state, &user_id, &input).await?;
    Ok(Json(response))
}

/// Live recommendations, or the ranked fallback catalog when they are
/// unavailable or empty and a catalog is configured
async fn recommend_with_fallback(
    state: &AppState,
    user_id: &str,
    input: &RecommendationInput,
) -> AppResult<RecommendationResponse> {
    let outcome = state.recommendations.recommend(user_id, input).await;
    let has_catalog = !state.fallback_catalog.is_empty();

    match outcome {
        Ok(movies) if !movies.is_empty() || !has_catalog => Ok(RecommendationResponse {
            source: RecommendationSource::Primary,
            movies,
        }),
        Err(AppError::RecommendationUnavailable(reason)) if !has_catalog => {
            Err(AppError::RecommendationUnavailable(reason))
        }
        Ok(_) | Err(AppError::RecommendationUnavailable(_)) => {
            tracing::warn!(user_id = %user_id, "Serving fallback catalog");
            let movies = state
                .recommendations
                .rank_fallback(user_id, &state.fallback_catalog, input);
            Ok(RecommendationResponse {
                source: RecommendationSource::Fallback,
                movies,
            })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{user_store::MockUserStore, UserStore},
        models::{CandidateMovie, UserSnapshot},
        routes::create_router,
        services::{
            providers::{MetadataProvider, MockMetadataProvider},
            CandidateFetcher, CandidateSettings, FallbackScorer, FixedClock, PrimaryScorer,
            ProfileLimits, RecommendationService,
        },
    };
    use axum_test::TestServer;
    use serde_json::Value;

    fn server(provider: MockMetadataProvider, store: MockUserStore) -> TestServer {
        let provider: Arc<dyn MetadataProvider> = Arc::new(provider);
        let clock = Arc::new(FixedClock(2026));
        let state = AppState {
            recommendations: RecommendationService::new(
                CandidateFetcher::new(provider.clone(), CandidateSettings::default()),
                Arc::new(PrimaryScorer::new(clock.clone())),
                Arc::new(FallbackScorer::new(clock)),
                ProfileLimits::default(),
            ),
            provider,
            user_store: Some(Arc::new(store) as Arc<dyn UserStore>),
            fallback_catalog: Arc::new(Vec::new()),
        };
        TestServer::new(create_router(Arc::new(state))).unwrap()
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_name().return_const("mock");
        let mut store = MockUserStore::new();
        store
            .expect_load_snapshot()
            .returning(|_| Err(AppError::Internal("connection reset".to_string())));

        let response = server(provider, store)
            .get("/api/v1/users/u-1/recommendations")
            .await;
        response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_stored_watchlist_is_excluded() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_is_configured().return_const(true);
        provider.expect_name().return_const("mock");
        provider.expect_list_genres().returning(|| Ok(Vec::new()));
        provider.expect_search_by_genre().returning(|_| Ok(Vec::new()));
        provider.expect_search_by_text().returning(|_| Ok(Vec::new()));
        provider.expect_trending().returning(|| {
            Ok(vec![
                CandidateMovie::new(1u64, "Queued"),
                CandidateMovie::new(2u64, "Fresh"),
            ])
        });

        let mut store = MockUserStore::new();
        store
            .expect_load_snapshot()
            .times(1)
            .returning(|_| {
                Ok(UserSnapshot {
                    watchlist: vec![CandidateMovie::new(1u64, "Queued").into()],
                    ..Default::default()
                })
            });

        let response = server(provider, store)
            .get("/api/v1/users/u-1/recommendations")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["movies"].as_array().unwrap().len(), 1);
        assert_eq!(body["movies"][0]["id"], "2");
    }

    #[test]
    fn test_query_to_filters() {
        let query = UserRecommendationQuery {
            genres: Some("Drama, Comedy,,".to_string()),
            services: None,
            min_rating: Some(7.0),
            year_from: Some(1990),
            year_to: None,
        };
        let filters = FilterCriteria::from(query);

        assert_eq!(filters.genres, vec!["Drama", "Comedy"]);
        assert!(filters.services.is_empty());
        assert_eq!(filters.min_rating, Some(7.0));
        assert_eq!(filters.year_range, Some((1990, i32::MAX)));
    }

    #[test]
    fn test_empty_query_has_no_filters() {
        let filters = FilterCriteria::from(UserRecommendationQuery::default());
        assert_eq!(filters, FilterCriteria::default());
    }
}
