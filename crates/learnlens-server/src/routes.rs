//! HTTP routes
//!
//! One query endpoint backed by the analytics service, four read endpoints
//! that expose the aggregates directly, and a health check. Detailed upstream
//! failures are logged with their error code but collapsed into a generic
//! message at this boundary; only input validation surfaces verbatim.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use learnlens_core::service::{AnalyticsService, QueryAnswer, TurnHistory};
use learnlens_core::Error;

/// Shared state behind every handler
pub struct AppState {
    pub service: AnalyticsService,
    /// Conversation history for the query endpoint, shared across requests
    pub history: tokio::sync::Mutex<TurnHistory>,
}

impl AppState {
    pub fn new(service: AnalyticsService, history: TurnHistory) -> Self {
        Self {
            service,
            history: tokio::sync::Mutex::new(history),
        }
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/query", post(query))
        .route("/api/analytics/badges", get(badge_enrollments))
        .route("/api/analytics/trends", get(organization_trends))
        .route("/api/analytics/completion", get(completion_metrics))
        .route("/api/analytics/paths", get(learning_paths))
        .route("/api/health", get(health))
        .with_state(state)
}

/// Error wrapper that shapes core errors into HTTP responses
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            Error::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            err => {
                error!(code = err.code(), error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryAnswer>, ApiError> {
    let request_id = Uuid::new_v4();
    info!(%request_id, query_chars = request.query.len(), "Query received");

    let mut history = state.history.lock().await;
    let answer = state.service.answer(&request.query, &mut history).await?;

    info!(%request_id, "Query answered");
    Ok(Json(answer))
}

#[derive(Debug, Deserialize)]
pub struct BadgeParams {
    pub badge: Option<String>,
}

async fn badge_enrollments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BadgeParams>,
) -> Result<Response, ApiError> {
    let report = state
        .service
        .engine()
        .badge_enrollments(params.badge.as_deref())
        .await?;
    Ok(Json(report).into_response())
}

#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub organization: Option<String>,
}

async fn organization_trends(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendParams>,
) -> Result<Response, ApiError> {
    let report = state
        .service
        .engine()
        .organization_trends(params.organization.as_deref())
        .await?;
    Ok(Json(report).into_response())
}

async fn completion_metrics(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let report = state.service.engine().completion_metrics().await?;
    Ok(Json(report).into_response())
}

async fn learning_paths(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let report = state.service.engine().learning_paths().await?;
    Ok(Json(report).into_response())
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    match state.service.engine().db().health_check().await {
        Ok(()) => Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        }))
        .into_response(),
        Err(err) => {
            error!(error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnlens_core::config::Config;
    use learnlens_core::llm::LlmClient;
    use learnlens_core::storage::Database;

    async fn test_state() -> Arc<AppState> {
        let db = Database::in_memory().await.unwrap();
        let llm = LlmClient::new(Config::default().llm, "test-key").unwrap();
        let service = AnalyticsService::new(db, llm);
        Arc::new(AppState::new(service, TurnHistory::default()))
    }

    #[tokio::test]
    async fn test_router_builds() {
        let state = test_state().await;
        let _router = router(state);
    }

    #[test]
    fn test_query_request_defaults_to_empty() {
        let request: QueryRequest = serde_json::from_str("{}").unwrap();
        assert!(request.query.is_empty());

        let request: QueryRequest = serde_json::from_str(r#"{"query": "trends"}"#).unwrap();
        assert_eq!(request.query, "trends");
    }

    #[test]
    fn test_invalid_input_surfaces_as_bad_request() {
        let response =
            ApiError(Error::InvalidInput("No query provided".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_errors_collapse_to_internal_error() {
        let response = ApiError(Error::Llm("model exploded".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ApiError(Error::RateLimited(30)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_read_endpoints_on_empty_database() {
        let state = test_state().await;

        let report = state.service.engine().badge_enrollments(None).await.unwrap();
        assert!(report.data.is_empty());

        let report = state.service.engine().completion_metrics().await.unwrap();
        assert!(report.data.is_empty());
    }
}
