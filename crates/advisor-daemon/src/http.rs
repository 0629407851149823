//! HTTP serving layer.
//!
//! Routes:
//! - `POST /recommend` `{goal, top_k?}` returns `{status, user_goal, data}`
//! - `GET /health` reports engine readiness
//!
//! Recommendation work is CPU bound (query embedding plus a scan of the
//! index), so handlers run it on the blocking pool.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use advisor_engine::{AdvisorEngine, EngineError, EngineState, EngineStatus};
use advisor_types::Recommendation;

#[derive(Clone)]
pub struct AppState {
    engine: Arc<AdvisorEngine>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub goal: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub status: &'static str,
    pub user_goal: String,
    pub data: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: EngineState,
    pub ready: bool,
    pub courses: usize,
    pub dimension: usize,
    pub model: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<EngineStatus> for HealthResponse {
    fn from(status: EngineStatus) -> Self {
        Self {
            status: status.state,
            ready: status.ready,
            courses: status.courses,
            dimension: status.dimension,
            model: status.model,
            loaded_at: status.loaded_at,
            error: status.error,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn error_response(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            status: "error",
            detail: detail.into(),
        }),
    )
}

fn engine_error(err: EngineError) -> ApiError {
    let status = match &err {
        EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        EngineError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!(kind = err.kind(), error = %err, "Recommendation failed");
    }
    error_response(status, err.to_string())
}

/// Build the application router around a shared engine.
pub fn router(engine: Arc<AdvisorEngine>) -> Router {
    Router::new()
        .route("/recommend", post(recommend_handler))
        .route("/health", get(health_handler))
        .with_state(AppState { engine })
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn recommend_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let Json(request) = payload
        .map_err(|rejection| error_response(StatusCode::BAD_REQUEST, rejection.body_text()))?;
    let engine = state.engine.clone();
    let top_k = request
        .top_k
        .unwrap_or(engine.matcher_settings().default_top_k);
    let goal = request.goal.clone();

    let data = tokio::task::spawn_blocking(move || engine.recommend(&goal, top_k))
        .await
        .map_err(|e| {
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("recommendation task failed: {e}"),
            )
        })?
        .map_err(engine_error)?;

    Ok(Json(RecommendResponse {
        status: "success",
        user_goal: request.goal,
        data,
    }))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.engine.status().into())
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(addr: SocketAddr, engine: Arc<AdvisorEngine>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server shutdown")?;
    Ok(())
}
