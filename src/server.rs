//! Analytical HTTP API.
//!
//! Four read-only GET endpoints over the transformed tables, plus a health
//! check. Each request runs its own query on the shared pool; there is no
//! cross-request mutable state.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/reports/top-products` | Most frequent terms across all messages |
//! | `GET`  | `/api/channels/{channel_name}/activity` | Daily activity for one channel |
//! | `GET`  | `/api/search/messages` | Keyword search over message text |
//! | `GET`  | `/api/reports/visual-content` | Per-channel image usage and categories |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Error responses share one shape:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "limit must be between 1 and 100" } }
//! ```
//!
//! Codes: `bad_request` (400), `not_found` (404), `internal` (500).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::queries;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    pool: PgPool,
    config: Arc<Config>,
}

/// Start the API server on the configured bind address. Runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect().await?;

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/reports/top-products", get(handle_top_products))
        .route(
            "/api/channels/{channel_name}/activity",
            get(handle_channel_activity),
        )
        .route("/api/search/messages", get(handle_search_messages))
        .route("/api/reports/visual-content", get(handle_visual_content))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    info!(bind = %config.server.bind, "API server listening");

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

/// Anything that is not a validation or not-found condition — database
/// unavailable, broken marts contract — surfaces as a 500.
fn internal(err: anyhow::Error) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: err.to_string(),
    }
}

/// Result-row limits are bounded to [1, 100] everywhere they appear.
fn validate_limit(limit: Option<i64>, default: i64) -> Result<i64, AppError> {
    let limit = limit.unwrap_or(default);
    if !(1..=100).contains(&limit) {
        return Err(bad_request("limit must be between 1 and 100"));
    }
    Ok(limit)
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /api/reports/top-products ============

#[derive(Deserialize)]
struct TopProductsParams {
    limit: Option<i64>,
}

async fn handle_top_products(
    State(state): State<AppState>,
    Query(params): Query<TopProductsParams>,
) -> Result<Json<Vec<queries::TermCount>>, AppError> {
    let limit = validate_limit(params.limit, 10)?;

    let terms = queries::top_terms(
        &state.pool,
        &state.config.warehouse.marts_schema,
        limit as usize,
    )
    .await
    .map_err(internal)?;

    Ok(Json(terms))
}

// ============ GET /api/channels/{channel_name}/activity ============

async fn handle_channel_activity(
    State(state): State<AppState>,
    Path(channel_name): Path<String>,
) -> Result<Json<Vec<queries::ChannelActivity>>, AppError> {
    if channel_name.trim().is_empty() {
        return Err(bad_request("channel_name must not be empty"));
    }

    let activity = queries::channel_activity(
        &state.pool,
        &state.config.warehouse.marts_schema,
        &channel_name,
    )
    .await
    .map_err(internal)?;

    if activity.is_empty() {
        return Err(not_found("Channel not found or no data"));
    }

    Ok(Json(activity))
}

// ============ GET /api/search/messages ============

#[derive(Deserialize)]
struct SearchParams {
    query: Option<String>,
    limit: Option<i64>,
}

async fn handle_search_messages(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<queries::MessageHit>>, AppError> {
    let query = params.query.unwrap_or_default();
    if query.is_empty() {
        return Err(bad_request("query must not be empty"));
    }

    let limit = validate_limit(params.limit, 20)?;

    let hits = queries::search_messages(
        &state.pool,
        &state.config.warehouse.marts_schema,
        &query,
        limit,
    )
    .await
    .map_err(internal)?;

    Ok(Json(hits))
}

// ============ GET /api/reports/visual-content ============

async fn handle_visual_content(
    State(state): State<AppState>,
) -> Result<Json<Vec<queries::VisualContentStats>>, AppError> {
    let stats = queries::visual_content(&state.pool, &state.config.warehouse.marts_schema)
        .await
        .map_err(internal)?;

    Ok(Json(stats))
}
