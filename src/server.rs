//! HTTP API server.
//!
//! Thin request/response mapping over the core record operations, filter
//! engine, and natural-language interpreter. The store is injected, so the
//! same router serves SQLite in production and an in-memory store in tests.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/health` | Health check (version and record count) |
//! | `POST`   | `/strings` | Analyze and store `{"value": "..."}` |
//! | `GET`    | `/strings` | List records, filtered by query parameters |
//! | `GET`    | `/strings/filter-by-natural-language` | Filter with `?query=<text>` |
//! | `GET`    | `/strings/{identifier}` | Fetch one record by hash (or raw value) |
//! | `DELETE` | `/strings/{identifier}` | Delete one record |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "conflict", "message": "string already exists in the system: ..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `invalid_criteria` (400),
//! `unparseable_query` (400), `not_found` (404), `conflict` (409),
//! `unprocessable_entity` (422), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use string_analyzer_core::filter::{self, Criteria};
use string_analyzer_core::models::AnalyzedRecord;
use string_analyzer_core::nl::{self, NaturalLanguageOutcome};
use string_analyzer_core::records::{self, RecordOptions};
use string_analyzer_core::store::Store;
use string_analyzer_core::Error;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Store>,
    options: RecordOptions,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, options: RecordOptions) -> Self {
        Self { store, options }
    }
}

/// Starts the HTTP server against the configured SQLite database.
///
/// Runs migrations first, then binds to `[server].bind`. Runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(config).await?);
    run_server_with_store(config, store).await
}

/// Starts the HTTP server with an explicit store backend.
pub async fn run_server_with_store(config: &Config, store: Arc<dyn Store>) -> anyhow::Result<()> {
    let state = AppState::new(store, config.api.record_options());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the API router.
///
/// The natural-language route is registered ahead of the detail route so
/// the free-text endpoint is never read as an identifier.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/strings/filter-by-natural-language",
            get(handle_natural_language),
        )
        .route("/strings", get(handle_list).post(handle_create))
        .route(
            "/strings/{identifier}",
            get(handle_get).delete(handle_delete),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
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

/// Error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn unprocessable(message: impl Into<String>) -> AppError {
    AppError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        "unprocessable_entity",
        message,
    )
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        match err {
            Error::InvalidInput(_) => bad_request(message),
            Error::InvalidCriteria(_) => {
                AppError::new(StatusCode::BAD_REQUEST, "invalid_criteria", message)
            }
            Error::UnparseableQuery(_) => {
                AppError::new(StatusCode::BAD_REQUEST, "unparseable_query", message)
            }
            Error::NotFound(_) => AppError::new(StatusCode::NOT_FOUND, "not_found", message),
            Error::Conflict { .. } => AppError::new(StatusCode::CONFLICT, "conflict", message),
            Error::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                AppError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal storage error",
                )
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    records: usize,
}

async fn handle_health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let records = state.store.count().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        records,
    }))
}

// ============ POST /strings ============

/// Extract `value` from the request body.
///
/// A missing field or non-object body is a 400; a present but non-string
/// value is a 422.
fn extract_value(body: &Value) -> Result<&str, AppError> {
    let obj = body
        .as_object()
        .ok_or_else(|| bad_request("request body must be a JSON object"))?;
    match obj.get("value") {
        None | Some(Value::Null) => Err(bad_request("missing 'value' field")),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(unprocessable("invalid data type for 'value': must be a string")),
    }
}

async fn handle_create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<AnalyzedRecord>), AppError> {
    let Json(body) = body.map_err(|e| bad_request(format!("invalid request body: {}", e)))?;
    let value = extract_value(&body)?;

    let record = records::create_record(state.store.as_ref(), value, &state.options)
        .await
        .inspect_err(|e| {
            if let Error::Conflict { id } = e {
                tracing::debug!(id = %id, "duplicate string rejected");
            }
        })?;

    tracing::info!(
        id = %record.id,
        length = record.properties.length,
        is_palindrome = record.properties.is_palindrome,
        "string stored"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

// ============ GET /strings ============

#[derive(Serialize)]
struct ListResponse {
    data: Vec<AnalyzedRecord>,
    count: usize,
    filters_applied: Criteria,
}

async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListResponse>, AppError> {
    let criteria = Criteria::from_params(&params)?;
    let outcome = filter::apply(state.store.as_ref(), &criteria).await?;
    Ok(Json(ListResponse {
        data: outcome.records,
        count: outcome.count,
        filters_applied: criteria,
    }))
}

// ============ GET /strings/filter-by-natural-language ============

async fn handle_natural_language(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<NaturalLanguageOutcome>, AppError> {
    let query = params
        .get("query")
        .ok_or_else(|| bad_request("missing 'query' parameter"))?;

    let outcome = nl::filter_by_natural_language(state.store.as_ref(), query).await?;
    tracing::debug!(
        query = %query,
        rules = ?outcome.interpreted_query.matched_rules,
        count = outcome.count,
        "natural language query interpreted"
    );
    Ok(Json(outcome))
}

// ============ GET/DELETE /strings/{identifier} ============

async fn handle_get(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<AnalyzedRecord>, AppError> {
    let record = records::get_record(state.store.as_ref(), &identifier, &state.options).await?;
    Ok(Json(record))
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = records::delete_record(state.store.as_ref(), &identifier, &state.options).await?;
    tracing::info!(id = %id, "string deleted");
    Ok(StatusCode::NO_CONTENT)
}
