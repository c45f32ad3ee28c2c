//! HTTP API server.
//!
//! Exposes catalog ingestion and shopping-list comparison as a JSON HTTP
//! API. Money is always integer cents.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/upload?supermarket=ID` | Ingest a price-list document (raw body, `Content-Type` header) |
//! | `POST` | `/api/compare` | Compare a shopping list |
//! | `POST` | `/api/compare/summary` | Compare a shopping list and total the savings |
//! | `GET`  | `/api/supermarkets` | List known supermarkets |
//! | `GET`  | `/api/products/{supermarket}` | List one supermarket's catalog |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "shopping list must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `timeout` (408), `payload_too_large`
//! (413), `extraction_failed` (422), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection},
        DefaultBodyLimit, Path, Query, State,
    },
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::compare::compare;
use crate::config::Config;
use crate::error::{CompareError, IngestError};
use crate::ingest::{commit, prepare, IngestReport};
use crate::models::{ComparisonResult, PriceRecord, ShoppingItem};
use crate::savings::total_savings;
use crate::store::{self, CatalogStore};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<dyn CatalogStore>,
}

/// Starts the HTTP server on `[server].bind` with the configured store backend.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = store::open(config).await?;
    run_server_with_store(config, store).await
}

/// Like [`run_server`], but serves an already-open catalog.
pub async fn run_server_with_store(
    config: &Config,
    store: Arc<dyn CatalogStore>,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(Arc::new(config.clone()), store);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "price server listening");
    println!("Price server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router.
pub fn router(config: Arc<Config>, store: Arc<dyn CatalogStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = config.server.max_upload_bytes;
    let state = AppState { config, store };

    Router::new()
        .route("/api/upload", post(handle_upload))
        .route("/api/compare", post(handle_compare))
        .route("/api/compare/summary", post(handle_compare_summary))
        .route("/api/supermarkets", get(handle_supermarkets))
        .route("/api/products/{supermarket}", get(handle_products))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(body_limit))
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
    /// Machine-readable error code (e.g., `"bad_request"`, `"timeout"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
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

fn app_error(status: StatusCode, code: &str, message: impl Into<String>) -> AppError {
    AppError {
        status,
        code: code.to_string(),
        message: message.into(),
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    app_error(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn timeout_error(message: impl Into<String>) -> AppError {
    app_error(StatusCode::REQUEST_TIMEOUT, "timeout", message)
}

fn internal(err: impl std::fmt::Display) -> AppError {
    error!(error = %err, "request failed");
    app_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        err.to_string(),
    )
}

impl From<CompareError> for AppError {
    fn from(err: CompareError) -> Self {
        match err {
            CompareError::Validation(e) => bad_request(e.to_string()),
            CompareError::Store(e) => internal(format!("{:#}", e)),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::MissingSupermarket => bad_request(err.to_string()),
            IngestError::Extraction(e) => app_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "extraction_failed",
                e.to_string(),
            ),
            IngestError::Store(e) => internal(format!("{:#}", e)),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            app_error(
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                rejection.body_text(),
            )
        } else {
            bad_request(rejection.body_text())
        }
    }
}

/// Bounds a request by `[server].request_timeout_secs`; a late result is discarded.
async fn with_timeout<T>(
    state: &AppState,
    what: &str,
    fut: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    let secs = state.config.server.request_timeout_secs;
    match tokio::time::timeout(Duration::from_secs(secs), fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(request = what, timeout_secs = secs, "request timed out");
            Err(timeout_error(format!("{} timed out after {}s", what, secs)))
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/upload ============

#[derive(Deserialize)]
struct UploadParams {
    supermarket: Option<String>,
}

/// Handler for `POST /api/upload?supermarket=ID`.
///
/// Extraction runs on a blocking thread; the catalog is written only when
/// the whole document was extracted.
async fn handle_upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<IngestReport>, AppError> {
    let body = body?;
    let supermarket = params
        .supermarket
        .ok_or_else(|| bad_request("missing query parameter: supermarket"))?;
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| bad_request("missing Content-Type header"))?
        .to_string();

    let opts = state.config.extraction.options();
    let store = state.store.clone();
    let report = with_timeout(&state, "upload", async move {
        let prepared = tokio::task::spawn_blocking(move || {
            prepare(&body, &content_type, &supermarket, &opts, Utc::now())
        })
        .await
        .map_err(internal)??;
        Ok::<_, AppError>(commit(store.as_ref(), prepared).await.map_err(IngestError::from)?)
    })
    .await?;

    Ok(Json(report))
}

// ============ POST /api/compare ============

/// Handler for `POST /api/compare`.
async fn handle_compare(
    State(state): State<AppState>,
    items: Result<Json<Vec<ShoppingItem>>, JsonRejection>,
) -> Result<Json<Vec<ComparisonResult>>, AppError> {
    let Json(items) = items?;
    let results = run_compare(&state, &items).await?;
    Ok(Json(results))
}

#[derive(Serialize)]
struct SummaryResponse {
    results: Vec<ComparisonResult>,
    /// Estimated savings over the whole list, in cents.
    total_savings: i64,
}

/// Handler for `POST /api/compare/summary`.
async fn handle_compare_summary(
    State(state): State<AppState>,
    items: Result<Json<Vec<ShoppingItem>>, JsonRejection>,
) -> Result<Json<SummaryResponse>, AppError> {
    let Json(items) = items?;
    let results = run_compare(&state, &items).await?;
    let total_savings = total_savings(&results);
    Ok(Json(SummaryResponse {
        results,
        total_savings,
    }))
}

async fn run_compare(
    state: &AppState,
    items: &[ShoppingItem],
) -> Result<Vec<ComparisonResult>, AppError> {
    let threshold = state.config.matching.fuzzy_threshold;
    with_timeout(state, "compare", async {
        Ok::<_, AppError>(compare(state.store.as_ref(), items, threshold).await?)
    })
    .await
}

// ============ GET /api/supermarkets ============

#[derive(Serialize)]
struct SupermarketsResponse {
    supermarkets: Vec<String>,
    count: usize,
}

async fn handle_supermarkets(
    State(state): State<AppState>,
) -> Result<Json<SupermarketsResponse>, AppError> {
    let store = state.store.clone();
    let supermarkets: Vec<String> = with_timeout(&state, "supermarkets", async move {
        store.supermarkets().await.map_err(internal)
    })
    .await?
    .into_iter()
    .collect();
    Ok(Json(SupermarketsResponse {
        count: supermarkets.len(),
        supermarkets,
    }))
}

// ============ GET /api/products/{supermarket} ============

#[derive(Serialize)]
struct ProductsResponse {
    supermarket: String,
    products: Vec<PriceRecord>,
    count: usize,
}

/// Handler for `GET /api/products/{supermarket}`.
///
/// An unknown supermarket yields an empty listing.
async fn handle_products(
    State(state): State<AppState>,
    Path(supermarket): Path<String>,
) -> Result<Json<ProductsResponse>, AppError> {
    let store = state.store.clone();
    let products = with_timeout(&state, "products", async {
        store.products(&supermarket).await.map_err(internal)
    })
    .await?;
    Ok(Json(ProductsResponse {
        count: products.len(),
        supermarket,
        products,
    }))
}
