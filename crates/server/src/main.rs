// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::State as AxumState,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use porteiro::{EngineError, ValidationEngine};
use porteiro_cache::LocalValidationCache;
use porteiro_domain::{ValidationHistoryEntry, ValidationResult, ValidationStats};
use porteiro_import::ImportError;
use porteiro_store::{MemoryRemote, RemoteTicketStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

mod live;

/// The engine instantiation this binary serves.
type Engine = ValidationEngine<RemoteTicketStore<MemoryRemote>>;

/// Porteiro Server - HTTP server for the Porteiro ticket validation system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the local validation cache file.
    #[arg(short, long, default_value = "porteiro-cache.json")]
    cache: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The validation engine over the ticket store and device cache.
    engine: Arc<Engine>,
}

/// API request for validating a QR code.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ValidateRequest {
    /// The scanned or manually entered QR code.
    qr_code: String,
}

/// API response for CSV imports.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ImportResponse {
    /// Success indicator.
    success: bool,
    /// Number of CSV rows processed (duplicates included).
    rows_processed: usize,
    /// Number of unique tickets now in the active set.
    total_tickets: usize,
}

/// API response for the ticket count endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CountResponse {
    /// Number of tickets in the active set.
    count: usize,
}

/// API response for the clear endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClearResponse {
    /// Success indicator.
    success: bool,
    /// A confirmation message.
    message: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<EngineError> for HttpError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::EmptyCode | EngineError::Scan(_) => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            },
            EngineError::Store(StoreError::Unavailable(_)) => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: err.to_string(),
            },
            EngineError::Cache(_) => {
                error!(error = %err, "Cache error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: err.to_string(),
                }
            }
        }
    }
}

impl From<ImportError> for HttpError {
    fn from(err: ImportError) -> Self {
        let status: StatusCode = match err {
            ImportError::Parse(_) => StatusCode::BAD_REQUEST,
            ImportError::MissingRequiredColumn { .. } | ImportError::EmptyInput => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Handler for POST `/api/import` endpoint.
///
/// Parses the CSV request body and replaces the active ticket set.
/// Parsing completes before any destructive store operation, so a bad
/// file leaves the previous set intact.
async fn handle_import(
    AxumState(app_state): AxumState<AppState>,
    body: String,
) -> Result<Json<ImportResponse>, HttpError> {
    info!(bytes = body.len(), "Handling import request");

    let rows = porteiro_import::parse_and_normalize(&body)?;
    let rows_processed: usize = app_state.engine.import(rows).await?;
    let total_tickets: usize = app_state.engine.total_tickets().await?;

    info!(rows_processed, total_tickets, "Import complete");

    Ok(Json(ImportResponse {
        success: true,
        rows_processed,
        total_tickets,
    }))
}

/// Handler for POST `/api/validate` endpoint.
async fn handle_validate(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ValidationResult>, HttpError> {
    info!(qr_code = %req.qr_code, "Handling validate request");

    let result: ValidationResult = app_state.engine.validate(&req.qr_code).await?;

    Ok(Json(result))
}

/// Handler for GET `/api/history` endpoint.
///
/// Returns the validation history, newest first.
async fn handle_history(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<ValidationHistoryEntry>>, HttpError> {
    let history: Vec<ValidationHistoryEntry> = app_state.engine.validation_history().await?;
    Ok(Json(history))
}

/// Handler for GET `/api/stats` endpoint.
async fn handle_stats(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<ValidationStats>, HttpError> {
    let stats: ValidationStats = app_state.engine.validation_stats().await?;
    Ok(Json(stats))
}

/// Handler for GET `/api/tickets/count` endpoint.
async fn handle_count(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<CountResponse>, HttpError> {
    let count: usize = app_state.engine.total_tickets().await?;
    Ok(Json(CountResponse { count }))
}

/// Handler for GET `/api/sample.csv` endpoint.
///
/// Returns a downloadable CSV in the expected import format.
async fn handle_sample() -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sample.csv\"",
            ),
        ],
        porteiro_import::sample_csv(),
    )
        .into_response()
}

/// Handler for POST `/api/clear` endpoint.
///
/// Deletes all tickets, history, and cached entries. Irreversible.
async fn handle_clear(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<ClearResponse>, HttpError> {
    info!("Handling clear request");

    app_state.engine.clear().await?;

    Ok(Json(ClearResponse {
        success: true,
        message: String::from("All tickets and validation history deleted"),
    }))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/import", post(handle_import))
        .route("/api/validate", post(handle_validate))
        .route("/api/history", get(handle_history))
        .route("/api/stats", get(handle_stats))
        .route("/api/tickets/count", get(handle_count))
        .route("/api/sample.csv", get(handle_sample))
        .route("/api/clear", post(handle_clear))
        .route("/live", get(live::live_events_handler))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Porteiro Server");

    let cache: LocalValidationCache = LocalValidationCache::open(std::path::Path::new(&args.cache));
    let engine: Engine = ValidationEngine::new(RemoteTicketStore::new(MemoryRemote::new()), cache);

    let app_state: AppState = AppState {
        engine: Arc::new(engine),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use std::sync::atomic::{AtomicU64, Ordering};
    use tower::ServiceExt;

    static CACHE_COUNTER: AtomicU64 = AtomicU64::new(0);

    /// Helper to create test app state with a fresh engine and cache.
    fn create_test_app_state() -> AppState {
        let id: u64 = CACHE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "porteiro_server_test_{}_{id}.json",
            std::process::id()
        ));
        let cache: LocalValidationCache = LocalValidationCache::open(&path);
        AppState {
            engine: Arc::new(ValidationEngine::new(
                RemoteTicketStore::new(MemoryRemote::new()),
                cache,
            )),
        }
    }

    async fn import_sample(app: &Router) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/import")
                    .header("content-type", "text/csv")
                    .body(Body::from(porteiro_import::sample_csv()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
    }

    async fn validate(app: &Router, qr_code: &str) -> (HttpStatusCode, ValidationResult) {
        let req_body: ValidateRequest = ValidateRequest {
            qr_code: qr_code.to_string(),
        };
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/validate")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_string(&req_body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status: HttpStatusCode = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let result: ValidationResult = serde_json::from_slice(&body_bytes).unwrap();
        (status, result)
    }

    #[tokio::test]
    async fn test_import_then_validate_succeeds_once() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state);

        import_sample(&app).await;

        let (status, first) = validate(&app, "QR123456789").await;
        assert_eq!(status, HttpStatusCode::OK);
        assert!(first.success);
        assert_eq!(first.message, "Ingresso válido");

        let (status, second) = validate(&app, "QR123456789").await;
        assert_eq!(status, HttpStatusCode::OK);
        assert!(!second.success);
        assert!(second.message.starts_with("Ingresso já usado."));
    }

    #[tokio::test]
    async fn test_unknown_code_is_classified_not_errored() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state);

        import_sample(&app).await;

        let (status, result) = validate(&app, "QR000000000").await;
        assert_eq!(status, HttpStatusCode::OK);
        assert!(!result.success);
        assert_eq!(result.message, "Ingresso não encontrado");
    }

    #[tokio::test]
    async fn test_empty_code_is_bad_request() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state);

        let req_body: ValidateRequest = ValidateRequest {
            qr_code: String::from("   "),
        };
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/validate")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_string(&req_body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error_response: ErrorResponse = serde_json::from_slice(&body_bytes).unwrap();
        assert!(error_response.error);
    }

    #[tokio::test]
    async fn test_import_with_no_data_rows_is_unprocessable() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/import")
                    .header("content-type", "text/csv")
                    .body(Body::from("qr code\n"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_stats_and_count_reflect_validations() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state);

        import_sample(&app).await;
        validate(&app, "QR123456789").await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let stats: ValidationStats = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(stats.total, 3);
        // The sample set ships with one pre-used ticket.
        assert_eq!(stats.used, 2);
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.validation_count, 1);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/tickets/count")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let count: CountResponse = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(count.count, 3);
    }

    #[tokio::test]
    async fn test_history_records_validations_newest_first() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state);

        import_sample(&app).await;
        validate(&app, "QR123456789").await;
        validate(&app, "QR987654321").await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let history: Vec<ValidationHistoryEntry> = serde_json::from_slice(&body_bytes).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].qr_code, "QR987654321");
        assert_eq!(history[1].qr_code, "QR123456789");
    }

    #[tokio::test]
    async fn test_sample_csv_is_importable() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/sample.csv")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text: String = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert!(text.starts_with("ID,"));
        assert!(porteiro_import::parse_and_normalize(&text).is_ok());
    }

    #[tokio::test]
    async fn test_clear_empties_the_set() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state);

        import_sample(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/clear")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/tickets/count")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let count: CountResponse = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(count.count, 0);
    }

    #[tokio::test]
    async fn test_unreachable_store_is_service_unavailable() {
        let app_state: AppState = create_test_app_state();
        app_state.engine.store().client().set_unreachable(true);
        let app: Router = build_router(app_state);

        let req_body: ValidateRequest = ValidateRequest {
            qr_code: String::from("QR123456789"),
        };
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/validate")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_string(&req_body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::SERVICE_UNAVAILABLE);
    }
}
