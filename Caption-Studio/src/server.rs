//! Axum-based HTTP surface for the studio.
//!
//! Ownership comes from the `X-Owner-Id` request header. Requests without it
//! act as the single-user owner.

use crate::error::StudioError;
use crate::studio::CaptionStudio;
use axum::{
    extract::{DefaultBodyLimit, Json, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub const OWNER_HEADER: &str = "x-owner-id";

/// Uploads above this size are rejected before reaching a handler.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

type AppState = Arc<CaptionStudio>;

/// Build the router over a shared studio.
pub fn router(studio: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/caption", post(caption_handler))
        .route("/records", get(list_handler))
        .route("/records/:id", get(get_handler).delete(delete_handler))
        .route("/records/:id/report.pdf", get(report_handler))
        .route("/records/:id/bundle.zip", get(bundle_handler))
        .route("/records/:id/ask", post(ask_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(studio)
}

/// Bind to the configured address and serve until the process stops.
pub async fn serve(studio: CaptionStudio) -> anyhow::Result<()> {
    let addr = format!("{}:{}", studio.config().server.host, studio.config().server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;

    info!(addr = %addr, "Caption studio listening");

    axum::serve(listener, router(Arc::new(studio)))
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for StudioError {
    fn into_response(self) -> Response {
        let status = match &self {
            StudioError::NotFound(_) => StatusCode::NOT_FOUND,
            StudioError::Forbidden(_) => StatusCode::FORBIDDEN,
            StudioError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            StudioError::Vision(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Run a synchronous studio call (SQLite, file I/O, PDF or ZIP encoding) on
/// the blocking pool.
async fn blocking<T, F>(studio: &AppState, call: F) -> Result<T, StudioError>
where
    T: Send + 'static,
    F: FnOnce(&CaptionStudio) -> Result<T, StudioError> + Send + 'static,
{
    let studio = Arc::clone(studio);
    tokio::task::spawn_blocking(move || call(&studio)).await?
}

fn owner(headers: &HeaderMap) -> Option<String> {
    headers
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn attachment(content_type: &str, filename: String, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
        .into_response()
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn caption_handler(
    State(studio): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, StudioError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StudioError::InvalidInput(e.to_string()))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().unwrap_or("upload.jpg").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| StudioError::InvalidInput(e.to_string()))?;
            upload = Some((filename, bytes));
            break;
        }
    }

    let (filename, bytes) =
        upload.ok_or_else(|| StudioError::InvalidInput("missing multipart field 'image'".to_string()))?;

    let record = studio
        .capture(&bytes, &filename, owner(&headers).as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

async fn list_handler(
    State(studio): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, StudioError> {
    let owner = owner(&headers);
    let records = blocking(&studio, move |s| s.history(owner.as_deref())).await?;
    Ok(Json(records).into_response())
}

async fn get_handler(
    State(studio): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, StudioError> {
    let owner = owner(&headers);
    let record = blocking(&studio, move |s| s.record(&id, owner.as_deref())).await?;
    Ok(Json(record).into_response())
}

async fn delete_handler(
    State(studio): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, StudioError> {
    let owner = owner(&headers);
    blocking(&studio, move |s| s.delete(&id, owner.as_deref())).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn report_handler(
    State(studio): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, StudioError> {
    let owner = owner(&headers);
    let filename = format!("report_{}.pdf", id);
    let pdf = blocking(&studio, move |s| s.report(&id, owner.as_deref())).await?;
    Ok(attachment("application/pdf", filename, pdf))
}

async fn bundle_handler(
    State(studio): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, StudioError> {
    let owner = owner(&headers);
    let filename = format!("bundle_{}.zip", id);
    let zip = blocking(&studio, move |s| s.bundle(&id, owner.as_deref())).await?;
    Ok(attachment("application/zip", filename, zip))
}

async fn ask_handler(
    State(studio): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, StudioError> {
    let answer = studio
        .ask(&id, owner(&headers).as_deref(), &request.question)
        .await?;
    Ok(Json(AskResponse { answer }))
}
