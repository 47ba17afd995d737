//! HTTP surface: deck generation and health.

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use deck_core::FeedbackPayload;
use deck_pptx::ReportBuilder;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// MIME type of a .pptx file.
const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    builder: Arc<ReportBuilder>,
}

impl AppState {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            builder: Arc::new(ReportBuilder::new(template_path)),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate-pptx", post(generate_pptx))
        .route("/health", get(health))
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        message: "deck generator is alive",
    })
}

/// Render a feedback payload into a deck and answer with the file.
///
/// The body is taken as a raw JSON value so that shape problems surface
/// as the same validation errors the intake frontend already shows, not
/// as deserialization noise. Validation failures are 400; template and
/// renderer faults are 500 and logged here.
async fn generate_pptx(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let payload = FeedbackPayload::from_value(body).map_err(error_response)?;
    let report = state.builder.build(&payload).map_err(error_response)?;

    tracing::info!(
        slides = report.slide_count,
        bytes = report.bytes.len(),
        "generated {}",
        report.filename
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(PPTX_CONTENT_TYPE),
    );
    if let Ok(value) = HeaderValue::from_str(&content_disposition(&report.filename)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok((headers, report.bytes).into_response())
}

/// Map a generation failure onto its response.
fn error_response(err: deck_core::Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!("deck generation failed: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// `Content-Disposition` value with an ASCII fallback name plus the RFC
/// 5987 `filename*` form browsers pick up for the Arabic name.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        percent_encode(filename)
    )
}

/// Percent-encode every byte outside the RFC 3986 unreserved set.
fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() * 3);
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
