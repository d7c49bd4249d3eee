use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use notesum_pipeline::{ErrorKind, PipelineError};

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// The model service failed or misbehaved.
    BadGateway(String),
    /// The query failed; the driver message is passed through.
    QueryFailed(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::QueryFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        let message = e.to_string();
        match e.kind() {
            ErrorKind::NotFound | ErrorKind::NoData => ApiError::NotFound(message),
            ErrorKind::InvalidInput => ApiError::BadRequest(message),
            ErrorKind::Upstream => ApiError::BadGateway(message),
            ErrorKind::Internal => ApiError::QueryFailed(message),
        }
    }
}

impl From<notesum_templates::error::TemplateError> for ApiError {
    fn from(e: notesum_templates::error::TemplateError) -> Self {
        ApiError::NotFound(e.to_string())
    }
}

impl From<notesum_store::error::StoreError> for ApiError {
    fn from(e: notesum_store::error::StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<notesum_export::error::ExportError> for ApiError {
    fn from(e: notesum_export::error::ExportError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}
