use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::DocumentError;
use crate::llm_client::structured::ExtractionError;
use crate::web::FetchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Validation(format!("Malformed multipart body: {}", e.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Fetch(e @ FetchError::InvalidUrl { .. }) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Fetch(e) => {
                tracing::warn!("Fetch error: {e}");
                (StatusCode::BAD_GATEWAY, "FETCH_ERROR", e.to_string())
            }
            AppError::Extraction(ExtractionError::Template(e)) => {
                tracing::error!("Prompt template error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TEMPLATE_ERROR",
                    "A prompt template is misconfigured".to_string(),
                )
            }
            AppError::Extraction(ExtractionError::Model(e)) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Extraction(e @ ExtractionError::Parse { raw, .. }) => {
                tracing::warn!("Unparseable model response: {e}; raw response was: {raw}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "PARSE_ERROR",
                    e.to_string(),
                )
            }
            AppError::Document(e @ DocumentError::Encoding(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Document(e) => {
                tracing::error!("Document error: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "DOCUMENT_ERROR",
                    e.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
