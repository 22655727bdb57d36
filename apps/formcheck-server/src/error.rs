//! Error types for the formcheck server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use form_compliance::InspectError;
use serde::Serialize;
use shared_pdf::PdfError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Could not read PDF: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ServerError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            ServerError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg)
            }
            ServerError::Parse(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "PARSE_ERROR", msg),
            ServerError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<InspectError> for ServerError {
    fn from(err: InspectError) -> Self {
        match err {
            InspectError::Pdf(PdfError::Io(e)) => ServerError::Internal(e.to_string()),
            InspectError::Pdf(other) => ServerError::Parse(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}
