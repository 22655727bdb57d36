//! API handlers for the formcheck server
//!
//! Provides REST endpoints for:
//! - Form completeness checks on uploaded PDFs
//! - Plain uploads into the upload directory
//! - Form type listing

use std::path::Path;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use form_compliance::{FieldGroup, RequiredField};
use serde::Serialize;
use shared_types::{FormReport, FormType};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::AppState;

pub const UPLOAD_SUCCESS: &str = "File successfully uploaded";
pub const NO_FILE_PART: &str = "No file part in the request";
pub const NO_FILE_SELECTED: &str = "No file selected for uploading";
pub const FILE_TOO_LARGE: &str = "Uploaded file exceeds the size limit";

/// Multipart field carrying the PDF
const FILE_FIELD: &str = "file";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "formcheck-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Form check response: the report plus a confirmation message
#[derive(Serialize)]
pub struct InspectResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub report: FormReport,
}

/// Handler: POST /api/v1/uploadRiskProfile
///
/// The upload is spooled to a temporary file in the upload directory and
/// removed once the check finishes, whatever the outcome.
pub async fn handle_upload_risk_profile(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<InspectResponse>, ServerError> {
    let upload = read_upload(multipart).await?;
    info!(
        "Form check request: file={}, size={} bytes",
        upload.file_name,
        upload.bytes.len()
    );

    let spooled = spool(&state.upload_dir, &upload.bytes)?;
    let inspector = state.inspector.clone();

    let report = tokio::task::spawn_blocking(move || {
        let report = inspector.inspect_path(spooled.path());
        drop(spooled);
        report
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Form check task failed: {}", e)))??;

    info!(
        "Form check complete: type={}, missing={}",
        report.form_type,
        report.missing.len()
    );

    Ok(Json(InspectResponse {
        message: UPLOAD_SUCCESS,
        report,
    }))
}

/// Stored upload response
#[derive(Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub filepath: String,
}

/// Handler: POST /api/v1/upload
///
/// Keeps the uploaded file in the upload directory.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ServerError> {
    let upload = read_upload(multipart).await?;

    let suffix = format!("-{}", sanitize_file_name(&upload.file_name));
    let spooled = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(&state.upload_dir)?;
    std::fs::write(spooled.path(), &upload.bytes)?;

    let (_, path) = spooled
        .keep()
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    info!("Stored upload at {}", path.display());

    Ok(Json(UploadResponse {
        message: UPLOAD_SUCCESS,
        filepath: path.display().to_string(),
    }))
}

/// Form type list response
#[derive(Serialize)]
pub struct FormTypeListResponse {
    pub success: bool,
    pub form_types: Vec<FormTypeInfo>,
    pub count: usize,
}

/// Form type metadata, in classification priority order
#[derive(Serialize)]
pub struct FormTypeInfo {
    pub form_type: FormType,
    pub keywords: Vec<String>,
    pub groups: Vec<FieldGroup>,
    pub required: Vec<RequiredField>,
}

/// Handler: GET /api/v1/form-types
pub async fn handle_list_form_types(State(state): State<AppState>) -> Json<FormTypeListResponse> {
    let form_types: Vec<FormTypeInfo> = state
        .inspector
        .catalogue()
        .iter()
        .map(|d| FormTypeInfo {
            form_type: d.form_type(),
            keywords: d.keywords.clone(),
            groups: d.schema.groups.clone(),
            required: d.schema.required.clone(),
        })
        .collect();

    let count = form_types.len();

    Json(FormTypeListResponse {
        success: true,
        form_types,
        count,
    })
}

struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// Pull the `file` part out of a multipart body
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Upload, ServerError> {
    let mut multipart = multipart.map_err(|e| {
        debug!("Rejected multipart body: {}", e);
        ServerError::InvalidRequest(NO_FILE_PART.to_string())
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to read multipart field"))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(ServerError::InvalidRequest(NO_FILE_SELECTED.to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "Failed to read file data"))?;

        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(ServerError::InvalidRequest(NO_FILE_PART.to_string()))
}

/// Body-limit overruns surface as multipart read errors
fn multipart_error(err: MultipartError, context: &str) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(FILE_TOO_LARGE.to_string())
    } else {
        ServerError::InvalidRequest(format!("{}: {}", context, err.body_text()))
    }
}

/// Write `bytes` to a temporary file that is deleted when dropped
fn spool(upload_dir: &Path, bytes: &[u8]) -> Result<NamedTempFile, ServerError> {
    let file = tempfile::Builder::new()
        .prefix("check-")
        .suffix(".pdf")
        .tempfile_in(upload_dir)?;
    std::fs::write(file.path(), bytes)?;
    Ok(file)
}

/// Keep only the final path component, limited to a safe character set
pub fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned.to_string()
    }
}
