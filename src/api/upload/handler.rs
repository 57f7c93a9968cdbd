// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload endpoint handler

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::{multipart::MultipartError, Multipart};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::response::{ExtractionStats, ProcessImageResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::fsa::{build_table, BuildReport};
use crate::vision::{has_allowed_extension, Extraction, ExtractionError};

/// What the multipart form carried
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    session_id: Option<String>,
}

/// A body cut off by the router's size limit is an oversized upload, not a malformed form
fn form_error(e: MultipartError, declared_size: usize, max: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge {
            size: declared_size,
            max,
        }
    } else {
        ApiError::InvalidRequest(e.to_string())
    }
}

fn content_length(headers: &HeaderMap) -> usize {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

async fn read_form(
    multipart: &mut Multipart,
    declared_size: usize,
    max: usize,
) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    let to_api_error = |e| form_error(e, declared_size, max);

    while let Some(field) = multipart.next_field().await.map_err(to_api_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(to_api_error)?;
                form.file = Some((filename, bytes.to_vec()));
            }
            Some("sessionId") => {
                let text = field.text().await.map_err(to_api_error)?;
                form.session_id = Some(text);
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok(form)
}

fn parse_session_id(raw: Option<&str>) -> Result<Uuid, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => Uuid::parse_str(id)
            .map_err(|_| ApiError::InvalidRequest(format!("Invalid sessionId '{}'", id))),
        None => Ok(Uuid::new_v4()),
    }
}

async fn extract_table(
    state: &AppState,
    file: Option<(String, Vec<u8>)>,
) -> Result<(Extraction, BuildReport), ApiError> {
    let (filename, bytes) = file.ok_or(ApiError::NoFileUploaded)?;
    if filename.is_empty() {
        return Err(ApiError::NoFileSelected);
    }
    if !has_allowed_extension(&filename) {
        return Err(ApiError::InvalidFileType);
    }
    if bytes.len() > state.max_upload_bytes {
        return Err(ApiError::PayloadTooLarge {
            size: bytes.len(),
            max: state.max_upload_bytes,
        });
    }

    debug!("Extracting diagram from {} ({} bytes)", filename, bytes.len());

    let extractor = state.extractor.clone();
    let params = state.builder_params.clone();
    let result = tokio::task::spawn_blocking(move || -> Result<_, ExtractionError> {
        let extraction = extractor.extract_bytes(&bytes)?;
        let report = build_table(&extraction, &params)?;
        Ok((extraction, report))
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Extraction task failed: {}", e)))??;

    Ok(result)
}

/// POST /process_image - Extract a transition table from an FSA diagram
///
/// # Request
/// Multipart form:
/// - `file`: PNG or JPG image of the diagram (required)
/// - `sessionId`: session to store the table under; a new one is created if absent
///
/// # Response
/// - `sessionId`, `fsaData` (the table), `warnings`, `stats`, `processingTimeMs`
///
/// # Errors
/// - 400: no file, empty filename, wrong extension, undecodable image
/// - 413: file over the upload limit, or a request body over the router limit
/// - 422: no states found in the image
///
/// Any failure discards the table previously stored for the session.
pub async fn process_image_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ProcessImageResponse>, ApiError> {
    let start = Instant::now();

    let declared_size = content_length(&headers);
    let form = match read_form(&mut multipart, declared_size, state.max_upload_bytes).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Rejected upload form: {}", e);
            return Err(e);
        }
    };
    let session_id = parse_session_id(form.session_id.as_deref())?;

    let (extraction, report) = match extract_table(&state, form.file).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Diagram upload failed for session {}: {}", session_id, e);
            if state.sessions.remove(&session_id).await {
                info!("Cleared previous table for session {}", session_id);
            }
            return Err(e);
        }
    };

    let stats = ExtractionStats::new(&extraction, &report.table);
    state.sessions.insert(session_id, report.table.clone()).await;

    let processing_time_ms = start.elapsed().as_millis() as u64;
    info!(
        "Built table for session {}: {} states, {} transitions, {} warnings ({}ms)",
        session_id,
        stats.states,
        stats.transitions,
        report.warnings.len(),
        processing_time_ms
    );

    Ok(Json(ProcessImageResponse {
        success: true,
        session_id,
        fsa_data: report.table,
        warnings: report.warnings,
        stats,
        processing_time_ms,
    }))
}
