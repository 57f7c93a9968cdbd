// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::speech::SpeechError;
use crate::vision::{ExtractionError, ImageError};

pub const UPLOAD_FIRST: &str = "Please upload an FSA image first.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    NoFileUploaded,
    NoFileSelected,
    InvalidFileType,
    PayloadTooLarge { size: usize, max: usize },
    InvalidImage(String),
    NoStatesDetected,
    NoTable,
    SpeechUnavailable(String),
    SpeechFailed(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, details) = match self {
            ApiError::InvalidRequest(_) => ("invalid_request", None),
            ApiError::NoFileUploaded | ApiError::NoFileSelected => ("missing_file", None),
            ApiError::InvalidFileType => ("invalid_file_type", None),
            ApiError::PayloadTooLarge { size, max } => {
                let mut details = HashMap::new();
                details.insert("size".to_string(), serde_json::Value::Number((*size).into()));
                details.insert("max".to_string(), serde_json::Value::Number((*max).into()));
                ("payload_too_large", Some(details))
            }
            ApiError::InvalidImage(_) => ("invalid_image", None),
            ApiError::NoStatesDetected => ("no_states_detected", None),
            ApiError::NoTable => ("no_table", None),
            ApiError::SpeechUnavailable(_) => ("speech_unavailable", None),
            ApiError::SpeechFailed(_) => ("speech_failed", None),
            ApiError::InternalError(_) => ("internal_error", None),
        };

        ErrorResponse {
            error: self.to_string(),
            error_type: error_type.to_string(),
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_)
            | ApiError::NoFileUploaded
            | ApiError::NoFileSelected
            | ApiError::InvalidFileType
            | ApiError::InvalidImage(_)
            | ApiError::NoTable => 400,
            ApiError::PayloadTooLarge { .. } => 413,
            ApiError::NoStatesDetected => 422,
            ApiError::InternalError(_) => 500,
            ApiError::SpeechFailed(_) => 502,
            ApiError::SpeechUnavailable(_) => 503,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::NoFileUploaded => write!(f, "No file uploaded"),
            ApiError::NoFileSelected => write!(f, "No file selected"),
            ApiError::InvalidFileType => {
                write!(f, "Invalid file type. Only PNG and JPG are allowed.")
            }
            ApiError::PayloadTooLarge { size, max } => {
                write!(f, "Upload of {} bytes exceeds the {} byte limit", size, max)
            }
            ApiError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            ApiError::NoStatesDetected => write!(
                f,
                "No states detected in the image. Please upload a clearer FSA diagram."
            ),
            ApiError::NoTable => write!(f, "{}", UPLOAD_FIRST),
            ApiError::SpeechUnavailable(msg) => write!(f, "Speech service unavailable: {}", msg),
            ApiError::SpeechFailed(msg) => write!(f, "Speech processing failed: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::UnsupportedFormat => ApiError::InvalidFileType,
            ImageError::TooLarge(size, max) => ApiError::PayloadTooLarge { size, max },
            other => ApiError::InvalidImage(other.to_string()),
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Image(e) => e.into(),
            ExtractionError::NoStatesDetected => ApiError::NoStatesDetected,
            ExtractionError::Recognition(msg) => ApiError::InternalError(msg),
            ExtractionError::InvalidTable(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<SpeechError> for ApiError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Unavailable(msg) => ApiError::SpeechUnavailable(msg),
            SpeechError::InvalidAudio(msg) => ApiError::InvalidRequest(msg),
            other => ApiError::SpeechFailed(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}
