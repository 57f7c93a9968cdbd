// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /speak - text in, synthesized audio out

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::errors::ApiError;
use super::http_server::AppState;

/// Longest text accepted for synthesis
pub const MAX_SPEAK_CHARS: usize = 4096;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
}

pub async fn speak_handler(
    State(state): State<AppState>,
    Json(request): Json<SpeakRequest>,
) -> Result<Response, ApiError> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::InvalidRequest("text is required".to_string()));
    }
    if text.chars().count() > MAX_SPEAK_CHARS {
        return Err(ApiError::InvalidRequest(format!(
            "text must be at most {} characters",
            MAX_SPEAK_CHARS
        )));
    }

    let synthesizer = state
        .synthesizer
        .as_ref()
        .ok_or_else(|| ApiError::SpeechUnavailable("speech output is not configured".to_string()))?;

    let audio = synthesizer.synthesize(text).await.map_err(|e| {
        warn!("Speech synthesis failed: {}", e);
        ApiError::from(e)
    })?;
    debug!("Synthesized {} bytes of {}", audio.bytes.len(), audio.content_type);

    Ok(([(header::CONTENT_TYPE, audio.content_type)], audio.bytes).into_response())
}
