// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Question request types and validation

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::fsa::TransitionTable;

fn default_audio_format() -> String {
    "wav".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    /// Typed question; ignored when `voiceInput` is set
    #[serde(default)]
    pub question: Option<String>,

    /// Session holding the table from a previous upload
    #[serde(default)]
    pub session_id: Option<String>,

    /// Inline table; takes precedence over the session's
    #[serde(default)]
    pub fsa_data: Option<TransitionTable>,

    /// Transcribe `audio` and answer the transcript
    #[serde(default)]
    pub voice_input: bool,

    /// Base64-encoded recording
    #[serde(default)]
    pub audio: Option<String>,

    /// Container of `audio` (wav, webm, mp3, ...)
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Also synthesize the answer
    #[serde(default)]
    pub speak: bool,
}

impl AskRequest {
    pub fn session_uuid(&self) -> Result<Option<Uuid>, ApiError> {
        match self.session_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(id) => Uuid::parse_str(id)
                .map(Some)
                .map_err(|_| ApiError::InvalidRequest(format!("Invalid sessionId '{}'", id))),
        }
    }

    /// Decoded recording for voice input
    pub fn audio_bytes(&self) -> Result<Vec<u8>, ApiError> {
        let encoded = self
            .audio
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ApiError::InvalidRequest("audio is required for voice input".to_string())
            })?;

        // Tolerate data URLs from browser recorders
        let encoded = match encoded.split_once(";base64,") {
            Some((_, data)) => data,
            None => encoded,
        };

        STANDARD
            .decode(encoded)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid base64 audio: {}", e)))
    }
}
