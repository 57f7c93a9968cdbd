// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Question response types

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::speech::SynthesizedAudio;

/// Spoken answer, base64-encoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPayload {
    pub data: String,
    pub content_type: String,
}

impl From<SynthesizedAudio> for AudioPayload {
    fn from(audio: SynthesizedAudio) -> Self {
        Self {
            data: STANDARD.encode(&audio.bytes),
            content_type: audio.content_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub response: String,
    /// The question as answered (the transcript for voice input)
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioPayload>,
}
