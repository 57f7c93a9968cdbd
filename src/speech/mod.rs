// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Voice input and output
//!
//! Transcription and synthesis are capabilities the service calls through
//! traits; `SpeechClient` implements both against an OpenAI-compatible
//! audio sidecar.

pub mod client;

pub use client::SpeechClient;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech service unavailable: {0}")]
    Unavailable(String),

    #[error("Speech service request timed out")]
    Timeout,

    #[error("Speech service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Malformed speech service response: {0}")]
    InvalidResponse(String),

    #[error("Invalid audio: {0}")]
    InvalidAudio(String),
}

/// Audio produced by a synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `audio/mpeg`
    pub content_type: String,
}

/// Audio → text
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    /// `format` is the container/extension of `audio` (wav, webm, mp3, ...)
    async fn transcribe(&self, audio: &[u8], format: &str) -> Result<String, SpeechError>;
}

/// Text → audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SpeechError>;
}

/// MIME type for an audio format name, `application/octet-stream` if unknown
pub fn audio_content_type(format: &str) -> &'static str {
    match format.to_ascii_lowercase().as_str() {
        "mp3" | "mpeg" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "opus" => "audio/ogg",
        "webm" => "audio/webm",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "m4a" | "mp4" => "audio/mp4",
        _ => "application/octet-stream",
    }
}
