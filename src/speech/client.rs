// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Speech sidecar client for an OpenAI-compatible audio API
//!
//! - `POST /v1/audio/transcriptions` (multipart `file` + `model`) → `{"text"}`
//! - `POST /v1/audio/speech` (JSON) → raw audio bytes

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{multipart, Client};
use std::time::Duration;
use tracing::{debug, info};

use super::{
    audio_content_type, SpeechError, SpeechSynthesizer, SpeechTranscriber, SynthesizedAudio,
};
use crate::config::SpeechConfig;

#[derive(serde::Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'a str,
}

#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Client for the speech sidecar
#[derive(Debug, Clone)]
pub struct SpeechClient {
    client: Client,
    endpoint: String,
    transcription_model: String,
    synthesis_model: String,
    voice: String,
    speed: f32,
    response_format: String,
}

impl SpeechClient {
    pub fn new(endpoint: &str, config: &SpeechConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "Speech client configured: endpoint={}, stt={}, tts={}",
            endpoint, config.transcription_model, config.synthesis_model
        );

        Ok(Self {
            client,
            endpoint,
            transcription_model: config.transcription_model.clone(),
            synthesis_model: config.synthesis_model.clone(),
            voice: config.voice.clone(),
            speed: config.speed,
            response_format: config.response_format.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if the speech sidecar is healthy
    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("Speech health check failed: {}", e);
                false
            }
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SpeechError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(SpeechError::Service {
            status: status.as_u16(),
            message,
        })
    }
}

fn transport_error(e: reqwest::Error) -> SpeechError {
    if e.is_timeout() {
        SpeechError::Timeout
    } else if e.is_decode() || e.is_body() {
        // The sidecar answered; what it sent was unusable
        SpeechError::InvalidResponse(e.to_string())
    } else {
        SpeechError::Unavailable(e.to_string())
    }
}

#[async_trait]
impl SpeechTranscriber for SpeechClient {
    async fn transcribe(&self, audio: &[u8], format: &str) -> Result<String, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("audio is empty".to_string()));
        }

        let part = multipart::Part::bytes(audio.to_vec())
            .file_name(format!("question.{}", format))
            .mime_str(audio_content_type(format))
            .map_err(|e| SpeechError::InvalidAudio(e.to_string()))?;
        let form = multipart::Form::new()
            .text("model", self.transcription_model.clone())
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        let response = Self::check_status(response).await?;

        let body: TranscriptionResponse = response.json().await.map_err(transport_error)?;
        debug!("Transcribed {} bytes of {} audio", audio.len(), format);
        Ok(body.text.trim().to_string())
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechClient {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SpeechError> {
        let request = SpeechRequest {
            model: &self.synthesis_model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
            response_format: &self.response_format,
        };

        let response = self
            .client
            .post(format!("{}/v1/audio/speech", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;
        let response = Self::check_status(response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_else(|| audio_content_type(&self.response_format))
            .to_string();
        let bytes = response.bytes().await.map_err(transport_error)?.to_vec();

        Ok(SynthesizedAudio {
            bytes,
            content_type,
        })
    }
}
