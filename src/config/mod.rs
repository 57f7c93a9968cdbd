// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Defaults, overlaid by an optional TOML file, overlaid by environment
//! variables. Every TOML section and key is optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::fsa::BuilderParams;
use crate::vision::image_utils::MAX_IMAGE_SIZE;
use crate::vision::DetectionParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body (image uploads, audio)
    pub max_upload_bytes: usize,
    /// Sessions kept before the least recently used is evicted
    pub session_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: MAX_IMAGE_SIZE,
            session_capacity: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// PaddleOCR model directory; `None` disables text recognition
    pub ocr_model_dir: Option<String>,
    pub ocr_min_confidence: f32,
    pub detection: DetectionParams,
    pub builder: BuilderParams,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            ocr_model_dir: Some("./models/paddleocr-onnx".to_string()),
            ocr_min_confidence: 0.5,
            detection: DetectionParams::default(),
            builder: BuilderParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Speech sidecar base URL; `None` disables voice input and output
    pub endpoint: Option<String>,
    pub transcription_model: String,
    pub synthesis_model: String,
    pub voice: String,
    /// Playback speed; below 1.0 is slower than the model default
    pub speed: f32,
    pub response_format: String,
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            transcription_model: "whisper-1".to_string(),
            synthesis_model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            speed: 0.8,
            response_format: "mp3".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub vision: VisionConfig,
    pub speech: SpeechConfig,
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

/// `""` and `"none"` switch an optional path or URL off
fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl ServiceConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ServiceConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Optional TOML file, then environment overrides, then validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate().map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from any key/value source
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("FSA_HOST") {
            self.server.host = host;
        }
        if let Some(port) = parsed(&lookup, "FSA_PORT") {
            self.server.port = port;
        }
        if let Some(bytes) = parsed(&lookup, "MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = bytes;
        }
        if let Some(capacity) = parsed(&lookup, "SESSION_CAPACITY") {
            self.server.session_capacity = capacity;
        }

        if let Some(dir) = lookup("OCR_MODEL_DIR") {
            self.vision.ocr_model_dir = optional(dir);
        }
        if let Some(confidence) = parsed(&lookup, "OCR_MIN_CONFIDENCE") {
            self.vision.ocr_min_confidence = confidence;
        }

        if let Some(endpoint) = lookup("SPEECH_ENDPOINT") {
            self.speech.endpoint = optional(endpoint);
        }
        if let Some(model) = lookup("STT_MODEL") {
            self.speech.transcription_model = model;
        }
        if let Some(model) = lookup("TTS_MODEL") {
            self.speech.synthesis_model = model;
        }
        if let Some(voice) = lookup("TTS_VOICE") {
            self.speech.voice = voice;
        }
        if let Some(speed) = parsed(&lookup, "TTS_SPEED") {
            self.speech.speed = speed;
        }
        if let Some(timeout) = parsed(&lookup, "SPEECH_TIMEOUT_SECS") {
            self.speech.timeout_secs = timeout;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }
        if self.server.max_upload_bytes > MAX_IMAGE_SIZE {
            return Err(format!(
                "max_upload_bytes must not exceed the decoder limit of {} bytes",
                MAX_IMAGE_SIZE
            ));
        }
        if self.server.session_capacity == 0 {
            return Err("session_capacity must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.vision.ocr_min_confidence) {
            return Err("ocr_min_confidence must be between 0 and 1".to_string());
        }
        self.vision.detection.validate()?;
        let builder = &self.vision.builder;
        if builder.attach_tolerance <= 0.0 || builder.label_search_radius <= 0.0 {
            return Err("builder distances must be positive".to_string());
        }
        if !(0.25..=4.0).contains(&self.speech.speed) {
            return Err("speech speed must be between 0.25 and 4.0".to_string());
        }
        if self.speech.timeout_secs == 0 {
            return Err("speech timeout must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
