// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image extraction: raw diagram → text tokens + geometric primitives

use image::DynamicImage;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::fsa::TableError;

use super::image_utils::{decode_image_bytes, ImageError};
use super::preprocess::preprocess_diagram;
use super::primitives::{Extraction, TextToken};
use super::shapes::{detect_circles, detect_segments, DetectionParams};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("No states detected in the image. Please upload a clearer FSA diagram.")]
    NoStatesDetected,

    #[error("Text recognition failed: {0}")]
    Recognition(String),

    #[error("Extracted table is inconsistent: {0}")]
    InvalidTable(#[from] TableError),
}

/// Reads text from a diagram
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<TextToken>, ExtractionError>;

    /// Short identifier reported by the health endpoint
    fn name(&self) -> &str;
}

/// Produces tokens and primitives from a diagram image
pub trait ImageExtractor: Send + Sync {
    fn extract(&self, image: &DynamicImage) -> Result<Extraction, ExtractionError>;

    fn extract_bytes(&self, bytes: &[u8]) -> Result<Extraction, ExtractionError> {
        let (image, info) = decode_image_bytes(bytes)?;
        debug!(
            "Decoded {:?} image {}x{} ({} bytes)",
            info.format, info.width, info.height, info.size_bytes
        );
        self.extract(&image)
    }

    /// Whether text recognition is wired in
    fn has_text_recognition(&self) -> bool;
}

/// In-process extractor: shape detection plus an optional text recognizer
///
/// Without a recognizer every token list is empty; states then get
/// positional names and transition symbols are reported as unlabeled.
#[derive(Clone)]
pub struct DiagramExtractor {
    params: DetectionParams,
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl std::fmt::Debug for DiagramExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramExtractor")
            .field("params", &self.params)
            .field("recognizer", &self.recognizer.as_ref().map(|r| r.name().to_string()))
            .finish()
    }
}

impl DiagramExtractor {
    pub fn new(params: DetectionParams) -> Self {
        Self {
            params,
            recognizer: None,
        }
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }
}

impl Default for DiagramExtractor {
    fn default() -> Self {
        Self::new(DetectionParams::default())
    }
}

impl ImageExtractor for DiagramExtractor {
    fn extract(&self, image: &DynamicImage) -> Result<Extraction, ExtractionError> {
        let (gray, mask) = preprocess_diagram(image);
        let circles = detect_circles(&gray, &mask, &self.params);
        let segments = detect_segments(&mask, &circles, &self.params);

        let tokens = match &self.recognizer {
            Some(recognizer) => recognizer.recognize(image)?,
            None => Vec::new(),
        };

        info!(
            "Extracted {} circles, {} segments, {} text tokens",
            circles.len(),
            segments.len(),
            tokens.len()
        );

        Ok(Extraction {
            width: image.width(),
            height: image.height(),
            tokens,
            circles,
            segments,
        })
    }

    fn has_text_recognition(&self) -> bool {
        self.recognizer.is_some()
    }
}
