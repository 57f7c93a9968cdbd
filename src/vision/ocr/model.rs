// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end PaddleOCR pipeline: detect regions, crop, recognize

use anyhow::Result;
use image::{DynamicImage, GenericImageView};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use super::detection::{TextDetector, TextRegion};
use super::preprocessing::{detection_tensor, recognition_tensor, Letterbox};
use super::recognition::CharacterRecognizer;
use crate::vision::extractor::{ExtractionError, TextRecognizer};
use crate::vision::primitives::{BoundingBox, TextToken};

pub const DETECTION_MODEL_FILE: &str = "det_model.onnx";
pub const RECOGNITION_MODEL_FILE: &str = "rec_model.onnx";
pub const DICTIONARY_FILE: &str = "ppocr_keys_v1.txt";

/// Tokens below this confidence are dropped
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// PaddleOCR detection + recognition on CPU
#[derive(Debug, Clone)]
pub struct PaddleOcr {
    detector: TextDetector,
    recognizer: CharacterRecognizer,
    min_confidence: f32,
}

impl PaddleOcr {
    /// Load models from `model_dir`
    ///
    /// Expected files: `det_model.onnx`, `rec_model.onnx`, `ppocr_keys_v1.txt`.
    pub fn load<P: AsRef<Path>>(model_dir: P) -> Result<Self> {
        let dir = model_dir.as_ref();
        let detector = TextDetector::load(dir.join(DETECTION_MODEL_FILE))?;
        let recognizer = CharacterRecognizer::load(
            dir.join(RECOGNITION_MODEL_FILE),
            dir.join(DICTIONARY_FILE),
        )?;
        Ok(Self {
            detector,
            recognizer,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        })
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    /// Run the full pipeline and return tokens in source-image coordinates
    pub fn read_tokens(&self, image: &DynamicImage) -> Result<Vec<TextToken>> {
        let started = Instant::now();
        let (tensor, letterbox) = detection_tensor(image);
        let regions = self.detector.detect(&tensor)?;

        let mut tokens = Vec::new();
        for region in regions {
            let Some(bbox) = source_box(&region, &letterbox, image.dimensions()) else {
                continue;
            };
            let crop = image.crop_imm(bbox.x, bbox.y, bbox.width, bbox.height);
            let recognized = self.recognizer.recognize(&recognition_tensor(&crop))?;
            if recognized.text.is_empty() || recognized.confidence < self.min_confidence {
                continue;
            }
            tokens.push(TextToken {
                text: recognized.text,
                confidence: recognized.confidence,
                bounding_box: bbox,
            });
        }

        debug!(
            "OCR read {} tokens in {}ms",
            tokens.len(),
            started.elapsed().as_millis()
        );
        Ok(tokens)
    }
}

/// Map a model-space region to a clamped, non-empty box in the source image
fn source_box(
    region: &TextRegion,
    letterbox: &Letterbox,
    (width, height): (u32, u32),
) -> Option<BoundingBox> {
    let (x0, y0) = letterbox.to_original(region.x, region.y);
    let (x1, y1) = letterbox.to_original(region.x + region.width, region.y + region.height);

    let x0 = x0.floor().clamp(0.0, width as f32) as u32;
    let y0 = y0.floor().clamp(0.0, height as f32) as u32;
    let x1 = x1.ceil().clamp(0.0, width as f32) as u32;
    let y1 = y1.ceil().clamp(0.0, height as f32) as u32;

    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(BoundingBox {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

impl TextRecognizer for PaddleOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<TextToken>, ExtractionError> {
        self.read_tokens(image)
            .map_err(|e| ExtractionError::Recognition(format!("{:#}", e)))
    }

    fn name(&self) -> &str {
        "paddleocr"
    }
}
