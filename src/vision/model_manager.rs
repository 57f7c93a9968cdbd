// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision model manager: loads the optional OCR model and builds the extractor

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::VisionConfig;
use crate::vision::extractor::{DiagramExtractor, ImageExtractor, TextRecognizer};
use crate::vision::ocr::PaddleOcr;

/// Availability of one vision component
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionModelInfo {
    pub name: String,
    pub model_type: String,
    pub available: bool,
}

/// Owns the OCR model (if any) and hands out the configured extractor
///
/// A missing or broken OCR model is not fatal: shape detection still runs
/// and states get positional names.
pub struct VisionModelManager {
    ocr: Option<Arc<PaddleOcr>>,
    extractor: Arc<DiagramExtractor>,
}

impl VisionModelManager {
    pub fn new(config: &VisionConfig) -> Self {
        let ocr = config
            .ocr_model_dir
            .as_deref()
            .and_then(|dir| Self::load_ocr(dir, config.ocr_min_confidence));

        let mut extractor = DiagramExtractor::new(config.detection.clone());
        if let Some(ref ocr) = ocr {
            extractor = extractor.with_recognizer(ocr.clone() as Arc<dyn TextRecognizer>);
        }

        Self {
            ocr,
            extractor: Arc::new(extractor),
        }
    }

    fn load_ocr(dir: &str, min_confidence: f32) -> Option<Arc<PaddleOcr>> {
        if !Path::new(dir).is_dir() {
            warn!("⚠️ OCR model directory {} does not exist, text recognition disabled", dir);
            return None;
        }
        match PaddleOcr::load(dir) {
            Ok(model) => {
                info!("✅ PaddleOCR model loaded from {}", dir);
                Some(Arc::new(model.with_min_confidence(min_confidence)))
            }
            Err(e) => {
                warn!("⚠️ Failed to load OCR model from {}: {:#}", dir, e);
                None
            }
        }
    }

    pub fn extractor(&self) -> Arc<dyn ImageExtractor> {
        self.extractor.clone()
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    pub fn list_models(&self) -> Vec<VisionModelInfo> {
        vec![
            VisionModelInfo {
                name: "shape-detector".to_string(),
                model_type: "geometry".to_string(),
                available: true,
            },
            VisionModelInfo {
                name: "paddleocr".to_string(),
                model_type: "ocr".to_string(),
                available: self.ocr.is_some(),
            },
        ]
    }
}
