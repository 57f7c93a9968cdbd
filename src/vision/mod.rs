// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagram image processing
//!
//! This module provides:
//! - image decoding and upload validation
//! - preprocessing and shape detection (states and arrows)
//! - OCR for state names and transition labels via PaddleOCR
//!
//! Everything runs on CPU.

pub mod extractor;
pub mod image_utils;
pub mod model_manager;
pub mod ocr;
pub mod preprocess;
pub mod primitives;
pub mod shapes;

pub use extractor::{DiagramExtractor, ExtractionError, ImageExtractor, TextRecognizer};
pub use image_utils::{decode_image_bytes, has_allowed_extension, ImageError, ImageInfo};
pub use model_manager::{VisionModelInfo, VisionModelManager};
pub use primitives::{BoundingBox, Circle, Extraction, Point, Segment, SegmentEnd, TextToken};
pub use shapes::DetectionParams;
