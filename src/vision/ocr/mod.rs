// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text reading for state names and transition labels
//!
//! Components:
//! - `detection` - text region detection (DB)
//! - `recognition` - CRNN recognition with CTC decoding
//! - `preprocessing` - tensor preparation
//! - `model` - combined pipeline, implements `TextRecognizer`

pub mod detection;
pub mod model;
pub mod preprocessing;
pub mod recognition;

pub use detection::{TextDetector, TextRegion};
pub use model::PaddleOcr;
pub use recognition::{CharacterRecognizer, Recognized};
