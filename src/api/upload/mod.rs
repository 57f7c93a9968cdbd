// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagram upload endpoint
//!
//! Provides POST /process_image: multipart image in, transition table out.

pub mod handler;
pub mod response;

pub use handler::process_image_handler;
pub use response::{ExtractionStats, ProcessImageResponse};
