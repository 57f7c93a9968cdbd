// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shape detection on preprocessed diagrams
//!
//! - `circles` - state outlines via gradient Hough voting + ring verification
//! - `segments` - arrow strokes via connected components + principal axis

pub mod circles;
pub mod segments;

pub use circles::detect_circles;
pub use segments::detect_segments;

use serde::{Deserialize, Serialize};

/// Tuning knobs for shape detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Smallest state radius in pixels
    pub min_radius: u32,
    /// Largest state radius in pixels
    pub max_radius: u32,
    /// Minimum distance between two state centers
    pub min_center_distance: f32,
    /// Sobel magnitude a pixel needs to vote for circle centers
    pub edge_threshold: f32,
    /// Smoothed vote count a center candidate needs
    pub vote_threshold: u32,
    /// Fraction of a ring that must be inked to count as a circle
    pub ring_coverage: f32,
    /// Strokes shorter than this are treated as text or noise
    pub min_segment_length: f32,
    /// Strokes with fewer pixels than this are ignored
    pub min_segment_pixels: usize,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            min_radius: 20,
            max_radius: 100,
            min_center_distance: 50.0,
            edge_threshold: 100.0,
            vote_threshold: 30,
            ring_coverage: 0.6,
            min_segment_length: 30.0,
            min_segment_pixels: 20,
        }
    }
}

impl DetectionParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_radius == 0 || self.min_radius > self.max_radius {
            return Err(format!(
                "invalid radius range {}..={}",
                self.min_radius, self.max_radius
            ));
        }
        if !(0.0..=1.0).contains(&self.ring_coverage) || self.ring_coverage == 0.0 {
            return Err("ring_coverage must be in (0, 1]".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support;
