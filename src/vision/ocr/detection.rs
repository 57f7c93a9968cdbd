// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection
//!
//! The DB detection model outputs a text probability map. Pixels above the
//! threshold are grouped into 4-connected regions and each region's box is
//! grown by the DB unclip distance so glyph edges are not cut off.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array2, Array4, ArrayView2, IxDyn};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Default probability a pixel needs to count as text
pub const DEFAULT_BOX_THRESHOLD: f32 = 0.3;

/// Box growth factor used by DB post-processing
pub const UNCLIP_RATIO: f32 = 1.5;

/// Regions smaller than this many pixels are noise
const MIN_REGION_PIXELS: usize = 6;

/// A text box in detection-model input space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean probability inside the region
    pub score: f32,
}

impl TextRegion {
    /// Grow the box by `area * ratio / perimeter` on every side
    pub fn unclip(self, ratio: f32) -> Self {
        let perimeter = 2.0 * (self.width + self.height);
        if perimeter <= 0.0 {
            return self;
        }
        let distance = self.width * self.height * ratio / perimeter;
        Self {
            x: self.x - distance,
            y: self.y - distance,
            width: self.width + 2.0 * distance,
            height: self.height + 2.0 * distance,
            score: self.score,
        }
    }
}

/// Group a probability map into text regions, top-to-bottom then left-to-right
pub fn regions_from_probability_map(map: ArrayView2<f32>, threshold: f32) -> Vec<TextRegion> {
    let (height, width) = map.dim();
    let mut visited = Array2::from_elem((height, width), false);
    let mut regions = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[[y, x]] || map[[y, x]] < threshold {
                continue;
            }

            let (mut min_x, mut max_x, mut min_y, mut max_y) = (x, x, y, y);
            let mut count = 0usize;
            let mut sum = 0.0f32;
            let mut stack = vec![(x, y)];
            visited[[y, x]] = true;

            while let Some((px, py)) = stack.pop() {
                count += 1;
                sum += map[[py, px]];
                min_x = min_x.min(px);
                max_x = max_x.max(px);
                min_y = min_y.min(py);
                max_y = max_y.max(py);

                let neighbours = [
                    (px.wrapping_sub(1), py),
                    (px + 1, py),
                    (px, py.wrapping_sub(1)),
                    (px, py + 1),
                ];
                for (nx, ny) in neighbours {
                    if nx < width
                        && ny < height
                        && !visited[[ny, nx]]
                        && map[[ny, nx]] >= threshold
                    {
                        visited[[ny, nx]] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            if count >= MIN_REGION_PIXELS {
                regions.push(TextRegion {
                    x: min_x as f32,
                    y: min_y as f32,
                    width: (max_x - min_x + 1) as f32,
                    height: (max_y - min_y + 1) as f32,
                    score: sum / count as f32,
                });
            }
        }
    }

    regions.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });
    regions
}

/// DB text detection model (CPU)
#[derive(Clone)]
pub struct TextDetector {
    session: Arc<Mutex<Session>>,
    input_name: String,
    threshold: f32,
}

impl std::fmt::Debug for TextDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextDetector")
            .field("input_name", &self.input_name)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl TextDetector {
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            anyhow::bail!("OCR detection model not found: {}", model_path.display());
        }

        info!("Loading OCR detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("Failed to load OCR detection model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());
        debug!("Detection model input: {}", input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            threshold: DEFAULT_BOX_THRESHOLD,
        })
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Detect text regions in a `[1, 3, H, W]` tensor
    ///
    /// Returned boxes are in the tensor's pixel space, already unclipped.
    pub fn detect(&self, input: &Array4<f32>) -> Result<Vec<TextRegion>> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }
        let (input_height, input_width) = (shape[2], shape[3]);

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("OCR detection session lock poisoned"))?;
        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;
        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let out_shape = output.shape().to_vec();
        let map = match out_shape.len() {
            4 => Array2::from_shape_fn((out_shape[2], out_shape[3]), |(y, x)| {
                output[IxDyn(&[0, 0, y, x])]
            }),
            3 => Array2::from_shape_fn((out_shape[1], out_shape[2]), |(y, x)| {
                output[IxDyn(&[0, y, x])]
            }),
            _ => anyhow::bail!("Unexpected detection output shape: {:?}", out_shape),
        };

        let scale_x = input_width as f32 / map.ncols().max(1) as f32;
        let scale_y = input_height as f32 / map.nrows().max(1) as f32;
        let regions: Vec<TextRegion> = regions_from_probability_map(map.view(), self.threshold)
            .into_iter()
            .map(|r| {
                TextRegion {
                    x: r.x * scale_x,
                    y: r.y * scale_y,
                    width: r.width * scale_x,
                    height: r.height * scale_y,
                    score: r.score,
                }
                .unclip(UNCLIP_RATIO)
            })
            .collect();

        debug!("Detected {} text regions", regions.len());
        Ok(regions)
    }
}
