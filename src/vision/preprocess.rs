// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagram preprocessing: grayscale, blur, adaptive threshold, morphology
//!
//! Produces an ink mask where `true` marks dark strokes on a light
//! background.

use image::{imageops, DynamicImage, GrayImage};

/// Sigma matching a 5x5 Gaussian kernel
pub const BLUR_SIGMA: f32 = 1.1;

/// Neighbourhood size for the adaptive threshold (odd)
pub const THRESHOLD_BLOCK_SIZE: u32 = 11;

/// Offset subtracted from the local mean before comparing
pub const THRESHOLD_OFFSET: f32 = 2.0;

/// Boolean pixel mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl BinaryImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Out-of-bounds reads are background
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.data[self.index(x as u32, y as u32)]
    }

    /// Nearest-pixel lookup for sub-pixel coordinates
    pub fn get_f(&self, x: f32, y: f32) -> bool {
        self.get(x.round() as i64, y.round() as i64)
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.data[idx] = value;
        }
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    fn apply_3x3(&self, keep_when_any: bool) -> Self {
        let mut out = Self::new(self.width, self.height);
        for y in 0..self.height as i64 {
            for x in 0..self.width as i64 {
                let mut any = false;
                let mut all = true;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let nx = x + dx;
                        let ny = y + dy;
                        // Image border counts as background for dilation and
                        // as neutral for erosion
                        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                            continue;
                        }
                        let v = self.get(nx, ny);
                        any |= v;
                        all &= v;
                    }
                }
                out.set(x as u32, y as u32, if keep_when_any { any } else { all });
            }
        }
        out
    }

    pub fn dilate(&self) -> Self {
        self.apply_3x3(true)
    }

    pub fn erode(&self) -> Self {
        self.apply_3x3(false)
    }

    /// Closing fills pinholes in strokes
    pub fn close(&self) -> Self {
        self.dilate().erode()
    }

    /// Opening removes isolated speckles
    pub fn open(&self) -> Self {
        self.erode().dilate()
    }
}

/// Grayscale + blur of the input diagram
pub fn blurred_grayscale(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    imageops::blur(&gray, BLUR_SIGMA)
}

/// Mark pixels darker than their neighbourhood mean minus `offset`
///
/// Uses an integral image so every pixel costs O(1).
pub fn adaptive_threshold(gray: &GrayImage, block_size: u32, offset: f32) -> BinaryImage {
    let (width, height) = gray.dimensions();
    let mut mask = BinaryImage::new(width, height);
    if width == 0 || height == 0 {
        return mask;
    }

    let stride = width as usize + 1;
    let mut integral = vec![0u64; stride * (height as usize + 1)];
    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += gray.get_pixel(x as u32, y as u32)[0] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    let radius = (block_size / 2) as i64;
    for y in 0..height as i64 {
        let y0 = (y - radius).max(0) as usize;
        let y1 = (y + radius + 1).min(height as i64) as usize;
        for x in 0..width as i64 {
            let x0 = (x - radius).max(0) as usize;
            let x1 = (x + radius + 1).min(width as i64) as usize;
            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let area = ((y1 - y0) * (x1 - x0)) as f32;
            let mean = sum as f32 / area;
            let value = gray.get_pixel(x as u32, y as u32)[0] as f32;
            if value < mean - offset {
                mask.set(x as u32, y as u32, true);
            }
        }
    }

    mask
}

/// Full preprocessing chain used by the diagram extractor
///
/// Returns the blurred grayscale (for gradients) and the cleaned ink mask.
pub fn preprocess_diagram(image: &DynamicImage) -> (GrayImage, BinaryImage) {
    let gray = blurred_grayscale(image);
    let mask = adaptive_threshold(&gray, THRESHOLD_BLOCK_SIZE, THRESHOLD_OFFSET)
        .close()
        .open();
    (gray, mask)
}
