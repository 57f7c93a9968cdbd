// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tensor preparation for the PaddleOCR models

use image::{imageops::FilterType, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Square input size of the detection model
pub const DET_INPUT_SIZE: u32 = 640;

/// Recognition model input height
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Maximum width for recognition model input
pub const REC_MAX_WIDTH: u32 = 320;

/// Detection normalization mean (ImageNet)
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Detection normalization std (ImageNet)
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Recognition models take pixels scaled into `[-1, 1]`
pub const REC_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
pub const REC_STD: [f32; 3] = [0.5, 0.5, 0.5];

const PAD_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Geometry of an aspect-preserving resize into a padded square
///
/// Diagrams are padded with white so the padding reads as background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub scaled_width: u32,
    pub scaled_height: u32,
}

impl Letterbox {
    pub fn new(width: u32, height: u32, target: u32) -> Self {
        if width == 0 || height == 0 {
            return Self {
                scale: 1.0,
                offset_x: 0,
                offset_y: 0,
                scaled_width: 0,
                scaled_height: 0,
            };
        }
        let scale = (target as f32 / width as f32).min(target as f32 / height as f32);
        let scaled_width = ((width as f32 * scale).round() as u32).clamp(1, target);
        let scaled_height = ((height as f32 * scale).round() as u32).clamp(1, target);
        Self {
            scale,
            offset_x: (target - scaled_width) / 2,
            offset_y: (target - scaled_height) / 2,
            scaled_width,
            scaled_height,
        }
    }

    /// Map a model-space coordinate back into the source image
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.offset_x as f32) / self.scale,
            (y - self.offset_y as f32) / self.scale,
        )
    }
}

fn fill_normalized(rgb: &RgbImage, tensor: &mut Array4<f32>, mean: [f32; 3], std: [f32; 3]) {
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - mean[c]) / std[c];
        }
    }
}

/// NCHW detection tensor `[1, 3, 640, 640]` plus the letterbox used to build it
pub fn detection_tensor(image: &DynamicImage) -> (Array4<f32>, Letterbox) {
    let (width, height) = image.dimensions();
    let letterbox = Letterbox::new(width, height, DET_INPUT_SIZE);

    let mut canvas = RgbImage::from_pixel(DET_INPUT_SIZE, DET_INPUT_SIZE, PAD_COLOR);
    if letterbox.scaled_width > 0 {
        let resized = image
            .resize_exact(letterbox.scaled_width, letterbox.scaled_height, FilterType::Triangle)
            .to_rgb8();
        image::imageops::overlay(
            &mut canvas,
            &resized,
            letterbox.offset_x as i64,
            letterbox.offset_y as i64,
        );
    }

    let size = DET_INPUT_SIZE as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));
    fill_normalized(&canvas, &mut tensor, MEAN, STD);
    (tensor, letterbox)
}

/// NCHW recognition tensor `[1, 3, 48, W]` for a cropped text region
///
/// Width follows the crop's aspect ratio, clamped to `4..=320`.
pub fn recognition_tensor(crop: &DynamicImage) -> Array4<f32> {
    let (width, height) = crop.dimensions();
    let scale = REC_INPUT_HEIGHT as f32 / height.max(1) as f32;
    let new_width = ((width as f32 * scale).round() as u32).clamp(4, REC_MAX_WIDTH);

    let rgb = crop
        .resize_exact(new_width, REC_INPUT_HEIGHT, FilterType::Lanczos3)
        .to_rgb8();

    let mut tensor = Array4::zeros((1, 3, REC_INPUT_HEIGHT as usize, new_width as usize));
    fill_normalized(&rgb, &mut tensor, REC_MEAN, REC_STD);
    tensor
}
