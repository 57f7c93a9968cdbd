// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Drawing helpers for synthetic diagrams
//!
//! Shared by the unit tests and the integration tests under `tests/`, so it
//! depends on nothing but the `image` crate.

use image::{DynamicImage, GrayImage, Luma};

pub fn canvas(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([255]))
}

pub fn ring(img: &mut GrayImage, cx: f32, cy: f32, radius: f32, thickness: f32) {
    let (w, h) = img.dimensions();
    for y in 0..h {
        for x in 0..w {
            let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
            if (d - radius).abs() <= thickness / 2.0 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }
}

pub fn line(img: &mut GrayImage, from: (f32, f32), to: (f32, f32), thickness: f32) {
    let (w, h) = img.dimensions();
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len_sq = dx * dx + dy * dy;
    for y in 0..h {
        for x in 0..w {
            let (px, py) = (x as f32 - from.0, y as f32 - from.1);
            let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
            let d = ((px - t * dx).powi(2) + (py - t * dy).powi(2)).sqrt();
            if d <= thickness / 2.0 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }
}

/// Straight arrow with two barbs at `to`
pub fn arrow(img: &mut GrayImage, from: (f32, f32), to: (f32, f32)) {
    line(img, from, to, 3.0);
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = (dx * dx + dy * dy).sqrt();
    let (ux, uy) = (dx / len, dy / len);
    let back = (to.0 - ux * 16.0, to.1 - uy * 16.0);
    line(img, to, (back.0 - uy * 10.0, back.1 + ux * 10.0), 3.0);
    line(img, to, (back.0 + uy * 10.0, back.1 - ux * 10.0), 3.0);
}

/// Start arrow -> q0 at (120,120) -> double-ringed q1 at (300,120)
pub fn two_state_diagram() -> DynamicImage {
    let mut img = canvas(420, 240);
    ring(&mut img, 120.0, 120.0, 40.0, 3.0);
    ring(&mut img, 300.0, 120.0, 40.0, 3.0);
    ring(&mut img, 300.0, 120.0, 30.0, 3.0);
    // Tips stop short of the outlines so the barbs survive the erase
    arrow(&mut img, (20.0, 120.0), (70.0, 120.0));
    arrow(&mut img, (170.0, 120.0), (250.0, 120.0));
    DynamicImage::ImageLuma8(img)
}
