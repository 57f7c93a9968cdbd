// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Circle (state) detection
//!
//! Edge pixels vote along their gradient direction for every radius in
//! range; peaks in the accumulator are verified against the ink mask by
//! sampling rings. A second, smaller ring separated by a gap marks a
//! double circle.

use image::GrayImage;
use std::f32::consts::TAU;
use tracing::debug;

use super::DetectionParams;
use crate::vision::preprocess::BinaryImage;
use crate::vision::primitives::{Circle, Point};

/// Angular samples per ring check
const RING_SAMPLES: usize = 90;

/// Upper bound on accumulator peaks that get verified
const MAX_CANDIDATES: usize = 4000;

/// Ring coverage below which the space between two rings counts as a gap
const GAP_COVERAGE: f32 = 0.3;

/// Find state outlines in a diagram
///
/// `gray` is the blurred grayscale used for gradients, `mask` the ink mask
/// used for verification. Circles are returned left to right.
pub fn detect_circles(
    gray: &GrayImage,
    mask: &BinaryImage,
    params: &DetectionParams,
) -> Vec<Circle> {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return Vec::new();
    }

    let accumulator = vote_centers(gray, params);
    let candidates = peak_candidates(&accumulator, width, height, params.vote_threshold);
    debug!("Circle detection: {} center candidates", candidates.len());

    let mut circles: Vec<Circle> = Vec::new();
    for (_, x, y) in candidates.into_iter().take(MAX_CANDIDATES) {
        let center = Point::new(x as f32, y as f32);
        if circles
            .iter()
            .any(|c| c.center.distance(center) < params.min_center_distance)
        {
            continue;
        }
        if let Some(circle) = fit_circle(mask, center, params) {
            if circles
                .iter()
                .all(|c| c.center.distance(circle.center) >= params.min_center_distance)
            {
                circles.push(circle);
            }
        }
    }

    circles.sort_by(|a, b| {
        a.center
            .x
            .partial_cmp(&b.center.x)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    circles
}

fn sobel(gray: &GrayImage, x: u32, y: u32) -> (f32, f32) {
    let p = |dx: i32, dy: i32| -> f32 {
        gray.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32)[0] as f32
    };
    let gx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
    let gy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
    (gx, gy)
}

fn vote_centers(gray: &GrayImage, params: &DetectionParams) -> Vec<u32> {
    let (width, height) = gray.dimensions();
    let mut accumulator = vec![0u32; width as usize * height as usize];

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let (gx, gy) = sobel(gray, x, y);
            let magnitude = (gx * gx + gy * gy).sqrt();
            if magnitude < params.edge_threshold {
                continue;
            }
            let (ux, uy) = (gx / magnitude, gy / magnitude);
            for r in params.min_radius..=params.max_radius {
                for sign in [-1.0f32, 1.0] {
                    let cx = (x as f32 + sign * ux * r as f32).round();
                    let cy = (y as f32 + sign * uy * r as f32).round();
                    if cx >= 0.0 && cy >= 0.0 && cx < width as f32 && cy < height as f32 {
                        accumulator[cy as usize * width as usize + cx as usize] += 1;
                    }
                }
            }
        }
    }

    accumulator
}

/// Cells whose 3x3 vote sum reaches `threshold`, strongest first
fn peak_candidates(
    accumulator: &[u32],
    width: u32,
    height: u32,
    threshold: u32,
) -> Vec<(u32, u32, u32)> {
    let (w, h) = (width as i64, height as i64);
    let mut candidates = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if accumulator[(y * w + x) as usize] == 0 {
                continue;
            }
            let mut score = 0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let (nx, ny) = (x + dx, y + dy);
                    if nx >= 0 && ny >= 0 && nx < w && ny < h {
                        score += accumulator[(ny * w + nx) as usize];
                    }
                }
            }
            if score >= threshold {
                candidates.push((score, x as u32, y as u32));
            }
        }
    }
    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    candidates
}

/// Fraction of ring samples that hit ink within `tolerance` pixels radially
pub(crate) fn ring_coverage(
    mask: &BinaryImage,
    center: Point,
    radius: f32,
    tolerance: i32,
) -> f32 {
    let mut hits = 0;
    for i in 0..RING_SAMPLES {
        let theta = i as f32 * TAU / RING_SAMPLES as f32;
        let (cos, sin) = (theta.cos(), theta.sin());
        let hit = (-tolerance..=tolerance).any(|dr| {
            let r = radius + dr as f32;
            mask.get_f(center.x + r * cos, center.y + r * sin)
        });
        if hit {
            hits += 1;
        }
    }
    hits as f32 / RING_SAMPLES as f32
}

fn outer_radius(mask: &BinaryImage, center: Point, params: &DetectionParams) -> Option<f32> {
    (params.min_radius..=params.max_radius)
        .rev()
        .map(|r| r as f32)
        .find(|&r| ring_coverage(mask, center, r, 1) >= params.ring_coverage)
}

fn fit_circle(mask: &BinaryImage, center: Point, params: &DetectionParams) -> Option<Circle> {
    let radius = outer_radius(mask, center, params)?;

    // Accumulator peaks can sit a pixel or two off the true center
    let mut best = (ring_coverage(mask, center, radius, 1), center);
    for dy in -2..=2 {
        for dx in -2..=2 {
            let shifted = Point::new(center.x + dx as f32, center.y + dy as f32);
            let coverage = ring_coverage(mask, shifted, radius, 1);
            if coverage > best.0 {
                best = (coverage, shifted);
            }
        }
    }
    let center = best.1;
    let radius = outer_radius(mask, center, params).unwrap_or(radius);

    Some(Circle {
        center,
        radius,
        double: has_inner_ring(mask, center, radius, params),
    })
}

/// Walk inward from the outer ring: a gap followed by another ring
fn has_inner_ring(mask: &BinaryImage, center: Point, outer: f32, params: &DetectionParams) -> bool {
    let lower = (outer * 0.5).max(3.0);
    let mut seen_gap = false;
    let mut r = outer - 2.0;
    while r >= lower {
        if !seen_gap {
            seen_gap = ring_coverage(mask, center, r, 0) < GAP_COVERAGE;
        } else if ring_coverage(mask, center, r, 1) >= params.ring_coverage {
            return true;
        }
        r -= 1.0;
    }
    false
}
