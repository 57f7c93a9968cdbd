// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Arrow stroke detection
//!
//! State disks are erased from the ink mask, the remaining strokes are split
//! into 8-connected components, and each long enough component is reduced
//! to a segment along its principal axis. The end whose pixels spread
//! further from the axis carries the arrow head.

use tracing::debug;

use super::DetectionParams;
use crate::vision::preprocess::BinaryImage;
use crate::vision::primitives::{Circle, Point, Segment, SegmentEnd};

/// Extra pixels erased around each state outline
pub const CIRCLE_MARGIN: f32 = 5.0;

/// Longest stretch (px) at each end examined for an arrow head
const HEAD_ZONE: f32 = 15.0;

/// Head spread must exceed the other end by this factor...
const HEAD_RATIO: f32 = 2.0;

/// ...plus this many pixels
const HEAD_MARGIN: f32 = 1.5;

/// Find strokes that are not part of any state outline
pub fn detect_segments(
    mask: &BinaryImage,
    circles: &[Circle],
    params: &DetectionParams,
) -> Vec<Segment> {
    let strokes = erase_circles(mask, circles);
    let components = connected_components(&strokes);
    debug!("Segment detection: {} stroke components", components.len());

    components
        .iter()
        .filter_map(|pixels| fit_segment(pixels, params))
        .collect()
}

fn erase_circles(mask: &BinaryImage, circles: &[Circle]) -> BinaryImage {
    let mut strokes = mask.clone();
    for circle in circles {
        let reach = circle.radius + CIRCLE_MARGIN;
        let x0 = (circle.center.x - reach).floor().max(0.0) as u32;
        let y0 = (circle.center.y - reach).floor().max(0.0) as u32;
        let x1 = ((circle.center.x + reach).ceil() as u32).min(mask.width().saturating_sub(1));
        let y1 = ((circle.center.y + reach).ceil() as u32).min(mask.height().saturating_sub(1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                if circle.center.distance(Point::new(x as f32, y as f32)) <= reach {
                    strokes.set(x, y, false);
                }
            }
        }
    }
    strokes
}

/// 8-connected components of ink pixels
fn connected_components(mask: &BinaryImage) -> Vec<Vec<(u32, u32)>> {
    let (width, height) = (mask.width(), mask.height());
    let mut visited = vec![false; width as usize * height as usize];
    let mut components = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let idx = y as usize * width as usize + x as usize;
            if visited[idx] || !mask.get(x as i64, y as i64) {
                continue;
            }

            let mut pixels = Vec::new();
            let mut stack = vec![(x, y)];
            visited[idx] = true;
            while let Some((px, py)) = stack.pop() {
                pixels.push((px, py));
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        let (nx, ny) = (px as i64 + dx, py as i64 + dy);
                        if !mask.get(nx, ny) {
                            continue;
                        }
                        let nidx = ny as usize * width as usize + nx as usize;
                        if !visited[nidx] {
                            visited[nidx] = true;
                            stack.push((nx as u32, ny as u32));
                        }
                    }
                }
            }
            components.push(pixels);
        }
    }

    components
}

/// Max distance from the local center line among pixels selected by `in_zone`
fn end_spread(projected: &[(f32, f32)], in_zone: impl Fn(f32) -> bool) -> f32 {
    let offsets: Vec<f32> = projected
        .iter()
        .filter(|(t, _)| in_zone(*t))
        .map(|(_, s)| *s)
        .collect();
    if offsets.is_empty() {
        return 0.0;
    }
    let mean = offsets.iter().sum::<f32>() / offsets.len() as f32;
    offsets
        .iter()
        .map(|s| (s - mean).abs())
        .fold(0.0, f32::max)
}

fn fit_segment(pixels: &[(u32, u32)], params: &DetectionParams) -> Option<Segment> {
    if pixels.len() < params.min_segment_pixels {
        return None;
    }

    let n = pixels.len() as f32;
    let mx = pixels.iter().map(|p| p.0 as f32).sum::<f32>() / n;
    let my = pixels.iter().map(|p| p.1 as f32).sum::<f32>() / n;
    let (mut sxx, mut syy, mut sxy) = (0.0f32, 0.0f32, 0.0f32);
    for &(x, y) in pixels {
        let (dx, dy) = (x as f32 - mx, y as f32 - my);
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let angle = 0.5 * (2.0 * sxy).atan2(sxx - syy);
    let (ux, uy) = (angle.cos(), angle.sin());

    // (along-axis, across-axis) coordinates
    let projected: Vec<(f32, f32)> = pixels
        .iter()
        .map(|&(x, y)| {
            let (dx, dy) = (x as f32 - mx, y as f32 - my);
            (dx * ux + dy * uy, -dx * uy + dy * ux)
        })
        .collect();

    let t_min = projected.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
    let t_max = projected.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
    let length = t_max - t_min;
    if length < params.min_segment_length {
        return None;
    }

    let zone = (length * 0.25).min(HEAD_ZONE);
    let spread_low = end_spread(&projected, |t| t <= t_min + zone);
    let spread_high = end_spread(&projected, |t| t >= t_max - zone);
    let head_at_high = if spread_high > spread_low * HEAD_RATIO + HEAD_MARGIN {
        Some(true)
    } else if spread_low > spread_high * HEAD_RATIO + HEAD_MARGIN {
        Some(false)
    } else {
        None
    };

    let low = Point::new(mx + ux * t_min, my + uy * t_min);
    let high = Point::new(mx + ux * t_max, my + uy * t_max);
    let low_first = low.x < high.x || (low.x == high.x && low.y <= high.y);

    let (start, end) = if low_first { (low, high) } else { (high, low) };
    let head = head_at_high.map(|at_high| {
        if at_high == low_first {
            SegmentEnd::End
        } else {
            SegmentEnd::Start
        }
    });

    Some(Segment {
        start,
        end,
        head,
        pixel_count: pixels.len(),
    })
}
