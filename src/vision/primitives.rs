// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Geometric primitives and text tokens found in a diagram image

use serde::{Deserialize, Serialize};

/// A point in image pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Axis-aligned bounding box for detected text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn center(&self) -> Point {
        Point::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

/// A piece of recognized text with its location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToken {
    pub text: String,
    /// Recognition confidence (0.0-1.0)
    pub confidence: f32,
    pub bounding_box: BoundingBox,
}

impl TextToken {
    pub fn center(&self) -> Point {
        self.bounding_box.center()
    }
}

/// A detected state outline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
    /// A concentric inner ring was found (final state marker)
    pub double: bool,
}

impl Circle {
    /// Distance from `point` to the circle outline
    pub fn boundary_distance(&self, point: Point) -> f32 {
        (self.center.distance(point) - self.radius).abs()
    }

    pub fn contains(&self, point: Point) -> bool {
        self.center.distance(point) < self.radius
    }
}

/// Which end of a segment carries an arrow head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentEnd {
    Start,
    End,
}

/// A stroke outside every state outline, approximated by its principal axis
///
/// `start` is always the left-most endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub head: Option<SegmentEnd>,
    pub pixel_count: usize,
}

impl Segment {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }

    pub fn endpoint(&self, end: SegmentEnd) -> Point {
        match end {
            SegmentEnd::Start => self.start,
            SegmentEnd::End => self.end,
        }
    }
}

/// Everything the extractor found in one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub width: u32,
    pub height: u32,
    pub tokens: Vec<TextToken>,
    pub circles: Vec<Circle>,
    pub segments: Vec<Segment>,
}
