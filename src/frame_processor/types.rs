// SPDX-License-Identifier: GPL-3.0-only

//! Decoder output types

/// A point in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// What the decoder found in one frame
///
/// Both fields absent means no code was found. `points` without `text`
/// means a code was located but could not be decoded. Built fresh every
/// frame; nothing carries over between frames.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedResult {
    /// Decoded content, never empty when present
    pub text: Option<String>,
    /// Closed polygon around the code in detection order, at least 3 points
    pub points: Option<Vec<Point>>,
}

impl DecodedResult {
    /// Minimum number of points that make a bounding polygon
    pub const MIN_POLYGON_POINTS: usize = 3;

    /// Build a result, dropping empty text and degenerate polygons
    pub fn new(text: Option<String>, points: Option<Vec<Point>>) -> Self {
        Self {
            text: text.filter(|t| !t.is_empty()),
            points: points.filter(|p| p.len() >= Self::MIN_POLYGON_POINTS),
        }
    }

    /// A located and decoded code
    pub fn decoded(text: impl Into<String>, points: Vec<Point>) -> Self {
        Self::new(Some(text.into()), Some(points))
    }

    /// True when nothing was detected
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.points.is_none()
    }
}
