// SPDX-License-Identifier: GPL-3.0-only

//! Frame overlay for detected QR codes
//!
//! Draws the bounding polygon and the decoded text straight into the
//! frame buffer. All drawing is clipped to the frame, so corner points
//! outside the image are fine.

pub mod font;

use crate::backends::camera::Frame;
use crate::constants::overlay;
use crate::frame_processor::{DecodedResult, Point};
use image::Rgb;

/// Draws decoder results onto frames
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    color: Rgb<u8>,
    stroke_width: u32,
    label_scale: u32,
    label_margin: i32,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self {
            color: Rgb(overlay::COLOR),
            stroke_width: overlay::STROKE_WIDTH,
            label_scale: overlay::LABEL_SCALE,
            label_margin: overlay::LABEL_MARGIN,
        }
    }
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotate `frame` with `result`
    ///
    /// Without points this is a no-op. With N points it draws N segments,
    /// closing the polygon, then the label if there is text.
    pub fn render(&self, frame: &mut Frame, result: &DecodedResult) {
        let Some(points) = result.points.as_deref() else {
            return;
        };

        for (from, to) in polygon_segments(points) {
            self.draw_segment(frame, from, to);
        }

        if let (Some(text), Some(anchor)) = (result.text.as_deref(), points.first()) {
            let baseline = anchor.y as i64 - self.label_margin as i64;
            self.draw_label(frame, text, anchor.x as i64, baseline);
        }
    }

    fn draw_segment(&self, frame: &mut Frame, from: Point, to: Point) {
        let pad = self.stroke_width as i64;
        let min = (-pad, -pad);
        let max = (frame.width() as i64 - 1 + pad, frame.height() as i64 - 1 + pad);

        let Some(((mut x0, mut y0), (x1, y1))) = clip_segment(
            (from.x as i64, from.y as i64),
            (to.x as i64, to.y as i64),
            min,
            max,
        ) else {
            return;
        };

        // Bresenham
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            self.stamp(frame, x0, y0);

            if x0 == x1 && y0 == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x0 += sx;
            }
            if e2 < dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Paint a stroke-width square centered on (x, y)
    fn stamp(&self, frame: &mut Frame, x: i64, y: i64) {
        let size = self.stroke_width.max(1) as i64;
        let offset = size / 2;
        fill_rect(frame, x - offset, y - offset, size, size, self.color);
    }

    /// Draw `text` with its baseline at `baseline`, starting at `x`
    fn draw_label(&self, frame: &mut Frame, text: &str, x: i64, baseline: i64) {
        let scale = self.label_scale.max(1) as i64;
        let top = baseline - font::GLYPH_HEIGHT as i64 * scale;

        for (index, c) in text.chars().enumerate() {
            let origin_x = x + index as i64 * font::ADVANCE as i64 * scale;
            if origin_x >= frame.width() as i64 {
                break;
            }

            let columns = font::glyph(c);
            for col in 0..font::GLYPH_WIDTH {
                for row in 0..font::GLYPH_HEIGHT {
                    if font::is_set(&columns, col, row) {
                        fill_rect(
                            frame,
                            origin_x + col as i64 * scale,
                            top + row as i64 * scale,
                            scale,
                            scale,
                            self.color,
                        );
                    }
                }
            }
        }
    }
}

/// Consecutive point pairs, wrapping last-to-first
pub fn polygon_segments(points: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    points
        .iter()
        .enumerate()
        .map(move |(i, &from)| (from, points[(i + 1) % points.len()]))
}

fn fill_rect(frame: &mut Frame, x: i64, y: i64, width: i64, height: i64, color: Rgb<u8>) {
    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + width).min(frame.width() as i64);
    let y_end = (y + height).min(frame.height() as i64);

    for py in y_start..y_end {
        for px in x_start..x_end {
            frame.put_pixel(px as u32, py as u32, color);
        }
    }
}

type Coord = (i64, i64);

/// Cohen-Sutherland clip of segment `a`-`b` to the box `min`..=`max`
fn clip_segment(mut a: Coord, mut b: Coord, min: Coord, max: Coord) -> Option<(Coord, Coord)> {
    const LEFT: u8 = 1;
    const RIGHT: u8 = 2;
    const TOP: u8 = 4;
    const BOTTOM: u8 = 8;

    let outcode = |(x, y): Coord| {
        let mut code = 0;
        if x < min.0 {
            code |= LEFT;
        } else if x > max.0 {
            code |= RIGHT;
        }
        if y < min.1 {
            code |= TOP;
        } else if y > max.1 {
            code |= BOTTOM;
        }
        code
    };

    let mut code_a = outcode(a);
    let mut code_b = outcode(b);

    loop {
        if code_a | code_b == 0 {
            return Some((a, b));
        }
        if code_a & code_b != 0 {
            return None;
        }

        let out = if code_a != 0 { code_a } else { code_b };
        let ((x0, y0), (x1, y1)) = (a, b);

        let clipped = if out & TOP != 0 {
            (x0 + (x1 - x0) * (min.1 - y0) / (y1 - y0), min.1)
        } else if out & BOTTOM != 0 {
            (x0 + (x1 - x0) * (max.1 - y0) / (y1 - y0), max.1)
        } else if out & RIGHT != 0 {
            (max.0, y0 + (y1 - y0) * (max.0 - x0) / (x1 - x0))
        } else {
            (min.0, y0 + (y1 - y0) * (min.0 - x0) / (x1 - x0))
        };

        if out == code_a {
            a = clipped;
            code_a = outcode(a);
        } else {
            b = clipped;
            code_b = outcode(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

    fn square(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    fn green_count(frame: &Frame) -> usize {
        frame.pixels().filter(|p| **p == GREEN).count()
    }

    #[test]
    fn test_no_points_is_noop() {
        let mut frame = Frame::new(32, 32);
        let untouched = frame.clone();

        OverlayRenderer::new().render(&mut frame, &DecodedResult::default());
        assert_eq!(frame, untouched);

        // Text alone is not enough to draw anything
        let text_only = DecodedResult {
            text: Some("orphan".into()),
            points: None,
        };
        OverlayRenderer::new().render(&mut frame, &text_only);
        assert_eq!(frame, untouched);
    }

    #[test]
    fn test_segments_wrap_around() {
        let points = square(0, 0, 10, 10);
        let segments: Vec<_> = polygon_segments(&points).collect();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], (points[0], points[1]));
        assert_eq!(segments[3], (points[3], points[0]));

        let triangle = [Point::new(0, 0), Point::new(5, 0), Point::new(0, 5)];
        assert_eq!(polygon_segments(&triangle).count(), 3);
    }

    #[test]
    fn test_every_edge_is_drawn() {
        let mut frame = Frame::new(64, 64);
        let result = DecodedResult::new(None, Some(square(10, 10, 50, 50)));
        OverlayRenderer::new().render(&mut frame, &result);

        // Midpoint of each edge
        assert_eq!(*frame.get_pixel(30, 10), GREEN);
        assert_eq!(*frame.get_pixel(50, 30), GREEN);
        assert_eq!(*frame.get_pixel(30, 50), GREEN);
        assert_eq!(*frame.get_pixel(10, 30), GREEN);
        // Interior stays untouched
        assert_eq!(*frame.get_pixel(30, 30), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_render_twice_matches_once() {
        let result = DecodedResult::decoded("https://example.com", square(12, 30, 52, 60));

        let mut once = Frame::new(80, 80);
        OverlayRenderer::new().render(&mut once, &result);

        let mut twice = Frame::new(80, 80);
        OverlayRenderer::new().render(&mut twice, &result);
        OverlayRenderer::new().render(&mut twice, &result);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_label_sits_above_first_point() {
        let mut frame = Frame::new(96, 96);
        let result = DecodedResult::decoded("HI", square(20, 60, 80, 90));
        OverlayRenderer::new().render(&mut frame, &result);

        // Baseline is 10px above y=60, glyphs are 14px tall
        let label_pixels = (46..50)
            .flat_map(|y| (20..44).map(move |x| (x, y)))
            .filter(|&(x, y)| *frame.get_pixel(x, y) == GREEN)
            .count();
        assert!(label_pixels > 0);

        // Nothing between the baseline and the polygon's top edge
        for y in 51..58 {
            for x in 20..44 {
                assert_ne!(*frame.get_pixel(x, y), GREEN, "stray pixel at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_label_without_text_is_skipped() {
        let points = square(20, 60, 80, 90);

        let mut with_text = Frame::new(96, 96);
        OverlayRenderer::new().render(&mut with_text, &DecodedResult::decoded("X", points.clone()));

        let mut without_text = Frame::new(96, 96);
        OverlayRenderer::new().render(&mut without_text, &DecodedResult::new(None, Some(points)));

        assert!(green_count(&with_text) > green_count(&without_text));
    }

    #[test]
    fn test_off_frame_polygon_is_clipped() {
        let mut frame = Frame::new(40, 40);
        let result = DecodedResult::decoded(
            "far away",
            vec![
                Point::new(-1_000_000, 20),
                Point::new(1_000_000, 20),
                Point::new(20, i32::MAX / 2),
            ],
        );
        OverlayRenderer::new().render(&mut frame, &result);

        // The horizontal edge crosses the frame
        assert_eq!(*frame.get_pixel(0, 20), GREEN);
        assert_eq!(*frame.get_pixel(39, 20), GREEN);
    }

    #[test]
    fn test_fully_outside_draws_nothing() {
        let mut frame = Frame::new(16, 16);
        let result = DecodedResult::new(None, Some(square(100, 100, 200, 200)));
        OverlayRenderer::new().render(&mut frame, &result);
        assert_eq!(green_count(&frame), 0);
    }

    #[test]
    fn test_extreme_label_anchor_does_not_overflow() {
        let mut frame = Frame::new(16, 16);
        let corner = Point::new(i32::MIN, i32::MIN);
        let result = DecodedResult::decoded("edge", vec![corner, corner, corner]);
        OverlayRenderer::new().render(&mut frame, &result);
        assert_eq!(green_count(&frame), 0);

        let result = DecodedResult::decoded(
            "edge",
            vec![Point::new(i32::MAX, i32::MAX), Point::new(0, 0), Point::new(0, 8)],
        );
        OverlayRenderer::new().render(&mut frame, &result);
        assert_eq!(*frame.get_pixel(0, 4), GREEN);
    }

    #[test]
    fn test_clip_segment_inside_unchanged() {
        let clipped = clip_segment((1, 2), (5, 6), (0, 0), (10, 10));
        assert_eq!(clipped, Some(((1, 2), (5, 6))));
    }

    #[test]
    fn test_clip_segment_crossing() {
        let clipped = clip_segment((-10, 5), (20, 5), (0, 0), (10, 10));
        assert_eq!(clipped, Some(((0, 5), (10, 5))));
    }
}
