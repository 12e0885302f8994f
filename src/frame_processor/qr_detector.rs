// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! Converts frames to grayscale and hands them to the rqrr crate, which
//! finds the code and decodes it. Only the first code in a frame is
//! reported.

use super::QrDecoder;
use super::types::{DecodedResult, Point};
use crate::backends::camera::Frame;
use crate::errors::{ScannerError, ScannerResult};
use std::time::Instant;
use tracing::{debug, trace};

/// QR code detector backed by rqrr
#[derive(Debug, Default)]
pub struct QrDetector;

impl QrDetector {
    pub fn new() -> Self {
        Self
    }
}

impl QrDecoder for QrDetector {
    fn detect_and_decode(&mut self, frame: &Frame) -> ScannerResult<DecodedResult> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(ScannerError::Decode(format!(
                "empty frame ({}x{})",
                width, height
            )));
        }

        let start = Instant::now();

        let gray = image::imageops::grayscale(frame);
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                gray.get_pixel(x as u32, y as u32).0[0]
            });
        let grids = prepared.detect_grids();

        trace!(
            count = grids.len(),
            detection_ms = start.elapsed().as_millis(),
            "QR detection complete"
        );

        let Some(grid) = grids.first() else {
            return Ok(DecodedResult::default());
        };

        let points: Vec<Point> = grid.bounds.iter().map(|p| Point::new(p.x, p.y)).collect();

        let text = match grid.decode() {
            Ok((_meta, content)) => {
                debug!(content = %content, corners = ?points, "Detected QR code");
                Some(content)
            }
            Err(e) => {
                debug!(error = %e, corners = ?points, "Located QR code could not be decoded");
                None
            }
        };

        Ok(DecodedResult::new(text, Some(points)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrcode::{Color, QrCode};

    /// Render `content` as a black-on-white symbol with a 4-module quiet zone
    fn qr_frame(content: &str, module_px: u32) -> Frame {
        let code = QrCode::new(content.as_bytes()).unwrap();
        let modules = code.width() as u32;
        let colors = code.to_colors();
        let quiet = 4;
        let size = (modules + 2 * quiet) * module_px;

        Frame::from_fn(size, size, |x, y| {
            let mx = (x / module_px) as i64 - quiet as i64;
            let my = (y / module_px) as i64 - quiet as i64;
            let inside = (0..modules as i64).contains(&mx) && (0..modules as i64).contains(&my);
            if inside && colors[(my as u32 * modules + mx as u32) as usize] == Color::Dark {
                image::Rgb([0, 0, 0])
            } else {
                image::Rgb([255, 255, 255])
            }
        })
    }

    #[test]
    fn test_decodes_url_with_corner_polygon() {
        let frame = qr_frame("https://example.com", 6);
        let result = QrDetector::new().detect_and_decode(&frame).unwrap();

        assert_eq!(result.text.as_deref(), Some("https://example.com"));

        let points = result.points.expect("located code has a polygon");
        assert_eq!(points.len(), 4);

        // Corners sit within two modules of the symbol edge
        let symbol_start = 4 * 6;
        let symbol_end = frame.width() as i32 - symbol_start;
        for point in &points {
            for coord in [point.x, point.y] {
                let near_start = (coord - symbol_start).abs() <= 12;
                let near_end = (coord - symbol_end).abs() <= 12;
                assert!(near_start || near_end, "corner {:?} off the symbol edge", point);
            }
        }
    }

    #[test]
    fn test_blank_frame_has_no_code() {
        let frame = Frame::from_pixel(64, 48, image::Rgb([255, 255, 255]));
        let result = QrDetector::new().detect_and_decode(&frame).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_noise_frame_has_no_code() {
        let frame = Frame::from_fn(80, 60, |x, y| {
            let v = ((x * 31 + y * 17) % 256) as u8;
            image::Rgb([v, v, v])
        });
        let result = QrDetector::new().detect_and_decode(&frame).unwrap();
        assert_eq!(result.text, None);
    }

    #[test]
    fn test_empty_frame_is_a_decode_error() {
        let frame = Frame::new(0, 0);
        let err = QrDetector::new().detect_and_decode(&frame).unwrap_err();
        assert!(matches!(err, ScannerError::Decode(_)));
    }
}
