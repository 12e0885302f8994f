// SPDX-License-Identifier: GPL-3.0-only

//! Frame analysis
//!
//! The scanner asks a [`QrDecoder`] for the code in every frame it reads.

pub mod qr_detector;
pub mod types;

pub use qr_detector::QrDetector;
pub use types::{DecodedResult, Point};

use crate::backends::camera::Frame;
use crate::errors::ScannerResult;

/// Locates and decodes a QR code in a frame
///
/// Implementations return synchronously and never block indefinitely.
pub trait QrDecoder {
    fn detect_and_decode(&mut self, frame: &Frame) -> ScannerResult<DecodedResult>;
}
