// SPDX-License-Identifier: GPL-3.0-only

//! Camera source
//!
//! The scanner pulls one frame at a time from a [`FrameSource`]. The
//! production source is a GStreamer pipeline ([`GstCamera`]); tests drive
//! the scanner with scripted sources instead.

pub mod enumeration;
pub mod pipeline;
pub mod types;

pub use enumeration::list_devices;
pub use pipeline::GstCamera;
pub use types::*;

use crate::errors::ScannerResult;

/// Synchronous frame source
pub trait FrameSource {
    /// Block until the next frame is available
    ///
    /// Returns `ScannerError::CaptureFailure` on end-of-stream, pipeline
    /// errors, or when no frame arrives in time. Callers treat a failure as
    /// the end of the stream.
    fn read(&mut self) -> ScannerResult<Frame>;

    /// Release the underlying device
    ///
    /// Must be idempotent: calls after the first do nothing.
    fn release(&mut self);
}
