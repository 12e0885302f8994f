// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the scanner

use std::fmt;

/// Result type alias using ScannerError
pub type ScannerResult<T> = Result<T, ScannerError>;

/// Scanner error type
///
/// Each variant has its own recovery in the scanning loop:
/// `DeviceUnavailable` is fatal at startup, `CaptureFailure` ends the loop,
/// the rest are reported and the loop moves on to the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerError {
    /// Capture device could not be opened
    DeviceUnavailable(String),
    /// A frame could not be read from an open device
    CaptureFailure(String),
    /// The decoder rejected the frame
    Decode(String),
    /// The host refused to open a URL
    BrowserLaunchFailure(String),
    /// The display sink failed to create, show or poll
    Display(String),
}

impl fmt::Display for ScannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScannerError::DeviceUnavailable(msg) => write!(f, "Cannot open camera: {}", msg),
            ScannerError::CaptureFailure(msg) => write!(f, "Capture failed: {}", msg),
            ScannerError::Decode(msg) => write!(f, "Decode failed: {}", msg),
            ScannerError::BrowserLaunchFailure(msg) => write!(f, "{}", msg),
            ScannerError::Display(msg) => write!(f, "Display error: {}", msg),
        }
    }
}

impl std::error::Error for ScannerError {}

impl From<std::io::Error> for ScannerError {
    fn from(err: std::io::Error) -> Self {
        ScannerError::Display(err.to_string())
    }
}

impl From<gstreamer::glib::Error> for ScannerError {
    fn from(err: gstreamer::glib::Error) -> Self {
        ScannerError::DeviceUnavailable(err.to_string())
    }
}
