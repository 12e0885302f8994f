// SPDX-License-Identifier: GPL-3.0-only

//! QR Scanner - live camera QR code scanning
//!
//! Frames are captured from a camera, searched for a QR code, annotated
//! with the code's bounding polygon and decoded text, and shown in a
//! window or the terminal. Decoded web URLs are opened in the browser.
//!
//! # Architecture
//!
//! - [`backends`]: camera capture via GStreamer
//! - [`frame_processor`]: QR detection and decoding
//! - [`overlay`]: drawing results onto frames
//! - [`dispatch`]: opening decoded URLs
//! - [`display`]: window and terminal display sinks
//! - [`scanner`]: the loop controller tying it together
//!
//! # Example
//!
//! ```ignore
//! let config = CameraConfig::default();
//! let scanner = Scanner::open(&config, || {
//!     Ok(Box::new(WindowSink::create(WINDOW_TITLE, 640, 480)?) as Box<dyn DisplaySink>)
//! })?;
//! scanner.run();
//! ```

pub mod backends;
pub mod constants;
pub mod dispatch;
pub mod display;
pub mod errors;
pub mod frame_processor;
pub mod overlay;
pub mod scanner;

// Re-export commonly used types
pub use backends::camera::{CameraConfig, Frame, FrameSource, GstCamera};
pub use dispatch::{SystemBrowser, UrlDispatcher, UrlOpener};
pub use display::{DisplaySink, KeyPress, TerminalSink, WindowSink};
pub use errors::{ScannerError, ScannerResult};
pub use frame_processor::{DecodedResult, Point, QrDecoder, QrDetector};
pub use overlay::OverlayRenderer;
pub use scanner::{Scanner, StopReason};
