// SPDX-License-Identifier: GPL-3.0-only

//! Display sinks
//!
//! A sink is created before the loop starts, shows every annotated frame,
//! reports keystrokes, and is closed exactly once when the loop ends.
//!
//! - [`WindowSink`]: native window
//! - [`TerminalSink`]: half-block rendering in the terminal

pub mod terminal;
pub mod window;

pub use terminal::TerminalSink;
pub use window::WindowSink;

use crate::backends::camera::Frame;
use crate::errors::ScannerResult;
use std::time::Duration;

/// Result of one keyboard poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    /// Nothing pressed within the timeout
    None,
    /// A character key
    Char(char),
    /// Ctrl+C delivered as a key event
    Interrupt,
    /// The user closed the window
    Closed,
}

/// Where annotated frames go
pub trait DisplaySink {
    /// Present a frame
    fn show(&mut self, frame: &Frame) -> ScannerResult<()>;

    /// Wait up to `timeout` for a keystroke
    fn poll_key(&mut self, timeout: Duration) -> ScannerResult<KeyPress>;

    /// Surface a console line inside the display, for sinks that own the terminal
    fn notice(&mut self, _line: &str) {}

    /// Tear the display down; idempotent
    fn close(&mut self);
}
