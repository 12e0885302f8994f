// SPDX-License-Identifier: GPL-3.0-only

//! Scanning loop controller
//!
//! [`Scanner`] owns the camera, decoder, overlay renderer, URL dispatcher
//! and display sink for one session:
//!
//! ```text
//! read ─► decode ─► overlay ─► dispatch ─► show ─► poll key ─┐
//!  ▲                                                          │
//!  └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop stops on the quit key, a failed read, an interrupt, or the
//! window being closed. Every other per-frame error is reported and the
//! loop moves on. The camera is released and the display closed exactly
//! once, whichever way the loop ends.

use crate::backends::camera::{CameraConfig, Frame, FrameSource, GstCamera};
use crate::constants::{QUIT_KEY, timing};
use crate::dispatch::{Dispatch, SystemBrowser, UrlDispatcher};
use crate::display::{DisplaySink, KeyPress};
use crate::errors::{ScannerError, ScannerResult};
use crate::frame_processor::{QrDecoder, QrDetector};
use crate::overlay::OverlayRenderer;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Why the scanning loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The quit key was pressed
    QuitKey,
    /// The camera stopped delivering frames
    CaptureFailed,
    /// SIGINT, or Ctrl+C from a raw-mode terminal
    Interrupted,
    /// The display window was closed
    DisplayClosed,
}

/// One scanning session
pub struct Scanner {
    camera: Box<dyn FrameSource>,
    decoder: Box<dyn QrDecoder>,
    overlay: OverlayRenderer,
    dispatcher: UrlDispatcher,
    display: Box<dyn DisplaySink>,
    console: Box<dyn Write>,
    interrupt: Arc<AtomicBool>,
    closed: bool,
}

impl Scanner {
    /// Assemble a scanner from already-opened parts
    ///
    /// Defaults: system browser for URLs, stdout for console lines.
    pub fn new(
        camera: Box<dyn FrameSource>,
        decoder: Box<dyn QrDecoder>,
        display: Box<dyn DisplaySink>,
    ) -> Self {
        Self {
            camera,
            decoder,
            overlay: OverlayRenderer::new(),
            dispatcher: UrlDispatcher::new(Box::new(SystemBrowser)),
            display,
            console: Box::new(std::io::stdout()),
            interrupt: Arc::new(AtomicBool::new(false)),
            closed: false,
        }
    }

    /// Open the camera, then create the display
    ///
    /// Camera failure surfaces as `DeviceUnavailable` before any display
    /// exists. If the display cannot be created the camera is released.
    pub fn open<F>(config: &CameraConfig, create_display: F) -> ScannerResult<Self>
    where
        F: FnOnce() -> ScannerResult<Box<dyn DisplaySink>>,
    {
        let mut camera = GstCamera::open(config)?;
        let display = match create_display() {
            Ok(display) => display,
            Err(e) => {
                camera.release();
                return Err(e);
            }
        };

        Ok(Self::new(
            Box::new(camera),
            Box::new(QrDetector::new()),
            display,
        ))
    }

    /// Replace the URL dispatcher
    pub fn with_dispatcher(mut self, dispatcher: UrlDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Replace the console that receives decoded text and error notices
    pub fn with_console(mut self, console: Box<dyn Write>) -> Self {
        self.console = console;
        self
    }

    /// Flag that stops the loop at the start of the next iteration when set
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Run until a stop condition, then close
    pub fn run(mut self) -> StopReason {
        info!("Scanner running");

        let reason = loop {
            if let Some(reason) = self.step() {
                break reason;
            }
        };

        info!(?reason, "Scanner stopping");
        self.close();
        reason
    }

    /// Release the camera and close the display; idempotent
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.camera.release();
        self.display.close();
        if let Err(e) = self.console.flush() {
            debug!(error = %e, "Console flush failed");
        }
        info!("Scanner closed");
    }

    /// One loop iteration; `Some` means stop
    fn step(&mut self) -> Option<StopReason> {
        if self.interrupt.load(Ordering::SeqCst) {
            return Some(StopReason::Interrupted);
        }

        let mut frame = match self.camera.read() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Camera read failed");
                self.report("Failed to capture image");
                return Some(StopReason::CaptureFailed);
            }
        };

        self.annotate(&mut frame);

        if let Err(e) = self.display.show(&frame) {
            self.report_error(&e);
        }

        match self.display.poll_key(timing::KEY_POLL_TIMEOUT) {
            Ok(KeyPress::Char(QUIT_KEY)) => Some(StopReason::QuitKey),
            Ok(KeyPress::Interrupt) => Some(StopReason::Interrupted),
            Ok(KeyPress::Closed) => Some(StopReason::DisplayClosed),
            Ok(KeyPress::Char(_) | KeyPress::None) => None,
            Err(e) => {
                self.report_error(&e);
                None
            }
        }
    }

    /// Decode, report, draw and dispatch for one frame
    fn annotate(&mut self, frame: &mut Frame) {
        let result = match self.decoder.detect_and_decode(frame) {
            Ok(result) => result,
            Err(e) => {
                self.report_error(&e);
                return;
            }
        };

        if let Some(text) = result.text.as_deref() {
            self.report(&format!("Decoded Text: {}", text));
        }

        self.overlay.render(frame, &result);

        // Dispatch only for codes that were both located and decoded
        if let (Some(text), Some(_)) = (result.text.as_deref(), result.points.as_ref()) {
            match self.dispatcher.dispatch(text) {
                Ok(Dispatch::Opened) => debug!(url = %text, "Dispatched URL"),
                Ok(_) => {}
                Err(e) => self.report_error(&e),
            }
        }
    }

    fn report_error(&mut self, err: &ScannerError) {
        warn!(error = %err, "Frame error");
        let line = match err {
            ScannerError::BrowserLaunchFailure(_) => format!("Failed to open URL: {}", err),
            _ => format!("Error occurred: {}", err),
        };
        self.report(&line);
    }

    /// Write a console line and mirror it to the display
    fn report(&mut self, line: &str) {
        if let Err(e) = writeln!(self.console, "{}", line) {
            debug!(error = %e, "Console write failed");
        }
        self.display.notice(line);
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        self.close();
    }
}
