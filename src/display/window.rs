// SPDX-License-Identifier: GPL-3.0-only

//! Native preview window

use super::{DisplaySink, KeyPress};
use crate::backends::camera::Frame;
use crate::errors::{ScannerError, ScannerResult};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::time::Duration;
use tracing::{debug, info};

/// Window refresh cap; paces the loop at roughly the key-poll interval
const TARGET_FPS: usize = 1000;

/// Frames shown in a native window
pub struct WindowSink {
    window: Option<Window>,
    buffer: Vec<u32>,
}

impl WindowSink {
    /// Open a window of the given size
    pub fn create(title: &str, width: usize, height: usize) -> ScannerResult<Self> {
        info!(title, width, height, "Creating preview window");

        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| ScannerError::Display(format!("Failed to create window: {}", e)))?;
        window.set_target_fps(TARGET_FPS);

        Ok(Self {
            window: Some(window),
            buffer: Vec::with_capacity(width * height),
        })
    }
}

impl DisplaySink for WindowSink {
    fn show(&mut self, frame: &Frame) -> ScannerResult<()> {
        let Some(window) = self.window.as_mut() else {
            return Err(ScannerError::Display("window already closed".into()));
        };

        rgb_to_0rgb(frame, &mut self.buffer);
        window
            .update_with_buffer(&self.buffer, frame.width() as usize, frame.height() as usize)
            .map_err(|e| ScannerError::Display(e.to_string()))
    }

    fn poll_key(&mut self, _timeout: Duration) -> ScannerResult<KeyPress> {
        // minifb pumps events inside update_with_buffer, paced by the target
        // fps, so there is nothing left to wait on here.
        let Some(window) = self.window.as_ref() else {
            return Ok(KeyPress::Closed);
        };

        if !window.is_open() {
            return Ok(KeyPress::Closed);
        }

        let keys = window.get_keys_pressed(KeyRepeat::No);
        let ctrl = window.is_key_down(Key::LeftCtrl) || window.is_key_down(Key::RightCtrl);

        if ctrl && keys.contains(&Key::C) {
            return Ok(KeyPress::Interrupt);
        }
        Ok(keys
            .iter()
            .find_map(|key| key_char(*key))
            .map_or(KeyPress::None, KeyPress::Char))
    }

    fn close(&mut self) {
        if self.window.take().is_some() {
            debug!("Preview window closed");
        }
    }
}

impl Drop for WindowSink {
    fn drop(&mut self) {
        self.close();
    }
}

/// Character for the keys the scanner reacts to
fn key_char(key: Key) -> Option<char> {
    match key {
        Key::Q => Some('q'),
        _ => None,
    }
}

/// Pack RGB pixels into minifb's 0RGB u32 layout
fn rgb_to_0rgb(frame: &Frame, out: &mut Vec<u32>) {
    out.clear();
    out.extend(
        frame
            .pixels()
            .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32),
    );
}
