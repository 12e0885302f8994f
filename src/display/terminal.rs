// SPDX-License-Identifier: GPL-3.0-only

//! Terminal display sink
//!
//! Renders annotated frames to the terminal using Unicode half-block
//! characters for improved vertical resolution. The bottom line is a
//! status bar showing the latest console notice.

use super::{DisplaySink, KeyPress};
use crate::backends::camera::Frame;
use crate::constants::{QUIT_KEY, WINDOW_TITLE};
use crate::errors::{ScannerError, ScannerResult};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Widget},
};
use std::io::{self, Stdout, stdout};
use std::time::Duration;
use tracing::warn;

/// Frames rendered into the terminal's alternate screen
pub struct TerminalSink {
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
    status_message: String,
}

impl TerminalSink {
    /// Switch the terminal to raw mode and the alternate screen
    pub fn create() -> ScannerResult<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }

        let backend = CrosstermBackend::new(stdout);
        let terminal = match Terminal::new(backend) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                return Err(e.into());
            }
        };

        Ok(Self {
            terminal: Some(terminal),
            status_message: build_status_message(),
        })
    }
}

impl DisplaySink for TerminalSink {
    fn show(&mut self, frame: &Frame) -> ScannerResult<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            return Err(ScannerError::Display("terminal already closed".into()));
        };

        let status_message = &self.status_message;
        terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            let view_area = Rect {
                height: area.height.saturating_sub(1),
                ..area
            };
            let status_area = Rect {
                y: area.y + area.height.saturating_sub(1),
                height: 1.min(area.height),
                ..area
            };

            let block = Block::bordered().title(WINDOW_TITLE);
            let inner = block.inner(view_area);
            f.render_widget(block, view_area);
            f.render_widget(FrameView { frame }, inner);
            f.render_widget(
                StatusBar {
                    message: status_message,
                },
                status_area,
            );
        })?;

        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> ScannerResult<KeyPress> {
        if self.terminal.is_none() {
            return Ok(KeyPress::Closed);
        }

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // Raw mode swallows SIGINT, so Ctrl+C arrives as a key
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(KeyPress::Interrupt);
            }
            if let KeyCode::Char(c) = key.code {
                return Ok(KeyPress::Char(c));
            }
        }

        Ok(KeyPress::None)
    }

    fn notice(&mut self, line: &str) {
        self.status_message = format!("{} | '{}' quit", line, QUIT_KEY);
    }

    fn close(&mut self) {
        let Some(mut terminal) = self.terminal.take() else {
            return;
        };

        // Restore terminal
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "Failed to leave raw mode");
        }
        if let Err(e) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
            warn!(error = %e, "Failed to leave alternate screen");
        }
        if let Err(e) = terminal.show_cursor() {
            warn!(error = %e, "Failed to show cursor");
        }
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        self.close();
    }
}

fn build_status_message() -> String {
    format!("Point the camera at a QR code | '{}' quit", QUIT_KEY)
}

/// Widget that renders a frame using half-block characters
struct FrameView<'a> {
    frame: &'a Frame,
}

impl Widget for FrameView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame = self.frame;
        if frame.width() == 0 || frame.height() == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        // Calculate display dimensions maintaining aspect ratio
        // Each terminal cell displays 2 vertical pixels using half-block characters
        let frame_aspect = frame.width() as f64 / frame.height() as f64;
        let term_width = area.width as f64;
        let term_height = (area.height as f64) * 2.0;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            // Terminal is wider - fit to height
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            // Terminal is taller - fit to width
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };

        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width() as f64 / display_width as f64;
        let y_scale = frame.height() as f64 / (display_height as f64 * 2.0);

        // Upper half (▀) colored with fg, lower half with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(sample_pixel(frame, src_x, src_y_top));
                    cell.set_bg(sample_pixel(frame, src_x, src_y_bottom));
                }
            }
        }
    }
}

fn sample_pixel(frame: &Frame, x: u32, y: u32) -> Color {
    let x = x.min(frame.width() - 1);
    let y = y.min(frame.height() - 1);
    let [r, g, b] = frame.get_pixel(x, y).0;
    Color::Rgb(r, g, b)
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        // Truncate on a char boundary
        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}
