// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Title of the preview window (and of the terminal view's title bar)
pub const WINDOW_TITLE: &str = "QR Code Scanner";

/// Default capture resolution
pub mod capture {
    /// Requested frame width in pixels
    pub const DEFAULT_WIDTH: u32 = 640;
    /// Requested frame height in pixels
    pub const DEFAULT_HEIGHT: u32 = 480;
}

/// Overlay appearance
pub mod overlay {
    /// Stroke and label color (RGB)
    pub const COLOR: [u8; 3] = [0, 255, 0];
    /// Bounding polygon stroke width in pixels
    pub const STROKE_WIDTH: u32 = 2;
    /// Gap between the first polygon point and the label baseline
    pub const LABEL_MARGIN: i32 = 10;
    /// Integer upscale applied to the 5x7 label font
    pub const LABEL_SCALE: u32 = 2;
}

/// Loop and pipeline timing
pub mod timing {
    use super::Duration;

    /// How long the display sink waits for a keystroke each iteration
    pub const KEY_POLL_TIMEOUT: Duration = Duration::from_millis(1);
    /// Upper bound on a single blocking frame read
    pub const READ_TIMEOUT_SECS: u64 = 5;
    /// Upper bound on the pipeline reaching PLAYING
    pub const START_TIMEOUT_SECS: u64 = 5;
    /// Upper bound on the pipeline reaching NULL during release
    pub const STOP_TIMEOUT_SECS: u64 = 2;
    /// An identical URL is not re-opened within this window
    pub const DISPATCH_COOLDOWN: Duration = Duration::from_secs(5);
}

/// Prefixes that mark decoded text as a web URL
pub const WEB_URL_PREFIXES: [&str; 2] = ["http://", "https://"];

/// Key that ends the scanning loop
pub const QUIT_KEY: char = 'q';
