// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for the camera backend

use crate::constants::capture;

/// A captured frame
///
/// Packed RGB, row-major, no stride padding. Each loop iteration owns the
/// frame it read and drops it when the iteration ends.
pub type Frame = image::RgbImage;

/// Capture configuration, fixed once the device is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraConfig {
    /// V4L2 device path (e.g. `/dev/video2`); `None` selects the default device
    pub device: Option<String>,
    /// Requested frame width in pixels
    pub width: u32,
    /// Requested frame height in pixels
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: None,
            width: capture::DEFAULT_WIDTH,
            height: capture::DEFAULT_HEIGHT,
        }
    }
}

impl std::fmt::Display for CameraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} @ {}x{}",
            self.device.as_deref().unwrap_or("default camera"),
            self.width,
            self.height
        )
    }
}

/// A video source reported by the device monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    /// Human-readable device name
    pub name: String,
    /// Device node, when the provider exposes one
    pub path: Option<String>,
}
