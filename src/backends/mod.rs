// SPDX-License-Identifier: GPL-3.0-only

//! Hardware access
//!
//! Only video capture lives here; the scanner reads frames through the
//! [`camera::FrameSource`] trait.

pub mod camera;
