// SPDX-License-Identifier: GPL-3.0-only

//! Video source enumeration through the GStreamer device monitor

use super::types::VideoSource;
use crate::errors::{ScannerError, ScannerResult};
use gstreamer::prelude::*;
use tracing::debug;

const VIDEO_SOURCE_CLASS: &str = "Video/Source";

/// Device properties that carry the V4L2 node path, newest first
const PATH_PROPERTIES: [&str; 2] = ["api.v4l2.path", "device.path"];

/// List the video sources GStreamer can see
pub fn list_devices() -> ScannerResult<Vec<VideoSource>> {
    gstreamer::init()?;

    let monitor = gstreamer::DeviceMonitor::new();
    if monitor.add_filter(Some(VIDEO_SOURCE_CLASS), None).is_none() {
        debug!(class = VIDEO_SOURCE_CLASS, "Device filter not added, listing all devices");
    }
    monitor
        .start()
        .map_err(|e| ScannerError::DeviceUnavailable(format!("Device monitor failed: {}", e)))?;

    let sources: Vec<VideoSource> = monitor
        .devices()
        .into_iter()
        .map(|device| {
            let path = device
                .properties()
                .and_then(|props| device_path(&props));
            VideoSource {
                name: device.display_name().to_string(),
                path,
            }
        })
        .collect();

    monitor.stop();

    debug!(count = sources.len(), "Enumerated video sources");
    Ok(sources)
}

fn device_path(props: &gstreamer::StructureRef) -> Option<String> {
    PATH_PROPERTIES
        .iter()
        .find_map(|key| props.get::<String>(*key).ok())
}
