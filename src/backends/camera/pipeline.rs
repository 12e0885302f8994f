// SPDX-License-Identifier: GPL-3.0-only

//! GStreamer capture pipeline
//!
//! `v4l2src ! videoconvert ! videoscale ! RGB caps ! appsink`, pulled
//! synchronously from the scanning loop.

use super::FrameSource;
use super::types::{CameraConfig, Frame};
use crate::constants::timing;
use crate::errors::{ScannerError, ScannerResult};
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use tracing::{debug, error, info, warn};

/// Bytes per pixel of the RGB frames the pipeline produces
const RGB_CHANNELS: usize = 3;

/// Camera opened through a GStreamer pipeline
pub struct GstCamera {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
    released: bool,
}

impl GstCamera {
    /// Open the configured device and start streaming
    ///
    /// Fails with `DeviceUnavailable` if the pipeline cannot be built or
    /// does not reach PLAYING.
    pub fn open(config: &CameraConfig) -> ScannerResult<Self> {
        info!(camera = %config, "Opening camera");

        gstreamer::init()
            .map_err(|e| ScannerError::DeviceUnavailable(format!("GStreamer init failed: {}", e)))?;

        let description = build_pipeline_string(config);
        debug!(pipeline = %description, "Launching capture pipeline");

        let pipeline = gstreamer::parse::launch(&description)?
            .downcast::<gstreamer::Pipeline>()
            .map_err(|_| ScannerError::DeviceUnavailable("Failed to downcast to Pipeline".into()))?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| ScannerError::DeviceUnavailable("Failed to get appsink".into()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| ScannerError::DeviceUnavailable("Failed to cast appsink".into()))?;

        if let Err(e) = pipeline.set_state(gstreamer::State::Playing) {
            let reason = take_bus_error(&pipeline)
                .unwrap_or_else(|| format!("Failed to set pipeline to PLAYING: {}", e));
            shut_down(&pipeline);
            return Err(ScannerError::DeviceUnavailable(reason));
        }

        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(?result, ?state, ?pending, "Pipeline state");

        if result.is_err() || state != gstreamer::State::Playing {
            let reason = take_bus_error(&pipeline).unwrap_or_else(|| {
                format!("Pipeline failed to start (state: {:?}, result: {:?})", state, result)
            });
            error!(reason = %reason, "Camera did not start");
            shut_down(&pipeline);
            return Err(ScannerError::DeviceUnavailable(reason));
        }

        info!("Camera streaming");

        Ok(Self {
            pipeline,
            appsink,
            released: false,
        })
    }
}

impl FrameSource for GstCamera {
    fn read(&mut self) -> ScannerResult<Frame> {
        if self.released {
            return Err(ScannerError::CaptureFailure("camera already released".into()));
        }

        let timeout = gstreamer::ClockTime::from_seconds(timing::READ_TIMEOUT_SECS);
        let Some(sample) = self.appsink.try_pull_sample(timeout) else {
            let reason = if self.appsink.is_eos() {
                "end of stream".to_string()
            } else {
                take_bus_error(&self.pipeline).unwrap_or_else(|| {
                    format!("no frame within {}s", timing::READ_TIMEOUT_SECS)
                })
            };
            return Err(ScannerError::CaptureFailure(reason));
        };

        sample_to_frame(&sample)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        info!("Releasing camera");
        shut_down(&self.pipeline);
    }
}

impl Drop for GstCamera {
    fn drop(&mut self) {
        self.release();
    }
}

/// Build the gst-launch description for a capture configuration
pub(crate) fn build_pipeline_string(config: &CameraConfig) -> String {
    let source = match config.device.as_deref() {
        Some(device) if !device.is_empty() => format!("v4l2src device=\"{}\"", device),
        _ => "v4l2src".to_string(),
    };

    format!(
        "{} ! videoconvert ! videoscale ! \
         video/x-raw,format=RGB,width=(int){},height=(int){} ! \
         appsink name=sink max-buffers=1 drop=true sync=false enable-last-sample=false",
        source, config.width, config.height
    )
}

/// Copy a pulled sample into an owned frame
fn sample_to_frame(sample: &gstreamer::Sample) -> ScannerResult<Frame> {
    let caps = sample
        .caps()
        .ok_or_else(|| ScannerError::CaptureFailure("No caps in sample".into()))?;
    let video_info = VideoInfo::from_caps(caps)
        .map_err(|e| ScannerError::CaptureFailure(format!("Failed to get video info: {}", e)))?;
    let buffer = sample
        .buffer()
        .ok_or_else(|| ScannerError::CaptureFailure("No buffer in sample".into()))?;
    let map = buffer
        .map_readable()
        .map_err(|_| ScannerError::CaptureFailure("Failed to map buffer".into()))?;

    let width = video_info.width();
    let height = video_info.height();
    let stride = video_info.stride()[0] as usize;

    let data = copy_rows_without_stride(map.as_slice(), width as usize, height as usize, stride);
    Frame::from_raw(width, height, data).ok_or_else(|| {
        ScannerError::CaptureFailure(format!(
            "Short buffer for {}x{} frame ({} bytes, stride {})",
            width,
            height,
            map.as_slice().len(),
            stride
        ))
    })
}

/// Copy packed RGB rows, dropping per-row stride padding
fn copy_rows_without_stride(data: &[u8], width: usize, height: usize, stride: usize) -> Vec<u8> {
    let row_len = width * RGB_CHANNELS;
    let mut result = Vec::with_capacity(row_len * height);

    for y in 0..height {
        let row_start = y * stride;
        let row_end = row_start + row_len;
        if row_end <= data.len() {
            result.extend_from_slice(&data[row_start..row_end]);
        }
    }

    result
}

/// Pop the first pending error (or warning) off the pipeline bus
fn take_bus_error(pipeline: &gstreamer::Pipeline) -> Option<String> {
    let bus = pipeline.bus()?;
    let msg = bus.timed_pop_filtered(
        gstreamer::ClockTime::from_mseconds(100),
        &[gstreamer::MessageType::Error, gstreamer::MessageType::Warning],
    )?;

    match msg.view() {
        gstreamer::MessageView::Error(err) => {
            error!(
                error = %err.error(),
                debug = ?err.debug(),
                source = ?err.src().map(|s| s.name()),
                "GStreamer error"
            );
            Some(err.error().to_string())
        }
        gstreamer::MessageView::Warning(warn_msg) => {
            warn!(warning = %warn_msg.error(), debug = ?warn_msg.debug(), "GStreamer warning");
            Some(warn_msg.error().to_string())
        }
        _ => None,
    }
}

/// Drive the pipeline to NULL and wait for the device to be let go
fn shut_down(pipeline: &gstreamer::Pipeline) {
    if let Err(e) = pipeline.set_state(gstreamer::State::Null) {
        warn!(error = %e, "Failed to set pipeline to NULL");
    }

    let (result, state, _) = pipeline.state(gstreamer::ClockTime::from_seconds(
        timing::STOP_TIMEOUT_SECS,
    ));
    match result {
        Ok(_) => debug!(state = ?state, "Pipeline stopped"),
        Err(e) => debug!(error = ?e, state = ?state, "Pipeline state change had issues"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_rows_without_stride() {
        // 2x2 RGB frame, rows padded to 8 bytes
        let data: Vec<u8> = vec![
            255, 0, 0, // Red
            0, 255, 0, // Green
            0, 0, // padding
            0, 0, 255, // Blue
            255, 255, 255, // White
            0, 0, // padding
        ];

        let result = copy_rows_without_stride(&data, 2, 2, 8);
        assert_eq!(result.len(), 12);
        assert_eq!(&result[0..3], &[255, 0, 0]);
        assert_eq!(&result[3..6], &[0, 255, 0]);
        assert_eq!(&result[6..9], &[0, 0, 255]);
        assert_eq!(&result[9..12], &[255, 255, 255]);
    }

    #[test]
    fn test_copy_rows_truncated_buffer() {
        // Second row is missing; only complete rows are copied
        let data: Vec<u8> = vec![1, 2, 3, 4, 5, 6];
        let result = copy_rows_without_stride(&data, 2, 2, 6);
        assert_eq!(result, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_pipeline_string_default_device() {
        let description = build_pipeline_string(&CameraConfig::default());
        assert!(description.starts_with("v4l2src !"));
        assert!(description.contains("format=RGB,width=(int)640,height=(int)480"));
        assert!(description.contains("appsink name=sink"));
    }

    #[test]
    fn test_pipeline_string_explicit_device() {
        let config = CameraConfig {
            device: Some("/dev/video2".into()),
            width: 1280,
            height: 720,
        };
        let description = build_pipeline_string(&config);
        assert!(description.starts_with("v4l2src device=\"/dev/video2\" !"));
        assert!(description.contains("width=(int)1280,height=(int)720"));
    }
}
