// SPDX-License-Identifier: GPL-3.0-only

//! Capture pipeline abstraction
//!
//! The engine's property bag (string-keyed get/set on the source element)
//! stays behind the [`PipelineBackend`] trait: controllers only ever see
//! typed accessors, validated at this boundary.
//!
//! Two implementations exist: the GStreamer pipeline driving the sensor
//! ([`rpicam::RpicamPipeline`]) and a recording mock for tests
//! ([`mock::MockPipeline`]).

pub mod metadata;
pub mod mock;
pub mod rpicam;
pub mod session;

use crate::errors::AppResult;
use self::metadata::WhiteBalanceMode;
use std::path::PathBuf;

/// Asynchronous notification from the pipeline bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The file sink finished writing the temporary capture file
    FileWritten(PathBuf),
}

/// Callback invoked for every bus notification
///
/// Delivered from the pipeline's streaming thread; implementations must
/// only forward the event into the UI-thread channel.
pub type EventCallback = Box<dyn Fn(PipelineEvent) + Send + Sync>;

/// Typed adapter over the capture pipeline's control surface
pub trait PipelineBackend {
    /// Bring the pipeline to the playing state
    fn start(&mut self) -> AppResult<()>;

    /// Bring the pipeline to the stopped (null) state
    fn stop(&mut self) -> AppResult<()>;

    /// Current exposure time in microseconds; 0 while the sensor drives it
    fn shutter_speed(&self) -> u32;

    /// Set the exposure time in microseconds
    fn set_shutter_speed(&mut self, micros: u32);

    /// Current analog gain in vendor units (256 per 1x step)
    fn analog_gain(&self) -> u32;

    /// Set the analog gain
    fn set_analog_gain(&mut self, gain: u32);

    /// Current contrast in the -100..=100 hardware range
    fn contrast(&self) -> i32;

    /// Set the contrast
    fn set_contrast(&mut self, value: i32);

    /// Current saturation in the -100..=100 hardware range
    fn saturation(&self) -> i32;

    /// Set the saturation
    fn set_saturation(&mut self, value: i32);

    /// Current sharpness in the -100..=100 hardware range
    fn sharpness(&self) -> i32;

    /// Set the sharpness
    fn set_sharpness(&mut self, value: i32);

    /// Current automatic white balance mode
    fn awb_mode(&self) -> WhiteBalanceMode;

    /// Set the automatic white balance mode
    fn set_awb_mode(&mut self, mode: WhiteBalanceMode);

    /// Current annotation overlay mode flags
    fn annotation_mode(&self) -> u32;

    /// Set the annotation overlay mode flags
    fn set_annotation_mode(&mut self, flags: u32);

    /// Set the annotation overlay text size
    fn set_annotation_text_size(&mut self, size: u32);

    /// Set the annotation overlay text
    fn set_annotation_text(&mut self, text: &str);

    /// Negotiated frame size
    fn caps(&self) -> (u32, u32);

    /// Request a new frame size; the change takes effect on the next start
    fn set_caps(&mut self, width: u32, height: u32) -> AppResult<()>;

    /// Replace the capture tag set on the encoder's tag stage
    fn set_capture_tags(&mut self, tags: &str);

    /// Let buffers through to the capture branch
    fn open_capture_valve(&mut self) -> AppResult<()>;

    /// Block the capture branch again
    fn close_capture_valve(&mut self);
}
