// SPDX-License-Identifier: GPL-3.0-only

//! Capture session lifecycle
//!
//! Owns the pipeline state machine, the capture-in-flight flag, the
//! sequential gallery numbering and the capture-time tag record. The two
//! controllers hold only `&mut` references per call; the session is owned
//! by the top-level app controller for the whole run.

use super::metadata::{
    CapturingTags, ContrastLevel, SaturationLevel, SharpnessLevel, WhiteBalanceMode, iso_decimal,
};
use super::PipelineBackend;
use crate::constants::capture;
use crate::controls::step_table::shutter_exif;
use crate::errors::{AppResult, CaptureError};
use crate::storage;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Pipeline lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, pipeline not built
    Idle,
    /// Pipeline built, initial properties applied, not yet started
    Configuring,
    /// Live preview running; the only state a capture may start from
    Playing,
    /// Pipeline halted for reconfiguration or shutdown
    Stopped,
}

/// The capture session
pub struct CaptureSession {
    backend: Box<dyn PipelineBackend>,
    state: SessionState,
    capture_in_flight: bool,
    tags: CapturingTags,
    media_dir: PathBuf,
    next_sequence: u32,
}

impl CaptureSession {
    /// Build the session around a constructed pipeline backend
    ///
    /// Creates the media directory if missing, seeds the gallery sequence
    /// from a directory scan and pushes the initial tag set derived from
    /// the backend's current property state.
    pub fn setup(backend: Box<dyn PipelineBackend>, media_dir: PathBuf) -> AppResult<Self> {
        std::fs::create_dir_all(&media_dir)?;
        let next_sequence = storage::next_sequence(&media_dir);

        let mut session = Self {
            backend,
            state: SessionState::Configuring,
            capture_in_flight: false,
            tags: CapturingTags::default(),
            media_dir,
            next_sequence,
        };

        // Mirror the hardware state into the initial tag set
        let tags = CapturingTags {
            contrast: ContrastLevel::from_value(session.backend.contrast()),
            white_balance: session.backend.awb_mode(),
            saturation: SaturationLevel::from_value(session.backend.saturation()),
            sharpness: SharpnessLevel::from_value(session.backend.sharpness()),
            shutter_speed: shutter_exif(session.backend.shutter_speed()),
            iso_speed: iso_decimal(session.backend.analog_gain()),
        };
        session.tags = tags;
        session.push_tags();

        debug!(next = session.next_sequence, "Capture session configured");
        Ok(session)
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the live preview is running
    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    /// Whether a capture is waiting for its file copy to complete
    pub fn capture_in_flight(&self) -> bool {
        self.capture_in_flight
    }

    /// Media directory the gallery lives in
    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Start the live preview
    pub fn start(&mut self) -> AppResult<()> {
        self.backend.start()?;
        self.state = SessionState::Playing;
        Ok(())
    }

    /// Halt the pipeline
    pub fn stop(&mut self) -> AppResult<()> {
        self.backend.stop()?;
        self.state = SessionState::Stopped;
        Ok(())
    }

    /// Full restart applying a new exposure time
    ///
    /// The sensor driver does not reliably apply certain exposure-mode
    /// transitions to a running pipeline, so the affected thresholds go
    /// through a stop, a rewrite of shutter speed and gain, and a start.
    pub fn restart_with_exposure(&mut self, micros: u32) -> AppResult<()> {
        let gain = self.backend.analog_gain();
        info!(micros, gain, "Restarting pipeline for exposure change");

        self.backend.stop()?;
        self.state = SessionState::Stopped;
        self.backend.set_shutter_speed(micros);
        self.backend.set_analog_gain(gain);
        self.backend.start()?;
        self.state = SessionState::Playing;
        Ok(())
    }

    /// Stop, renegotiate the frame size and start again
    ///
    /// Resolution has no live-update path; every change cycles the
    /// pipeline.
    pub fn reconfigure_caps(&mut self, width: u32, height: u32) -> AppResult<()> {
        info!(width, height, "Reconfiguring pipeline caps");

        self.backend.stop()?;
        self.state = SessionState::Stopped;
        self.backend.set_caps(width, height)?;
        self.backend.start()?;
        self.state = SessionState::Playing;
        Ok(())
    }

    /// Current exposure time in microseconds
    pub fn shutter_speed(&self) -> u32 {
        self.backend.shutter_speed()
    }

    /// Write a new exposure time to the running pipeline
    pub fn set_shutter_speed(&mut self, micros: u32) {
        self.backend.set_shutter_speed(micros);
    }

    /// Current analog gain
    pub fn analog_gain(&self) -> u32 {
        self.backend.analog_gain()
    }

    /// Write a new analog gain
    pub fn set_analog_gain(&mut self, gain: u32) {
        self.backend.set_analog_gain(gain);
    }

    /// Current contrast
    pub fn contrast(&self) -> i32 {
        self.backend.contrast()
    }

    /// Set the contrast and mirror it into the tag record
    pub fn set_contrast(&mut self, value: i32) {
        self.backend.set_contrast(value);
        self.tags.contrast = ContrastLevel::from_value(value);
        self.push_tags();
    }

    /// Current saturation
    pub fn saturation(&self) -> i32 {
        self.backend.saturation()
    }

    /// Set the saturation and mirror it into the tag record
    pub fn set_saturation(&mut self, value: i32) {
        self.backend.set_saturation(value);
        self.tags.saturation = SaturationLevel::from_value(value);
        self.push_tags();
    }

    /// Current sharpness
    pub fn sharpness(&self) -> i32 {
        self.backend.sharpness()
    }

    /// Set the sharpness and mirror it into the tag record
    pub fn set_sharpness(&mut self, value: i32) {
        self.backend.set_sharpness(value);
        self.tags.sharpness = SharpnessLevel::from_value(value);
        self.push_tags();
    }

    /// Current white balance mode
    pub fn awb_mode(&self) -> WhiteBalanceMode {
        self.backend.awb_mode()
    }

    /// Set the white balance mode and mirror it into the tag record
    pub fn set_awb_mode(&mut self, mode: WhiteBalanceMode) {
        self.backend.set_awb_mode(mode);
        self.tags.white_balance = mode;
        self.push_tags();
    }

    /// Current annotation mode flags
    pub fn annotation_mode(&self) -> u32 {
        self.backend.annotation_mode()
    }

    /// Set the annotation mode flags
    pub fn set_annotation_mode(&mut self, flags: u32) {
        self.backend.set_annotation_mode(flags);
    }

    /// Set the annotation overlay text size
    pub fn set_annotation_text_size(&mut self, size: u32) {
        self.backend.set_annotation_text_size(size);
    }

    /// Set the annotation overlay text
    pub fn set_annotation_text(&mut self, text: &str) {
        self.backend.set_annotation_text(text);
    }

    /// Negotiated frame size
    pub fn caps(&self) -> (u32, u32) {
        self.backend.caps()
    }

    /// The current capture tag record
    pub fn capture_tags(&self) -> &CapturingTags {
        &self.tags
    }

    /// Mutate the tag record, recompose and push the full replacement set
    pub fn update_capture_tags(&mut self, f: impl FnOnce(&mut CapturingTags)) {
        f(&mut self.tags);
        self.push_tags();
    }

    fn push_tags(&mut self) {
        let composed = self.tags.compose();
        self.backend.set_capture_tags(&composed);
    }

    /// Request a photograph
    ///
    /// Only valid while playing and with no capture in flight; both
    /// violations surface as errors so the caller can keep the shutter
    /// affordance disabled instead.
    pub fn trigger_capture(&mut self) -> AppResult<()> {
        if self.state != SessionState::Playing {
            return Err(CaptureError::NotPlaying.into());
        }
        if self.capture_in_flight {
            return Err(CaptureError::AlreadyInFlight.into());
        }

        self.capture_in_flight = true;
        self.backend.open_capture_valve()?;
        info!(sequence = self.next_sequence, "Capture triggered");
        Ok(())
    }

    /// Complete a capture after the file-written bus notification
    ///
    /// Copies the temporary file to the next sequential gallery name,
    /// advances the wrapping sequence and clears the in-flight flag.
    pub fn finish_capture(&mut self, written: &Path) -> AppResult<PathBuf> {
        self.backend.close_capture_valve();

        if !self.capture_in_flight {
            warn!(path = %written.display(), "File notification without capture in flight");
            return Err(CaptureError::NotInFlight.into());
        }

        let dest = storage::import_capture(written, &self.media_dir, self.next_sequence)?;
        self.next_sequence = (self.next_sequence + 1) % capture::SEQUENCE_MODULO;
        self.capture_in_flight = false;

        info!(path = %dest.display(), "Capture saved");
        Ok(dest)
    }
}
