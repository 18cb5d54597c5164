// SPDX-License-Identifier: GPL-3.0-only

//! Exposure control
//!
//! Steps shutter speed along the vendor table and analog gain in fixed
//! increments, keeping the hardware property, the display label and the
//! capture tag record consistent after every mutation.

use crate::controls::step_table::{SHUTTER_TABLE, shutter_label};
use crate::errors::AppResult;
use crate::pipeline::metadata::iso_decimal;
use crate::pipeline::session::CaptureSession;
use tracing::{debug, info};

/// Shutter values whose upward transition needs a pipeline restart
///
/// The sensor driver does not apply these exposure-mode changes to a
/// running pipeline; the set is fixed and must not be extended.
pub const RESTART_ON_INCREASE: [u32; 2] = [2_000_000, 7_000_000];

/// Shutter values whose downward transition needs a pipeline restart
pub const RESTART_ON_DECREASE: [u32; 2] = [1_000_000, 6_000_000];

/// Analog gain increment in vendor units
pub const GAIN_STEP: u32 = 256;

/// Maximum analog gain
pub const GAIN_MAX: u32 = 4096;

/// Result of a successful shutter-speed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    /// New exposure time in microseconds
    pub micros: u32,
    /// New display label
    pub label: &'static str,
    /// Whether the step went through a pipeline restart
    pub restarted: bool,
}

/// Exposure and ISO controller
pub struct ExposureController {
    shutter_label: &'static str,
    iso_label: String,
}

impl ExposureController {
    /// Create a controller with labels derived from the live session state
    pub fn new(session: &CaptureSession) -> Self {
        Self {
            shutter_label: shutter_label(session.shutter_speed()),
            iso_label: iso_label(session.analog_gain()),
        }
    }

    /// Current shutter-speed display label
    pub fn shutter_label(&self) -> &'static str {
        self.shutter_label
    }

    /// Current ISO display label
    pub fn iso_label(&self) -> &str {
        &self.iso_label
    }

    /// Whether a further shutter-speed increase is possible
    pub fn can_increase_shutter(&self, session: &CaptureSession) -> bool {
        SHUTTER_TABLE.next_up(session.shutter_speed()).is_some()
    }

    /// Whether a further shutter-speed decrease is possible
    pub fn can_decrease_shutter(&self, session: &CaptureSession) -> bool {
        SHUTTER_TABLE.next_down(session.shutter_speed()).is_some()
    }

    /// Whether a further gain increase is possible
    pub fn can_increase_iso(&self, session: &CaptureSession) -> bool {
        session.analog_gain() < GAIN_MAX
    }

    /// Whether a further gain decrease is possible
    pub fn can_decrease_iso(&self, session: &CaptureSession) -> bool {
        session.analog_gain() > 0
    }

    /// Step the shutter speed up one table entry
    ///
    /// Saturating at the 22 second ceiling is a no-op returning `None`;
    /// the caller disables the affordance.
    pub fn increase_shutter_speed(
        &mut self,
        session: &mut CaptureSession,
    ) -> AppResult<Option<Adjustment>> {
        let current = session.shutter_speed();
        let Some(step) = SHUTTER_TABLE.next_up(current) else {
            debug!(current, "Shutter speed already at ceiling");
            return Ok(None);
        };

        let restart = session.is_playing() && RESTART_ON_INCREASE.contains(&step.micros);
        self.apply_shutter_step(session, step.micros, step.label, restart)?;
        Ok(Some(Adjustment {
            micros: step.micros,
            label: step.label,
            restarted: restart,
        }))
    }

    /// Step the shutter speed down one table entry
    ///
    /// Saturating at automatic exposure is a no-op returning `None`.
    pub fn decrease_shutter_speed(
        &mut self,
        session: &mut CaptureSession,
    ) -> AppResult<Option<Adjustment>> {
        let current = session.shutter_speed();
        let Some(step) = SHUTTER_TABLE.next_down(current) else {
            debug!(current, "Shutter speed already automatic");
            return Ok(None);
        };

        let restart = session.is_playing() && RESTART_ON_DECREASE.contains(&step.micros);
        self.apply_shutter_step(session, step.micros, step.label, restart)?;
        Ok(Some(Adjustment {
            micros: step.micros,
            label: step.label,
            restarted: restart,
        }))
    }

    fn apply_shutter_step(
        &mut self,
        session: &mut CaptureSession,
        micros: u32,
        label: &'static str,
        restart: bool,
    ) -> AppResult<()> {
        if restart {
            session.restart_with_exposure(micros)?;
        } else {
            session.set_shutter_speed(micros);
        }

        self.shutter_label = label;
        session.update_capture_tags(|tags| {
            tags.shutter_speed = crate::controls::step_table::shutter_exif(micros);
        });

        info!(micros, label, restart, "Shutter speed changed");
        Ok(())
    }

    /// Step the analog gain up by one increment
    ///
    /// Returns the new gain, or `None` when already at the maximum. Gain
    /// changes never restart the pipeline.
    pub fn increase_iso(&mut self, session: &mut CaptureSession) -> Option<u32> {
        let gain = session.analog_gain();
        if gain >= GAIN_MAX {
            debug!(gain, "Analog gain already at maximum");
            return None;
        }

        let gain = gain + GAIN_STEP;
        self.apply_gain(session, gain);
        Some(gain)
    }

    /// Step the analog gain down by one increment
    ///
    /// Returns the new gain, or `None` when already automatic.
    pub fn decrease_iso(&mut self, session: &mut CaptureSession) -> Option<u32> {
        let gain = session.analog_gain();
        if gain == 0 {
            debug!("Analog gain already automatic");
            return None;
        }

        let gain = gain - GAIN_STEP;
        self.apply_gain(session, gain);
        Some(gain)
    }

    fn apply_gain(&mut self, session: &mut CaptureSession, gain: u32) {
        session.set_analog_gain(gain);
        self.iso_label = iso_label(gain);
        session.update_capture_tags(|tags| {
            tags.iso_speed = iso_decimal(gain);
        });
        info!(gain, label = %self.iso_label, "Analog gain changed");
    }
}

/// Display label for an analog gain value
pub fn iso_label(gain: u32) -> String {
    if gain == 0 {
        "Auto".to_string()
    } else {
        format!("ISO {}", gain * 100 / 256)
    }
}
