// SPDX-License-Identifier: GPL-3.0-only

//! Resolution control
//!
//! Walks the fixed ladder of supported sensor modes. Resolution has no
//! live-update path: every change cycles the pipeline through a full
//! stop, caps renegotiation and start, then rescales the annotation
//! overlay for the new frame height.

use crate::constants::{annotation, memory};
use crate::controls::step_table::{Step, StepTable};
use crate::errors::AppResult;
use crate::hardware::MemoryBudget;
use crate::pipeline::session::CaptureSession;
use tracing::{debug, info};

/// One supported sensor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionStep {
    /// Frame width
    pub width: u32,
    /// Frame height, sensor-rounded to a multiple of 16
    pub height: u32,
}

impl Step for ResolutionStep {
    fn raw(&self) -> u32 {
        self.width
    }
}

const fn mode(width: u32, height: u32) -> ResolutionStep {
    ResolutionStep { width, height }
}

/// The supported sensor modes, ascending
///
/// Heights are the sensor-rounded values for each width tier; 800x608 and
/// 4056x3040 are not 4:3 exact.
pub const RESOLUTION_LADDER: &[ResolutionStep] = &[
    mode(160, 128),
    mode(320, 240),
    mode(640, 480),
    mode(800, 608),
    mode(1024, 768),
    mode(1280, 960),
    mode(1600, 1200),
    mode(2048, 1536),
    mode(3200, 2400),
    mode(4056, 3040),
];

/// The resolution ladder as a step table
pub static RESOLUTION_TABLE: StepTable<ResolutionStep> = StepTable::new(RESOLUTION_LADDER);

/// Resolution controller
pub struct ResolutionController {
    ceiling: u32,
}

impl ResolutionController {
    /// Create a controller with its ceiling fixed by the memory budget
    ///
    /// The budget is probed once at startup; the gated tiers never become
    /// reachable later in the session.
    pub fn new(budget: MemoryBudget) -> Self {
        let ceiling = RESOLUTION_LADDER
            .iter()
            .filter(|step| match memory::gate_for(step.width) {
                Some(gate) => budget.gpu_mb >= gate.gpu_mb && budget.system_mb >= gate.system_mb,
                None => true,
            })
            .map(|step| step.width)
            .max()
            .unwrap_or(0);

        info!(
            gpu_mb = budget.gpu_mb,
            system_mb = budget.system_mb,
            ceiling,
            "Resolution ceiling fixed"
        );
        Self { ceiling }
    }

    /// Highest reachable frame width for this session
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Whether a further increase is possible
    pub fn can_increase(&self, session: &CaptureSession) -> bool {
        let (width, _) = session.caps();
        RESOLUTION_TABLE
            .next_up(width)
            .is_some_and(|step| step.width <= self.ceiling)
    }

    /// Whether a further decrease is possible
    pub fn can_decrease(&self, session: &CaptureSession) -> bool {
        let (width, _) = session.caps();
        RESOLUTION_TABLE.next_down(width).is_some()
    }

    /// Step up to the next sensor mode
    ///
    /// Returns the new frame size, or `None` when saturated at the ladder
    /// top or the memory-gated ceiling.
    pub fn increase(
        &mut self,
        session: &mut CaptureSession,
        overlay_text: &str,
    ) -> AppResult<Option<(u32, u32)>> {
        let (width, _) = session.caps();
        let Some(step) = RESOLUTION_TABLE.next_up(width) else {
            debug!(width, "Resolution already at ladder top");
            return Ok(None);
        };
        if step.width > self.ceiling {
            debug!(width = step.width, ceiling = self.ceiling, "Resolution tier gated");
            return Ok(None);
        }

        self.apply(session, *step, overlay_text)?;
        Ok(Some((step.width, step.height)))
    }

    /// Step down to the previous sensor mode
    ///
    /// Returns the new frame size, or `None` at the ladder floor.
    pub fn decrease(
        &mut self,
        session: &mut CaptureSession,
        overlay_text: &str,
    ) -> AppResult<Option<(u32, u32)>> {
        let (width, _) = session.caps();
        let Some(step) = RESOLUTION_TABLE.next_down(width) else {
            debug!(width, "Resolution already at ladder floor");
            return Ok(None);
        };

        self.apply(session, *step, overlay_text)?;
        Ok(Some((step.width, step.height)))
    }

    fn apply(
        &mut self,
        session: &mut CaptureSession,
        step: ResolutionStep,
        overlay_text: &str,
    ) -> AppResult<()> {
        session.reconfigure_caps(step.width, step.height)?;

        // The overlay is redrawn after the restart; rescale its font to the
        // new frame height and push the display strings again.
        let text_size = step.height / annotation::TEXT_SIZE_DIVISOR;
        session.set_annotation_text_size(text_size);
        session.set_annotation_text(overlay_text);

        info!(
            width = step.width,
            height = step.height,
            text_size,
            "Resolution changed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_ascending_and_rounded() {
        let mut prev = 0;
        for step in RESOLUTION_LADDER {
            assert!(step.width > prev);
            assert_eq!(step.height % 16, 0, "height {} not sensor-rounded", step.height);
            prev = step.width;
        }
    }

    #[test]
    fn test_ceiling_from_budget() {
        let full = ResolutionController::new(MemoryBudget::new(512, 4096));
        assert_eq!(full.ceiling(), 4056);

        let mid = ResolutionController::new(MemoryBudget::new(256, 1024));
        assert_eq!(mid.ceiling(), 3200);

        let small = ResolutionController::new(MemoryBudget::new(76, 512));
        assert_eq!(small.ceiling(), 1600);
    }
}
