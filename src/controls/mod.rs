// SPDX-License-Identifier: GPL-3.0-only

//! Discrete camera parameter controllers
//!
//! UI events land here: the controllers read the live hardware value from
//! the session, quantize the next step and write it back, deciding on the
//! way whether the pipeline survives the change or has to restart.

pub mod exposure;
pub mod resolution;
pub mod step_table;

pub use exposure::ExposureController;
pub use resolution::ResolutionController;
