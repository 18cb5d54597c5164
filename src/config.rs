// SPDX-License-Identifier: GPL-3.0-only

//! Persisted user configuration
//!
//! A flat key/value record loaded once at startup and rewritten on clean
//! shutdown. Absent or malformed files yield defaults; individual values
//! that violate the hardware invariants are reset field by field so one
//! stale entry cannot poison the session.

use crate::constants::annotation;
use crate::controls::resolution::RESOLUTION_TABLE;
use crate::controls::step_table::SHUTTER_TABLE;
use crate::errors::{AppError, AppResult};
use crate::pipeline::metadata::WhiteBalanceMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What to do with the board when the application exits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExitAction {
    /// Leave the system running
    #[default]
    Exit,
    /// Power the board off
    Shutdown,
    /// Reboot the board
    Reboot,
}

/// Persisted camera configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Sharpness in the -100..=100 hardware range
    pub sharpness: i32,
    /// Exposure time in microseconds; 0 = automatic
    pub shutter_speed: u32,
    /// Analog gain in vendor units; 0 = automatic
    pub iso: u32,
    /// Contrast in the -100..=100 hardware range
    pub contrast: i32,
    /// Automatic white balance mode
    pub white_balance: WhiteBalanceMode,
    /// Saturation in the -100..=100 hardware range
    pub saturation: i32,
    /// Annotation overlay mode flags
    pub annotation_mode: u32,
    /// Annotation overlay text size
    pub annotation_text_size: u32,
    /// Action taken on application exit
    pub exit_action: ExitAction,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 800,
            height: 608,
            sharpness: 0,
            shutter_speed: 0,
            iso: 0,
            contrast: 0,
            white_balance: WhiteBalanceMode::Auto,
            saturation: 0,
            annotation_mode: annotation::DEFAULT_MODE,
            annotation_text_size: 608 / annotation::TEXT_SIZE_DIVISOR,
            exit_action: ExitAction::Exit,
        }
    }
}

/// Default configuration file location
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("astrocam").join("config.json"))
}

impl Config {
    /// Load the configuration from the default location
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory, using defaults");
                Self::default()
            }
        }
    }

    /// Load the configuration from a specific file
    pub fn load_from(path: &Path) -> Self {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed config, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
        };
        config.sanitize();
        config
    }

    /// Write the configuration to the default location
    pub fn save(&self) -> AppResult<()> {
        let path =
            config_path().ok_or_else(|| AppError::Config("no config directory".to_string()))?;
        self.save_to(&path)
    }

    /// Write the configuration to a specific file
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Reset values that violate the hardware invariants
    ///
    /// The stored shutter speed must be a table entry, the gain a multiple
    /// of 256 within range, and the resolution a ladder entry.
    fn sanitize(&mut self) {
        let defaults = Self::default();

        if SHUTTER_TABLE.entry_for(self.shutter_speed).is_none() {
            warn!(value = self.shutter_speed, "Stored shutter speed off table, resetting");
            self.shutter_speed = defaults.shutter_speed;
        }

        if self.iso % 256 != 0 || self.iso > 4096 {
            warn!(value = self.iso, "Stored gain invalid, resetting");
            self.iso = defaults.iso;
        }

        let on_ladder = RESOLUTION_TABLE
            .entry_for(self.width)
            .is_some_and(|step| step.height == self.height);
        if !on_ladder {
            warn!(
                width = self.width,
                height = self.height,
                "Stored resolution off ladder, resetting"
            );
            self.width = defaults.width;
            self.height = defaults.height;
            self.annotation_text_size = defaults.annotation_text_size;
        }
    }
}
