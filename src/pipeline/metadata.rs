// SPDX-License-Identifier: GPL-3.0-only

//! Capture-time metadata tags
//!
//! The encoder's tag stage consumes a comma-joined `key=value` string with
//! replace semantics: every push fully replaces the previous tag set. The
//! string enums here mirror the numeric controller state 1:1 and use the
//! camera vendor's fixed vocabulary.

use serde::{Deserialize, Serialize};

/// Contrast rendering level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContrastLevel {
    /// Reduced contrast
    Soft,
    /// Sensor default
    #[default]
    Normal,
    /// Increased contrast
    Hard,
}

impl ContrastLevel {
    /// Map the numeric hardware value onto the tag vocabulary
    pub fn from_value(value: i32) -> Self {
        match value {
            v if v < 0 => ContrastLevel::Soft,
            0 => ContrastLevel::Normal,
            _ => ContrastLevel::Hard,
        }
    }

    /// Vendor tag token
    pub fn token(&self) -> &'static str {
        match self {
            ContrastLevel::Soft => "soft",
            ContrastLevel::Normal => "normal",
            ContrastLevel::Hard => "hard",
        }
    }
}

/// Saturation rendering level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaturationLevel {
    /// Reduced saturation
    Low,
    /// Sensor default
    #[default]
    Normal,
    /// Increased saturation
    High,
}

impl SaturationLevel {
    /// Map the numeric hardware value onto the tag vocabulary
    pub fn from_value(value: i32) -> Self {
        match value {
            v if v < 0 => SaturationLevel::Low,
            0 => SaturationLevel::Normal,
            _ => SaturationLevel::High,
        }
    }

    /// Vendor tag token
    pub fn token(&self) -> &'static str {
        match self {
            SaturationLevel::Low => "low-saturation",
            SaturationLevel::Normal => "normal",
            SaturationLevel::High => "high-saturation",
        }
    }
}

/// Sharpness rendering level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SharpnessLevel {
    /// Reduced sharpness
    Soft,
    /// Sensor default
    #[default]
    Normal,
    /// Increased sharpness
    Hard,
}

impl SharpnessLevel {
    /// Map the numeric hardware value onto the tag vocabulary
    pub fn from_value(value: i32) -> Self {
        match value {
            v if v < 0 => SharpnessLevel::Soft,
            0 => SharpnessLevel::Normal,
            _ => SharpnessLevel::Hard,
        }
    }

    /// Vendor tag token
    pub fn token(&self) -> &'static str {
        match self {
            SharpnessLevel::Soft => "soft",
            SharpnessLevel::Normal => "normal",
            SharpnessLevel::Hard => "hard",
        }
    }
}

/// Automatic white balance mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WhiteBalanceMode {
    /// Sensor-automatic white balance
    #[default]
    Auto,
    /// Direct sunlight
    Daylight,
    /// Overcast sky
    Cloudy,
    /// Open shade
    Shade,
    /// Tungsten lighting
    Tungsten,
    /// Fluorescent lighting
    Fluorescent,
    /// Incandescent lighting
    Incandescent,
    /// Flash exposure
    Flash,
    /// Low sun on the horizon
    Horizon,
}

impl WhiteBalanceMode {
    /// All modes, in picker order
    pub const ALL: [WhiteBalanceMode; 9] = [
        WhiteBalanceMode::Auto,
        WhiteBalanceMode::Daylight,
        WhiteBalanceMode::Cloudy,
        WhiteBalanceMode::Shade,
        WhiteBalanceMode::Tungsten,
        WhiteBalanceMode::Fluorescent,
        WhiteBalanceMode::Incandescent,
        WhiteBalanceMode::Flash,
        WhiteBalanceMode::Horizon,
    ];

    /// Vendor tag token
    pub fn token(&self) -> &'static str {
        match self {
            WhiteBalanceMode::Auto => "auto",
            WhiteBalanceMode::Daylight => "daylight",
            WhiteBalanceMode::Cloudy => "cloudy",
            WhiteBalanceMode::Shade => "shade",
            WhiteBalanceMode::Tungsten => "tungsten",
            WhiteBalanceMode::Fluorescent => "fluorescent",
            WhiteBalanceMode::Incandescent => "incandescent",
            WhiteBalanceMode::Flash => "flash",
            WhiteBalanceMode::Horizon => "horizon",
        }
    }

    /// Nick accepted by the source element's `awb-mode` property
    ///
    /// The element predates the tag vocabulary and calls daylight "sunlight".
    pub fn property_nick(&self) -> &'static str {
        match self {
            WhiteBalanceMode::Daylight => "sunlight",
            other => other.token(),
        }
    }
}

/// The capture-time tag record pushed to the encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturingTags {
    /// Contrast level
    pub contrast: ContrastLevel,
    /// White balance mode
    pub white_balance: WhiteBalanceMode,
    /// Saturation level
    pub saturation: SaturationLevel,
    /// Sharpness level
    pub sharpness: SharpnessLevel,
    /// Shutter speed as a fraction string (`0/1`, `1/N` or `N/1`)
    pub shutter_speed: String,
    /// ISO speed as a decimal string (`0` while the sensor drives exposure)
    pub iso_speed: String,
}

impl Default for CapturingTags {
    fn default() -> Self {
        Self {
            contrast: ContrastLevel::Normal,
            white_balance: WhiteBalanceMode::Auto,
            saturation: SaturationLevel::Normal,
            sharpness: SharpnessLevel::Normal,
            shutter_speed: "0/1".to_string(),
            iso_speed: "0".to_string(),
        }
    }
}

impl CapturingTags {
    /// Compose the full tag string for the encoder's tag stage
    ///
    /// The result replaces the previously configured tag set in full.
    pub fn compose(&self) -> String {
        format!(
            "capturing-contrast={},capturing-white-balance={},capturing-saturation={},\
             capturing-sharpness={},capturing-shutter-speed={},capturing-iso-speed={}",
            self.contrast.token(),
            self.white_balance.token(),
            self.saturation.token(),
            self.sharpness.token(),
            self.shutter_speed,
            self.iso_speed,
        )
    }
}

/// Displayed ISO number for an analog gain value
///
/// Vendor units are 256 per 1x gain step, so gain 256 reads as ISO 100.
pub fn iso_decimal(gain: u32) -> String {
    (gain * 100 / 256).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mirroring() {
        assert_eq!(ContrastLevel::from_value(-30), ContrastLevel::Soft);
        assert_eq!(ContrastLevel::from_value(0), ContrastLevel::Normal);
        assert_eq!(ContrastLevel::from_value(50), ContrastLevel::Hard);
        assert_eq!(SaturationLevel::from_value(-100), SaturationLevel::Low);
        assert_eq!(SharpnessLevel::from_value(100), SharpnessLevel::Hard);
    }

    #[test]
    fn test_white_balance_vocabulary() {
        assert_eq!(WhiteBalanceMode::ALL.len(), 9);
        for mode in WhiteBalanceMode::ALL {
            assert!(!mode.token().is_empty());
        }
        assert_eq!(WhiteBalanceMode::Daylight.property_nick(), "sunlight");
        assert_eq!(WhiteBalanceMode::Cloudy.property_nick(), "cloudy");
    }

    #[test]
    fn test_iso_decimal() {
        assert_eq!(iso_decimal(0), "0");
        assert_eq!(iso_decimal(256), "100");
        assert_eq!(iso_decimal(4096), "1600");
    }
}
