// SPDX-License-Identifier: GPL-3.0-only

//! Discrete step tables for continuous hardware parameters
//!
//! The sensor driver only accepts a fixed, non-uniform set of shutter
//! speeds. This module holds that table and the generic walk over it:
//! `next_up` picks the first entry strictly greater than the current live
//! hardware value, `next_down` the last entry strictly less than it, so a
//! current value that is not exactly a table entry still lands on a valid
//! step.

/// A discrete entry in a quantization table
pub trait Step {
    /// Raw hardware value of this entry
    fn raw(&self) -> u32;

    /// Whether this entry is reachable when stepping upwards
    ///
    /// The shutter table is not symmetric: the 2500 us stop is only visited
    /// on the decrease path, matching the sensor driver's behavior.
    fn on_increase_path(&self) -> bool {
        true
    }
}

/// Monotonic, non-uniform quantization table
#[derive(Debug)]
pub struct StepTable<E: Step + 'static> {
    entries: &'static [E],
}

impl<E: Step> StepTable<E> {
    /// Create a table over a strictly ascending entry slice
    pub const fn new(entries: &'static [E]) -> Self {
        Self { entries }
    }

    /// All entries, ascending
    pub fn entries(&self) -> &'static [E] {
        self.entries
    }

    /// First increase-path entry strictly greater than `current`
    ///
    /// Returns `None` at the ceiling; callers disable the corresponding
    /// affordance instead of reporting an error.
    pub fn next_up(&self, current: u32) -> Option<&'static E> {
        self.entries
            .iter()
            .find(|e| e.on_increase_path() && e.raw() > current)
    }

    /// Last entry strictly less than `current`
    ///
    /// Returns `None` at the floor.
    pub fn next_down(&self, current: u32) -> Option<&'static E> {
        self.entries.iter().rev().find(|e| e.raw() < current)
    }

    /// Entry whose raw value is exactly `current`
    pub fn entry_for(&self, current: u32) -> Option<&'static E> {
        self.entries.iter().find(|e| e.raw() == current)
    }
}

/// One shutter-speed stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutterStep {
    /// Exposure time in microseconds; 0 means sensor-automatic
    pub micros: u32,
    /// Display label, e.g. `1/500"` or `2"`
    pub label: &'static str,
    decrease_only: bool,
}

impl ShutterStep {
    const fn new(micros: u32, label: &'static str) -> Self {
        Self {
            micros,
            label,
            decrease_only: false,
        }
    }

    const fn decrease_only(micros: u32, label: &'static str) -> Self {
        Self {
            micros,
            label,
            decrease_only: true,
        }
    }

    /// Tag-string fraction for this stop: `0/1`, `1/N` or `N/1`
    pub fn exif_fraction(&self) -> String {
        if self.micros == 0 {
            "0/1".to_string()
        } else if self.micros >= 1_000_000 {
            format!("{}/1", self.micros / 1_000_000)
        } else {
            self.label.trim_end_matches('"').to_string()
        }
    }
}

impl Step for ShutterStep {
    fn raw(&self) -> u32 {
        self.micros
    }

    fn on_increase_path(&self) -> bool {
        !self.decrease_only
    }
}

/// The vendor shutter-speed table, ascending
///
/// Sub-second stops follow the sensor's fractional-second ladder; from one
/// second upwards exposures step in whole seconds to the 22 second maximum.
/// The exact values match the sensor driver and must not be regularized.
pub const SHUTTER_STEPS: &[ShutterStep] = &[
    ShutterStep::new(0, "Auto"),
    ShutterStep::new(100, "1/10000\""),
    ShutterStep::new(111, "1/9000\""),
    ShutterStep::new(125, "1/8000\""),
    ShutterStep::new(143, "1/7000\""),
    ShutterStep::new(167, "1/6000\""),
    ShutterStep::new(200, "1/5000\""),
    ShutterStep::new(250, "1/4000\""),
    ShutterStep::new(333, "1/3000\""),
    ShutterStep::new(500, "1/2000\""),
    ShutterStep::new(1000, "1/1000\""),
    ShutterStep::new(1111, "1/900\""),
    ShutterStep::new(1250, "1/800\""),
    ShutterStep::new(1429, "1/700\""),
    ShutterStep::new(1667, "1/600\""),
    ShutterStep::new(2000, "1/500\""),
    // Only reachable by stepping down from 1/300"
    ShutterStep::decrease_only(2500, "1/400\""),
    ShutterStep::new(3333, "1/300\""),
    ShutterStep::new(5000, "1/200\""),
    ShutterStep::new(10000, "1/100\""),
    ShutterStep::new(11111, "1/90\""),
    ShutterStep::new(12500, "1/80\""),
    ShutterStep::new(14286, "1/70\""),
    ShutterStep::new(16667, "1/60\""),
    ShutterStep::new(20000, "1/50\""),
    ShutterStep::new(25000, "1/40\""),
    ShutterStep::new(33333, "1/30\""),
    ShutterStep::new(50000, "1/20\""),
    ShutterStep::new(100_000, "1/10\""),
    ShutterStep::new(111_111, "1/9\""),
    ShutterStep::new(125_000, "1/8\""),
    ShutterStep::new(142_857, "1/7\""),
    ShutterStep::new(166_667, "1/6\""),
    ShutterStep::new(200_000, "1/5\""),
    ShutterStep::new(250_000, "1/4\""),
    ShutterStep::new(333_333, "1/3\""),
    ShutterStep::new(500_000, "1/2\""),
    ShutterStep::new(1_000_000, "1\""),
    ShutterStep::new(2_000_000, "2\""),
    ShutterStep::new(3_000_000, "3\""),
    ShutterStep::new(4_000_000, "4\""),
    ShutterStep::new(5_000_000, "5\""),
    ShutterStep::new(6_000_000, "6\""),
    ShutterStep::new(7_000_000, "7\""),
    ShutterStep::new(8_000_000, "8\""),
    ShutterStep::new(9_000_000, "9\""),
    ShutterStep::new(10_000_000, "10\""),
    ShutterStep::new(11_000_000, "11\""),
    ShutterStep::new(12_000_000, "12\""),
    ShutterStep::new(13_000_000, "13\""),
    ShutterStep::new(14_000_000, "14\""),
    ShutterStep::new(15_000_000, "15\""),
    ShutterStep::new(16_000_000, "16\""),
    ShutterStep::new(17_000_000, "17\""),
    ShutterStep::new(18_000_000, "18\""),
    ShutterStep::new(19_000_000, "19\""),
    ShutterStep::new(20_000_000, "20\""),
    ShutterStep::new(21_000_000, "21\""),
    ShutterStep::new(22_000_000, "22\""),
];

/// The shutter-speed table
pub static SHUTTER_TABLE: StepTable<ShutterStep> = StepTable::new(SHUTTER_STEPS);

/// Display label for a stored shutter value
///
/// Stored values are always table entries; anything else falls back to the
/// automatic label so a stale config value cannot poison the overlay.
pub fn shutter_label(micros: u32) -> &'static str {
    SHUTTER_TABLE
        .entry_for(micros)
        .map(|s| s.label)
        .unwrap_or("Auto")
}

/// Tag-string fraction for a stored shutter value
pub fn shutter_exif(micros: u32) -> String {
    SHUTTER_TABLE
        .entry_for(micros)
        .map(|s| s.exif_fraction())
        .unwrap_or_else(|| "0/1".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_strictly_ascending() {
        let mut prev = None;
        for step in SHUTTER_STEPS {
            if let Some(p) = prev {
                assert!(step.micros > p, "table must ascend at {}", step.micros);
            }
            prev = Some(step.micros);
        }
    }

    #[test]
    fn test_labels_nonempty() {
        for step in SHUTTER_STEPS {
            assert!(!step.label.is_empty());
        }
    }

    #[test]
    fn test_exif_fractions() {
        assert_eq!(shutter_exif(0), "0/1");
        assert_eq!(shutter_exif(1111), "1/900");
        assert_eq!(shutter_exif(1_000_000), "1/1");
        assert_eq!(shutter_exif(2_000_000), "2/1");
    }

    #[test]
    fn test_defensive_lookup_off_table() {
        // A current value between entries still resolves to a table entry
        assert_eq!(SHUTTER_TABLE.next_up(1500).map(|s| s.micros), Some(1667));
        assert_eq!(SHUTTER_TABLE.next_down(1500).map(|s| s.micros), Some(1429));
    }
}
