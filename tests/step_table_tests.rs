// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the shutter-speed step table

use astrocam::controls::step_table::{SHUTTER_STEPS, SHUTTER_TABLE, Step, shutter_label};

#[test]
fn test_monotonic_coverage() {
    // Repeated next_up from automatic visits every increase-path entry
    // exactly once, in strictly increasing order, then saturates
    let mut current = 0;
    let mut visited = Vec::new();

    while let Some(step) = SHUTTER_TABLE.next_up(current) {
        assert!(step.micros > current, "table walk must ascend");
        current = step.micros;
        visited.push(step.micros);
    }

    let increase_path_entries = SHUTTER_STEPS
        .iter()
        .filter(|s| s.on_increase_path() && s.micros > 0)
        .count();
    assert_eq!(visited.len(), increase_path_entries);
    assert_eq!(visited.last(), Some(&22_000_000));

    // Saturated: a further step is a no-op
    assert!(SHUTTER_TABLE.next_up(22_000_000).is_none());
}

#[test]
fn test_inverse_symmetry_with_documented_exception() {
    // next_down(next_up(v)) == v everywhere except across the 2000<->2500
    // asymmetry, which mirrors the sensor driver and is not normalized
    for entry in SHUTTER_STEPS.iter().filter(|s| s.on_increase_path()) {
        let Some(up) = SHUTTER_TABLE.next_up(entry.micros) else {
            continue;
        };
        let down = SHUTTER_TABLE
            .next_down(up.micros)
            .expect("every raised value can step back down");

        if entry.micros == 2000 {
            assert_eq!(up.micros, 3333, "2500 is skipped on the way up");
            assert_eq!(down.micros, 2500, "but visited on the way down");
        } else {
            assert_eq!(down.micros, entry.micros);
        }
    }

    // The extra stop continues down symmetrically
    assert_eq!(SHUTTER_TABLE.next_down(2500).map(|s| s.micros), Some(2000));
}

#[test]
fn test_floor_saturation() {
    // The decrease path bottoms out at automatic exposure
    let floor = SHUTTER_TABLE.next_down(100).expect("100 steps down to auto");
    assert_eq!(floor.micros, 0);
    assert_eq!(floor.label, "Auto");

    assert!(SHUTTER_TABLE.next_down(0).is_none());
}

#[test]
fn test_fractional_labels() {
    assert_eq!(SHUTTER_TABLE.next_up(1000).map(|s| s.label), Some("1/900\""));
    assert_eq!(SHUTTER_TABLE.next_up(0).map(|s| s.label), Some("1/10000\""));
    assert_eq!(shutter_label(2_000_000), "2\"");
    assert_eq!(shutter_label(0), "Auto");
}

#[test]
fn test_whole_second_region() {
    // From one second upwards the table steps in whole seconds
    let mut current = 1_000_000;
    let mut expected = 2_000_000;
    while let Some(step) = SHUTTER_TABLE.next_up(current) {
        assert_eq!(step.micros, expected);
        current = step.micros;
        expected += 1_000_000;
    }
    assert_eq!(current, 22_000_000);
}

#[test]
fn test_off_table_value_recovers() {
    // A live value that is not a table entry still lands on a valid step
    assert_eq!(SHUTTER_TABLE.next_up(1500).map(|s| s.micros), Some(1667));
    assert_eq!(SHUTTER_TABLE.next_down(1500).map(|s| s.micros), Some(1429));
    assert_eq!(
        SHUTTER_TABLE.next_up(1_500_000).map(|s| s.micros),
        Some(2_000_000)
    );
}
