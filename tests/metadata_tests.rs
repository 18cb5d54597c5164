// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture-tag composer

use astrocam::pipeline::metadata::{
    CapturingTags, ContrastLevel, SaturationLevel, SharpnessLevel, WhiteBalanceMode,
};

#[test]
fn test_default_composition() {
    let tags = CapturingTags::default();
    assert_eq!(
        tags.compose(),
        "capturing-contrast=normal,capturing-white-balance=auto,\
         capturing-saturation=normal,capturing-sharpness=normal,\
         capturing-shutter-speed=0/1,capturing-iso-speed=0"
    );
}

#[test]
fn test_full_composition() {
    let tags = CapturingTags {
        contrast: ContrastLevel::Hard,
        white_balance: WhiteBalanceMode::Cloudy,
        saturation: SaturationLevel::High,
        sharpness: SharpnessLevel::Soft,
        shutter_speed: "1/500".to_string(),
        iso_speed: "400".to_string(),
    };
    assert_eq!(
        tags.compose(),
        "capturing-contrast=hard,capturing-white-balance=cloudy,\
         capturing-saturation=high-saturation,capturing-sharpness=soft,\
         capturing-shutter-speed=1/500,capturing-iso-speed=400"
    );
}

#[test]
fn test_composition_always_carries_every_key() {
    // The tag stage replaces rather than merges, so a partial set would
    // silently drop fields from the next capture
    let tags = CapturingTags {
        shutter_speed: "4/1".to_string(),
        ..CapturingTags::default()
    };
    let composed = tags.compose();

    for key in [
        "capturing-contrast=",
        "capturing-white-balance=",
        "capturing-saturation=",
        "capturing-sharpness=",
        "capturing-shutter-speed=",
        "capturing-iso-speed=",
    ] {
        assert!(composed.contains(key), "{} missing from {}", key, composed);
    }
}

#[test]
fn test_long_exposure_fraction() {
    let tags = CapturingTags {
        shutter_speed: "2/1".to_string(),
        ..CapturingTags::default()
    };
    assert!(tags.compose().contains("capturing-shutter-speed=2/1"));
}
