// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the top-level controller

use astrocam::app::{App, CameraMode, FeatureSet, Message};
use astrocam::config::Config;
use astrocam::hardware::MemoryBudget;
use astrocam::pipeline::mock::{MockOp, MockPipeline};
use astrocam::pipeline::session::CaptureSession;
use std::fs;
use tempfile::TempDir;

fn app_with(mock: &MockPipeline, dir: &TempDir) -> App {
    let session = CaptureSession::setup(Box::new(mock.clone()), dir.path().to_path_buf())
        .expect("session setup");
    let mut app = App::new(
        Config::default(),
        session,
        MemoryBudget::new(512, 4096),
        FeatureSet::default(),
    );
    app.start().expect("app start");
    app
}

#[test]
fn test_shutter_captures_in_camera_mode() {
    let dir = TempDir::new().expect("tempdir");
    let mock = MockPipeline::new();
    let mut app = app_with(&mock, &dir);
    mock.take_ops();

    app.update(Message::ShutterPressed).expect("shutter");

    assert!(mock.take_ops().contains(&MockOp::OpenValve));
    assert!(app.session().capture_in_flight());
    assert!(!app.controls().shutter, "shutter disabled while in flight");
}

#[test]
fn test_file_written_completes_capture() {
    let dir = TempDir::new().expect("tempdir");
    let mock = MockPipeline::new();
    let mut app = app_with(&mock, &dir);

    app.update(Message::ShutterPressed).expect("shutter");

    let temp = dir.path().join("astrocam-capture.jpg");
    fs::write(&temp, b"jpeg").expect("temp file");
    app.update(Message::FileWritten(temp)).expect("file written");

    assert_eq!(app.gallery_len(), 1);
    assert!(!app.session().capture_in_flight());
    assert!(app.controls().shutter, "shutter re-enabled");
    assert!(app.controls().gallery, "gallery now reachable");
    assert!(dir.path().join("DSCF0000.JPG").exists());
}

#[test]
fn test_shutter_dispatch_follows_mode() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("DSCF0000.JPG"), b"a").expect("seed");
    fs::write(dir.path().join("DSCF0001.JPG"), b"b").expect("seed");

    let mock = MockPipeline::new();
    let mut app = app_with(&mock, &dir);

    app.update(Message::ToggleMode).expect("enter gallery");
    assert_eq!(app.mode(), CameraMode::PhotoGallery);
    mock.take_ops();

    // In gallery mode the same button browses instead of capturing
    let before = app.current_photo().cloned();
    app.update(Message::ShutterPressed).expect("browse");
    assert!(!mock.take_ops().contains(&MockOp::OpenValve));
    assert_ne!(app.current_photo().cloned(), before);
    assert!(!app.session().capture_in_flight());
}

#[test]
fn test_gallery_unreachable_when_empty() {
    let dir = TempDir::new().expect("tempdir");
    let mock = MockPipeline::new();
    let mut app = app_with(&mock, &dir);

    assert!(!app.controls().gallery);
    assert!(!app.controls().delete);

    app.update(Message::ToggleMode).expect("toggle");
    assert_eq!(app.mode(), CameraMode::PhotoCamera, "empty gallery stays out");
}

#[test]
fn test_saturation_disables_affordances() {
    let dir = TempDir::new().expect("tempdir");
    let mock = MockPipeline::new(); // automatic exposure, automatic gain
    let app = app_with(&mock, &dir);

    assert!(!app.controls().exposure_down, "already automatic");
    assert!(!app.controls().iso_down, "already automatic");
    assert!(app.controls().exposure_up);
    assert!(app.controls().iso_up);
}

#[test]
fn test_exposure_messages_update_overlay() {
    let dir = TempDir::new().expect("tempdir");
    let mock = MockPipeline::new().with_shutter_speed(1000);
    let mut app = app_with(&mock, &dir);

    app.update(Message::ExposureUp).expect("exposure up");
    assert_eq!(mock.annotation_text(), "1/900\" Auto");

    app.update(Message::IsoUp).expect("iso up");
    assert_eq!(mock.annotation_text(), "1/900\" ISO 100");
}

#[test]
fn test_saturated_step_keeps_overlay() {
    let dir = TempDir::new().expect("tempdir");
    let mock = MockPipeline::new(); // gain already automatic
    let mut app = app_with(&mock, &dir);
    let overlay = mock.annotation_text();

    app.update(Message::IsoDown).expect("iso down");
    assert_eq!(mock.annotation_text(), overlay, "label unchanged on no-op");
}

#[test]
fn test_delete_leaves_gallery_when_empty() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("DSCF0000.JPG"), b"a").expect("seed");

    let mock = MockPipeline::new();
    let mut app = app_with(&mock, &dir);

    app.update(Message::ToggleMode).expect("enter gallery");
    assert!(app.controls().delete);

    app.update(Message::DeletePhoto).expect("delete");
    assert_eq!(app.gallery_len(), 0);
    assert!(!dir.path().join("DSCF0000.JPG").exists());
    assert_eq!(app.mode(), CameraMode::PhotoCamera);
    assert!(!app.controls().gallery);
}

#[test]
fn test_resolution_message_repushes_overlay() {
    let dir = TempDir::new().expect("tempdir");
    let mock = MockPipeline::new().with_caps(640, 480);
    let mut app = app_with(&mock, &dir);

    app.update(Message::ResolutionUp).expect("resolution up");
    assert_eq!(app.session().caps(), (800, 608));
    assert_eq!(mock.annotation_text_size(), 38);
    assert_eq!(mock.annotation_text(), "Auto Auto");
}
