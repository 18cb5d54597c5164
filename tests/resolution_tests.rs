// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the resolution controller

use astrocam::controls::ResolutionController;
use astrocam::controls::resolution::RESOLUTION_LADDER;
use astrocam::hardware::MemoryBudget;
use astrocam::pipeline::mock::{MockOp, MockPipeline};
use astrocam::pipeline::session::CaptureSession;
use tempfile::TempDir;

fn session_with(mock: &MockPipeline) -> (CaptureSession, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let session = CaptureSession::setup(Box::new(mock.clone()), dir.path().to_path_buf())
        .expect("session setup");
    (session, dir)
}

#[test]
fn test_increase_cycles_pipeline() {
    let mock = MockPipeline::new().with_caps(640, 480);
    let (mut session, _dir) = session_with(&mock);
    session.start().expect("start");
    mock.take_ops();

    let mut resolution = ResolutionController::new(MemoryBudget::new(512, 4096));
    let new_size = resolution
        .increase(&mut session, "1/500\" ISO 100")
        .expect("step")
        .expect("not saturated");

    assert_eq!(new_size, (800, 608));
    assert_eq!(session.caps(), (800, 608));

    // Full stop -> renegotiate -> start, then the overlay rescale
    assert_eq!(
        mock.take_ops(),
        vec![
            MockOp::Stop,
            MockOp::SetCaps(800, 608),
            MockOp::Start,
            MockOp::SetAnnotationTextSize(38),
            MockOp::SetAnnotationText("1/500\" ISO 100".to_string()),
        ]
    );
}

#[test]
fn test_annotation_size_follows_height() {
    let mock = MockPipeline::new().with_caps(1024, 768);
    let (mut session, _dir) = session_with(&mock);
    session.start().expect("start");

    let mut resolution = ResolutionController::new(MemoryBudget::new(512, 4096));
    let _ = resolution.increase(&mut session, "Auto Auto").expect("step");

    assert_eq!(session.caps(), (1280, 960));
    assert_eq!(mock.annotation_text_size(), 960 / 16);
}

#[test]
fn test_memory_gate_blocks_top_tiers() {
    // A 76 MB GPU split keeps everything from 2048 up unreachable
    let mock = MockPipeline::new().with_caps(1600, 1200);
    let (mut session, _dir) = session_with(&mock);
    session.start().expect("start");
    mock.take_ops();

    let mut resolution = ResolutionController::new(MemoryBudget::new(76, 512));
    assert_eq!(resolution.ceiling(), 1600);
    assert!(!resolution.can_increase(&session));
    assert!(
        resolution
            .increase(&mut session, "Auto Auto")
            .expect("step")
            .is_none()
    );
    assert_eq!(session.caps(), (1600, 1200));
    assert!(mock.take_ops().is_empty());
}

#[test]
fn test_partial_gate() {
    // 256 MB GPU and 1 GB system memory reach 3200 but not 4056
    let mock = MockPipeline::new().with_caps(3200, 2400);
    let (mut session, _dir) = session_with(&mock);
    session.start().expect("start");

    let mut resolution = ResolutionController::new(MemoryBudget::new(256, 1024));
    assert_eq!(resolution.ceiling(), 3200);
    assert!(
        resolution
            .increase(&mut session, "Auto Auto")
            .expect("step")
            .is_none()
    );
}

#[test]
fn test_full_ladder_walk() {
    let mock = MockPipeline::new().with_caps(160, 128);
    let (mut session, _dir) = session_with(&mock);
    session.start().expect("start");

    let mut resolution = ResolutionController::new(MemoryBudget::new(512, 4096));
    let mut visited = vec![session.caps()];
    while let Some(size) = resolution
        .increase(&mut session, "Auto Auto")
        .expect("step up")
    {
        visited.push(size);
    }

    let ladder: Vec<(u32, u32)> = RESOLUTION_LADDER
        .iter()
        .map(|s| (s.width, s.height))
        .collect();
    assert_eq!(visited, ladder);

    // And back down, symmetric
    while let Some(size) = resolution
        .decrease(&mut session, "Auto Auto")
        .expect("step down")
    {
        let expected = visited.pop().expect("walked past the floor");
        assert_eq!(visited.last(), Some(&size));
        assert!(expected.0 > size.0);
    }
    assert_eq!(session.caps(), (160, 128));
}

#[test]
fn test_floor_saturates() {
    let mock = MockPipeline::new().with_caps(160, 128);
    let (mut session, _dir) = session_with(&mock);
    session.start().expect("start");
    mock.take_ops();

    let mut resolution = ResolutionController::new(MemoryBudget::new(512, 4096));
    assert!(!resolution.can_decrease(&session));
    assert!(
        resolution
            .decrease(&mut session, "Auto Auto")
            .expect("step")
            .is_none()
    );
    assert!(mock.take_ops().is_empty());
}
