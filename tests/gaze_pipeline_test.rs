use anyhow::{anyhow, Result};
use approx::assert_abs_diff_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use eyes::app::EyeTrackingApp;
use eyes::camera::{CameraAccess, Frame, StaticAuthorizer, SyntheticCamera};
use eyes::detector::{LandmarkDetector, ReplayDetector};
use eyes::display::{Scene, ViewModel, CALIBRATION_PROMPT};
use eyes::overlay::OverlaySink;
use eyes::pipeline::{FramePipeline, PipelineSettings};
use eyes::types::{FaceObservation, GazePosition, Point2D, ScreenSize, UiUpdate};

const SCREEN: ScreenSize = ScreenSize::new(1170.0, 2532.0);

fn lockstep() -> PipelineSettings {
    PipelineSettings {
        drop_late: false,
        ..PipelineSettings::default()
    }
}

fn sample_face() -> FaceObservation {
    FaceObservation::new(
        vec![Point2D::new(0.40, 0.50), Point2D::new(0.42, 0.52)],
        vec![Point2D::new(0.60, 0.50), Point2D::new(0.62, 0.52)],
    )
}

fn run(records: Vec<Option<FaceObservation>>, access: CameraAccess) -> (ViewModel, String, eyes::app::RunSummary) {
    let frames = records.len() as u64;
    let app = EyeTrackingApp {
        authorizer: StaticAuthorizer(access),
        source: SyntheticCamera::new(8, 8, 0, frames),
        detector: ReplayDetector::from_records(records),
        screen: SCREEN,
        settings: lockstep(),
    };
    let mut view = ViewModel::new(SCREEN);
    let mut sink = OverlaySink::new(Vec::new());
    let summary = app.run(&mut view, &mut sink).unwrap();
    let feed = String::from_utf8(sink.into_inner()).unwrap();
    (view, feed, summary)
}

/// Counts detect calls and fails on chosen frames.
struct FlakyDetector {
    calls: Arc<AtomicUsize>,
    fail_on: Vec<u64>,
}

impl LandmarkDetector for FlakyDetector {
    fn name(&self) -> String {
        "Flaky".to_string()
    }

    fn detect(&mut self, frame: &Frame) -> Result<Option<FaceObservation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&frame.seq) {
            return Err(anyhow!("vision request failed"));
        }
        Ok(Some(sample_face()))
    }
}

#[test]
fn end_to_end_calibrates_then_tracks() {
    let (view, feed, summary) = run(vec![Some(sample_face()), Some(sample_face())], CameraAccess::Granted);

    assert_eq!(summary.frames_captured, 2);
    assert_eq!(summary.frames_dropped, 0);
    assert_eq!(summary.pipeline.published, 2);

    let center = view.calibration().center().expect("calibrated");
    assert_abs_diff_eq!(center.x, 0.51, epsilon = 1e-5);
    assert_abs_diff_eq!(center.y, 0.51, epsilon = 1e-5);

    let pos = view.position();
    assert_abs_diff_eq!(pos.x, 596.7, epsilon = 1e-3);
    assert_abs_diff_eq!(pos.y, 1240.68, epsilon = 1e-3);
    assert!(matches!(view.scene(), Scene::Tracking { .. }));

    assert_eq!(feed, "P 585.00 1266.00\nC 0.5100 0.5100\nG 596.70 1240.68\n");
}

#[test]
fn first_frame_publishes_no_gaze() {
    let (view, feed, _) = run(vec![Some(sample_face())], CameraAccess::Granted);

    assert!(view.calibration().is_set());
    assert_eq!(view.position(), GazePosition::new(585.0, 1266.0));
    assert!(view.last_estimate().is_none());
    assert!(!feed.contains('G'));
}

#[test]
fn frames_without_face_keep_previous_position() {
    let (view, _, summary) = run(
        vec![None, Some(sample_face()), None, Some(sample_face()), None],
        CameraAccess::Granted,
    );

    assert_eq!(summary.pipeline.no_face, 3);
    assert_eq!(summary.pipeline.published, 2);
    assert_eq!(view.last_estimate().map(|e| e.frame), Some(3));
}

#[test]
fn no_face_at_all_stays_uncalibrated() {
    let (view, feed, _) = run(vec![None, None, None], CameraAccess::Granted);

    assert!(!view.calibration().is_set());
    match view.scene() {
        Scene::Calibrating { marker, prompt, .. } => {
            assert_eq!(marker, Point2D::new(585.0, 1266.0));
            assert_eq!(prompt, CALIBRATION_PROMPT);
        }
        other => panic!("expected calibration prompt, got {:?}", other),
    }
    assert!(view.hud_lines().iter().any(|line| line == CALIBRATION_PROMPT));
    assert_eq!(feed, "P 585.00 1266.00\n");
}

#[test]
fn denied_camera_never_runs_detector() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = EyeTrackingApp {
        authorizer: StaticAuthorizer(CameraAccess::Denied),
        source: SyntheticCamera::new(8, 8, 0, 5),
        detector: FlakyDetector {
            calls: Arc::clone(&calls),
            fail_on: Vec::new(),
        },
        screen: SCREEN,
        settings: lockstep(),
    };
    let mut view = ViewModel::new(SCREEN);
    let mut sink = OverlaySink::new(Vec::new());
    let summary = app.run(&mut view, &mut sink).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(summary.frames_captured, 0);
    assert!(!view.camera_access_granted());
    assert_eq!(view.scene(), Scene::CameraDenied);
    assert!(sink.into_inner().is_empty());
}

#[test]
fn detector_errors_are_absorbed() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = EyeTrackingApp {
        authorizer: StaticAuthorizer(CameraAccess::Granted),
        source: SyntheticCamera::new(8, 8, 0, 4),
        detector: FlakyDetector {
            calls: Arc::clone(&calls),
            fail_on: vec![0, 2],
        },
        screen: SCREEN,
        settings: lockstep(),
    };
    let mut view = ViewModel::new(SCREEN);
    let mut sink = OverlaySink::new(Vec::new());
    let summary = app.run(&mut view, &mut sink).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(summary.pipeline.detector_errors, 2);
    assert_eq!(summary.pipeline.published, 2);
    assert_eq!(view.last_estimate().map(|e| e.frame), Some(3));
}

#[test]
fn strict_mode_waits_for_both_eyes() {
    let one_eye = FaceObservation {
        left_eye: None,
        right_eye: Some(vec![Point2D::new(0.6, 0.5)]),
    };
    let (tx, rx) = std::sync::mpsc::channel();
    let settings = PipelineSettings {
        accept_degraded: false,
        ..lockstep()
    };
    let pipeline = FramePipeline::spawn_with_sender(
        ReplayDetector::from_records(vec![Some(one_eye.clone()), Some(sample_face()), Some(one_eye)]),
        SCREEN,
        settings,
        tx,
    )
    .unwrap();

    for seq in 0..3 {
        let frame = Frame {
            seq,
            image: image::RgbImage::new(2, 2),
        };
        assert!(pipeline.submit(frame).unwrap());
    }
    let stats = pipeline.finish().unwrap();
    let updates: Vec<UiUpdate> = rx.iter().collect();

    assert_eq!(stats.degraded_skipped, 2);
    assert_eq!(updates.len(), 2);
    assert!(matches!(updates[0], UiUpdate::CalibrationPrompt { .. }));
    assert!(matches!(updates[1], UiUpdate::Calibrated { .. }));
}

#[test]
fn submit_after_worker_exit_fails() {
    let detector = FlakyDetector {
        calls: Arc::new(AtomicUsize::new(0)),
        fail_on: Vec::new(),
    };
    let (pipeline, rx) = FramePipeline::spawn(detector, SCREEN, lockstep()).unwrap();
    drop(rx);

    // The worker exits the next time a send to the UI fails.
    let frame = || Frame {
        seq: 0,
        image: image::RgbImage::new(2, 2),
    };
    let mut closed = false;
    for _ in 0..100 {
        if pipeline.submit(frame()).is_err() {
            closed = true;
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert!(closed, "pipeline kept accepting frames after the UI went away");
}
