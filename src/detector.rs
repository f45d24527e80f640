use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::camera::Frame;
use crate::error::Error;
use crate::types::{FaceObservation, Point2D};

/// Face-landmark detector collaborator.
///
/// `Ok(None)` means no face was found in the frame. Coordinates are
/// normalized to the image, `[0, 1]` on both axes.
pub trait LandmarkDetector: Send {
    fn name(&self) -> String;
    fn detect(&mut self, frame: &Frame) -> Result<Option<FaceObservation>>;
}

impl<T: LandmarkDetector + ?Sized> LandmarkDetector for Box<T> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn detect(&mut self, frame: &Frame) -> Result<Option<FaceObservation>> {
        (**self).detect(frame)
    }
}

// =========================================================================
// Simulated Detector
// Eyes drift in a slow ellipse around the frame center.
// =========================================================================
pub struct SimulatedDetector {
    frame_count: u64,
    drop_every: u64,
}

impl SimulatedDetector {
    const CONTOUR_POINTS: usize = 6;
    const EYE_SPREAD: f32 = 0.08;

    /// Every `drop_every`-th frame reports no face; 0 never drops.
    pub fn new(drop_every: u64) -> Self {
        Self {
            frame_count: 0,
            drop_every,
        }
    }

    fn contour(center: Point2D) -> Vec<Point2D> {
        (0..Self::CONTOUR_POINTS)
            .map(|i| {
                let a = i as f32 / Self::CONTOUR_POINTS as f32 * std::f32::consts::TAU;
                Point2D::new(center.x + a.cos() * 0.02, center.y + a.sin() * 0.01)
            })
            .collect()
    }
}

impl LandmarkDetector for SimulatedDetector {
    fn name(&self) -> String {
        "Simulated Eye Landmarks".to_string()
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Option<FaceObservation>> {
        self.frame_count += 1;
        if self.drop_every > 0 && self.frame_count % self.drop_every == 0 {
            return Ok(None);
        }

        let t = self.frame_count as f32 * 0.05;
        let cx = 0.5 + t.cos() * 0.15;
        let cy = 0.5 + t.sin() * 0.10;

        Ok(Some(FaceObservation::new(
            Self::contour(Point2D::new(cx, cy - Self::EYE_SPREAD)),
            Self::contour(Point2D::new(cx, cy + Self::EYE_SPREAD)),
        )))
    }
}

// =========================================================================
// Replay Detector
// One JSON record per line, looked up by frame sequence number.
// =========================================================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default)]
    pub face: Option<FaceObservation>,
}

pub struct ReplayDetector {
    records: Vec<Option<FaceObservation>>,
}

impl ReplayDetector {
    pub fn from_records(records: Vec<Option<FaceObservation>>) -> Self {
        Self { records }
    }

    pub fn from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::ReplayIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file).map_err(|e| match e {
            Error::ReplayRead(source) => Error::ReplayIo {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Blank lines are skipped but still count toward line numbers.
    pub fn from_reader(reader: impl Read) -> crate::Result<Self> {
        let mut records = Vec::new();
        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line.map_err(Error::ReplayRead)?;
            if line.trim().is_empty() {
                continue;
            }
            let record: FrameRecord = serde_json::from_str(&line).map_err(|source| Error::Replay {
                line: idx + 1,
                source,
            })?;
            records.push(record.face);
        }
        Ok(Self { records })
    }
}

impl LandmarkDetector for ReplayDetector {
    fn name(&self) -> String {
        format!("Replay ({} records)", self.records.len())
    }

    fn detect(&mut self, frame: &Frame) -> Result<Option<FaceObservation>> {
        Ok(usize::try_from(frame.seq)
            .ok()
            .and_then(|i| self.records.get(i))
            .cloned()
            .flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gaze::eye_anchor;
    use approx::assert_abs_diff_eq;
    use image::RgbImage;

    fn frame(seq: u64) -> Frame {
        Frame {
            seq,
            image: RgbImage::new(2, 2),
        }
    }

    #[test]
    fn test_simulated_contours_center_on_eyes() {
        let mut detector = SimulatedDetector::new(0);
        let face = detector.detect(&frame(0)).unwrap().unwrap();
        assert_eq!(face.left_eye().len(), 6);

        let anchor = eye_anchor(face.left_eye(), face.right_eye());
        let t = 0.05f32;
        assert_abs_diff_eq!(anchor.point.x, 0.5 + t.cos() * 0.15, epsilon = 1e-4);
        assert_abs_diff_eq!(anchor.point.y, 0.5 + t.sin() * 0.10, epsilon = 1e-4);
    }

    #[test]
    fn test_simulated_drops_faces() {
        let mut detector = SimulatedDetector::new(3);
        let found: Vec<bool> = (0..6).map(|i| detector.detect(&frame(i)).unwrap().is_some()).collect();
        assert_eq!(found, vec![true, true, false, true, true, false]);
    }

    #[test]
    fn test_replay_reads_json_lines() {
        let input = r#"{"face": null}

{"face": {"left_eye": [[0.4, 0.5], [0.42, 0.52]], "right_eye": [[0.6, 0.5]]}}
{}
"#;
        let mut detector = ReplayDetector::from_reader(input.as_bytes()).unwrap();
        assert_eq!(detector.name(), "Replay (3 records)");
        assert!(detector.detect(&frame(0)).unwrap().is_none());
        let face = detector.detect(&frame(1)).unwrap().unwrap();
        assert_eq!(face.left_eye().len(), 2);
        assert!(detector.detect(&frame(2)).unwrap().is_none());
        assert!(detector.detect(&frame(99)).unwrap().is_none());
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn test_read_failure_names_no_file() {
        match ReplayDetector::from_reader(BrokenReader) {
            Err(e @ Error::ReplayRead(_)) => {
                assert_eq!(e.to_string(), "failed to read replay stream: device gone");
            }
            other => panic!("expected read error, got {:?}", other.map(|d| d.name())),
        }
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.jsonl");
        match ReplayDetector::from_path(&path) {
            Err(Error::ReplayIo { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected io error, got {:?}", other.map(|d| d.name())),
        }
    }

    #[test]
    fn test_replay_reports_bad_line() {
        let input = "{\"face\": null}\n{\"face\": 7}\n";
        match ReplayDetector::from_reader(input.as_bytes()) {
            Err(Error::Replay { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected replay error, got {:?}", other.map(|d| d.name())),
        }
    }
}
