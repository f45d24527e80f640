use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A single 2D point.
///
/// Normalized `[0, 1]` image coordinates or screen pixels, depending on the
/// call site. Serialized as a `[x, y]` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Componentwise average of two points.
    pub fn midpoint(self, other: Point2D) -> Point2D {
        Point2D::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl From<[f32; 2]> for Point2D {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point2D> for [f32; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

impl Add for Point2D {
    type Output = Point2D;

    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Latest gaze estimate in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GazePosition {
    pub x: f32,
    pub y: f32,
}

impl GazePosition {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<Point2D> for GazePosition {
    fn from(p: Point2D) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Display dimensions in pixels, as reported by the display collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f32,
    pub height: f32,
}

impl ScreenSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn midpoint(&self) -> Point2D {
        Point2D::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeSide {
    Left,
    Right,
}

/// How much of the eye data behind an anchor was actually detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionQuality {
    BothEyes,
    OneEye { missing: EyeSide },
    NoEyes,
}

impl DetectionQuality {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, DetectionQuality::BothEyes)
    }
}

/// Eye contours reported by the landmark detector for one face.
///
/// `None` and an empty contour both mean the detector found no landmarks
/// for that eye.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    #[serde(default)]
    pub left_eye: Option<Vec<Point2D>>,
    #[serde(default)]
    pub right_eye: Option<Vec<Point2D>>,
}

impl FaceObservation {
    pub fn new(left_eye: Vec<Point2D>, right_eye: Vec<Point2D>) -> Self {
        Self {
            left_eye: Some(left_eye),
            right_eye: Some(right_eye),
        }
    }

    pub fn left_eye(&self) -> &[Point2D] {
        self.left_eye.as_deref().unwrap_or(&[])
    }

    pub fn right_eye(&self) -> &[Point2D] {
        self.right_eye.as_deref().unwrap_or(&[])
    }
}

/// Normalized gaze anchor computed from both eyes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeAnchor {
    pub point: Point2D,
    pub quality: DetectionQuality,
}

/// A published per-frame result while calibrated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeEstimate {
    pub frame: u64,
    pub anchor: GazeAnchor,
    pub position: GazePosition,
    /// Anchor relative to the calibration center. Reported only; the
    /// screen mapping does not use it.
    pub offset: Point2D,
}

/// Messages handed from the frame worker to the UI owner.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    CameraAccess(bool),
    CalibrationPrompt { marker: Point2D },
    Calibrated { center: Point2D },
    Gaze(GazeEstimate),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_serializes_as_pair() {
        let p = Point2D::new(0.25, 0.75);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "[0.25,0.75]");
        let back: Point2D = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_missing_eye_reads_as_empty() {
        let face: FaceObservation = serde_json::from_str(r#"{"left_eye": [[0.1, 0.2]]}"#).unwrap();
        assert_eq!(face.left_eye().len(), 1);
        assert!(face.right_eye().is_empty());
    }

    #[test]
    fn test_screen_midpoint() {
        let screen = ScreenSize::new(1170.0, 2532.0);
        assert_eq!(screen.midpoint(), Point2D::new(585.0, 1266.0));
    }
}
