use tracing::{debug, warn};

use crate::calibration::CalibrationState;
use crate::types::{GazeEstimate, GazePosition, Point2D, ScreenSize, UiUpdate};

pub const CALIBRATION_PROMPT: &str = "Please look at the center of the screen";
/// Circle drawn where the user should look while calibrating.
pub const CENTER_MARKER_DIAMETER: f32 = 20.0;
/// Square drawn at the gaze position once calibrated.
pub const GAZE_MARKER_SIZE: f32 = 50.0;
/// Prompt text sits this far above the center marker.
pub const PROMPT_OFFSET: f32 = 30.0;

/// Display collaborator: screen size at mapping time.
pub trait ScreenMetrics: Send {
    fn screen_size(&self) -> ScreenSize;
}

impl ScreenMetrics for ScreenSize {
    fn screen_size(&self) -> ScreenSize {
        *self
    }
}

/// What the UI should currently draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scene {
    CameraDenied,
    /// Access granted, the frame worker has not asked for calibration yet.
    Starting,
    Calibrating {
        marker: Point2D,
        marker_diameter: f32,
        prompt: &'static str,
        prompt_at: Point2D,
    },
    Tracking {
        marker: GazePosition,
        marker_size: f32,
    },
}

/// Render state. Owned by the UI side only; mutated by applying updates
/// received from the frame worker.
#[derive(Debug, Clone)]
pub struct ViewModel {
    position: GazePosition,
    prompt_marker: Option<Point2D>,
    calibration: CalibrationState,
    camera_access_granted: bool,
    last_estimate: Option<GazeEstimate>,
    updates_applied: u64,
}

impl ViewModel {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            position: screen.midpoint().into(),
            prompt_marker: None,
            calibration: CalibrationState::Uncalibrated,
            camera_access_granted: false,
            last_estimate: None,
            updates_applied: 0,
        }
    }

    pub fn position(&self) -> GazePosition {
        self.position
    }

    pub fn calibration(&self) -> CalibrationState {
        self.calibration
    }

    pub fn camera_access_granted(&self) -> bool {
        self.camera_access_granted
    }

    pub fn last_estimate(&self) -> Option<&GazeEstimate> {
        self.last_estimate.as_ref()
    }

    pub fn updates_applied(&self) -> u64 {
        self.updates_applied
    }

    pub fn apply(&mut self, update: &UiUpdate) {
        self.updates_applied += 1;
        match update {
            UiUpdate::CameraAccess(granted) => self.camera_access_granted = *granted,
            UiUpdate::CalibrationPrompt { marker } => {
                debug!(x = marker.x, y = marker.y, "Showing calibration prompt");
                self.prompt_marker = Some(*marker);
            }
            UiUpdate::Calibrated { center } => {
                if let CalibrationState::Calibrated { center: current } = self.calibration {
                    warn!(x = current.x, y = current.y, "Calibration already set, ignoring new center");
                } else {
                    self.calibration = CalibrationState::Calibrated { center: *center };
                }
            }
            UiUpdate::Gaze(estimate) => {
                if !self.calibration.is_set() {
                    warn!(frame = estimate.frame, "Gaze update before calibration, ignoring");
                    return;
                }
                self.position = estimate.position;
                self.last_estimate = Some(*estimate);
            }
        }
    }

    pub fn scene(&self) -> Scene {
        if !self.camera_access_granted {
            return Scene::CameraDenied;
        }
        match (self.calibration, self.prompt_marker) {
            (CalibrationState::Calibrated { .. }, _) => Scene::Tracking {
                marker: self.position,
                marker_size: GAZE_MARKER_SIZE,
            },
            (CalibrationState::Uncalibrated, Some(marker)) => Scene::Calibrating {
                marker,
                marker_diameter: CENTER_MARKER_DIAMETER,
                prompt: CALIBRATION_PROMPT,
                prompt_at: Point2D::new(marker.x, marker.y - PROMPT_OFFSET),
            },
            (CalibrationState::Uncalibrated, None) => Scene::Starting,
        }
    }

    /// HUD text shown along the top of the screen.
    pub fn hud_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("X: {:.2}", self.position.x),
            format!("Y: {:.2}", self.position.y),
        ];
        if let Some(center) = self.calibration.center() {
            lines.push(format!("Center X: {:.2}", center.x));
            lines.push(format!("Center Y: {:.2}", center.y));
        }
        if let Scene::Calibrating { prompt, .. } = self.scene() {
            lines.push(prompt.to_string());
        }
        if let Some(estimate) = &self.last_estimate {
            lines.push(format!("Offset: {:+.3}, {:+.3}", estimate.offset.x, estimate.offset.y));
            if estimate.anchor.quality.is_degraded() {
                lines.push(format!("Quality: {:?}", estimate.anchor.quality));
            }
        }
        lines
    }
}
