use tracing::{debug, info};

use crate::types::{GazePosition, Point2D, ScreenSize};

/// One-way calibration latch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum CalibrationState {
    #[default]
    Uncalibrated,
    Calibrated { center: Point2D },
}

impl CalibrationState {
    pub fn is_set(&self) -> bool {
        matches!(self, CalibrationState::Calibrated { .. })
    }

    pub fn center(&self) -> Option<Point2D> {
        match self {
            CalibrationState::Calibrated { center } => Some(*center),
            CalibrationState::Uncalibrated => None,
        }
    }
}

/// What a processed anchor turned into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The anchor was latched as the calibration center. Nothing to draw yet.
    Calibrated { center: Point2D },
    Gaze(GazePosition),
}

/// Fixed camera-to-screen transform: axes swapped, vertical flipped.
///
/// The calibration center is not involved.
pub fn project_to_screen(anchor: Point2D, screen: ScreenSize) -> GazePosition {
    GazePosition::new(anchor.y * screen.width, (1.0 - anchor.x) * screen.height)
}

#[derive(Debug, Default)]
pub struct CalibrationManager {
    state: CalibrationState,
}

impl CalibrationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Latches `anchor` as the center on first call. Returns whether this
    /// call performed the transition; later calls leave the center alone.
    pub fn calibrate(&mut self, anchor: Point2D) -> bool {
        match self.state {
            CalibrationState::Uncalibrated => {
                self.state = CalibrationState::Calibrated { center: anchor };
                info!(x = anchor.x, y = anchor.y, "Calibration center set");
                true
            }
            CalibrationState::Calibrated { center } => {
                debug!(x = center.x, y = center.y, "Calibration already set, ignoring");
                false
            }
        }
    }

    pub fn process(&mut self, anchor: Point2D, screen: ScreenSize) -> FrameOutcome {
        match self.state {
            CalibrationState::Uncalibrated => {
                self.calibrate(anchor);
                FrameOutcome::Calibrated { center: anchor }
            }
            CalibrationState::Calibrated { .. } => FrameOutcome::Gaze(project_to_screen(anchor, screen)),
        }
    }

    /// Anchor relative to the stored center, `None` until calibrated.
    pub fn relative_offset(&self, anchor: Point2D) -> Option<Point2D> {
        self.state.center().map(|center| anchor - center)
    }
}
