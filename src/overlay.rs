use std::io::Write;
use anyhow::Result;

use crate::types::UiUpdate;

/// Line-oriented marker feed for an external overlay renderer.
///
/// `P x y` calibration prompt marker (pixels), `C x y` calibration center
/// (normalized), `G x y` gaze position (pixels).
pub struct OverlaySink<W: Write> {
    out: W,
}

impl<W: Write> OverlaySink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn update_prompt(&mut self, x: f32, y: f32) -> Result<()> {
        writeln!(self.out, "P {:.2} {:.2}", x, y)?;
        Ok(())
    }

    pub fn update_calibration(&mut self, x: f32, y: f32) -> Result<()> {
        writeln!(self.out, "C {:.4} {:.4}", x, y)?;
        Ok(())
    }

    pub fn update_gaze(&mut self, x: f32, y: f32) -> Result<()> {
        writeln!(self.out, "G {:.2} {:.2}", x, y)?;
        Ok(())
    }

    pub fn apply(&mut self, update: &UiUpdate) -> Result<()> {
        match update {
            UiUpdate::CameraAccess(_) => Ok(()),
            UiUpdate::CalibrationPrompt { marker } => self.update_prompt(marker.x, marker.y),
            UiUpdate::Calibrated { center } => self.update_calibration(center.x, center.y),
            UiUpdate::Gaze(estimate) => self.update_gaze(estimate.position.x, estimate.position.y),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
