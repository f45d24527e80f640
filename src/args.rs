use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DetectorKind {
    /// Eyes drifting in an ellipse around the frame center
    Simulated,
    /// Landmarks replayed from a JSON-lines file
    Replay,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file (created with defaults if missing)
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Landmark detector to run
    #[arg(long, value_enum, default_value_t = DetectorKind::Simulated)]
    pub detector: DetectorKind,

    /// Replay file for `--detector replay`
    #[arg(long, required_if_eq("detector", "replay"))]
    pub replay: Option<PathBuf>,

    /// Simulated detector reports no face every N frames (0 = never)
    #[arg(long, default_value_t = 0)]
    pub drop_every: u64,

    /// Frames to capture (overrides config, 0 = until the source ends)
    #[arg(long)]
    pub frames: Option<u64>,

    /// Camera frame rate (overrides config, 0 = unpaced)
    #[arg(long)]
    pub fps: Option<u32>,

    #[arg(long)]
    pub screen_width: Option<f32>,

    #[arg(long)]
    pub screen_height: Option<f32>,

    /// Behave as if camera access was refused
    #[arg(long)]
    pub deny_camera: bool,

    /// Skip frames where an eye fell back to the neutral anchor
    #[arg(long)]
    pub strict: bool,
}

impl Args {
    pub fn apply_to(&self, config: &mut crate::config::AppConfig) {
        if let Some(frames) = self.frames {
            config.camera.frames = frames;
        }
        if let Some(fps) = self.fps {
            config.camera.fps = fps;
        }
        if let Some(width) = self.screen_width {
            config.screen.width = width;
        }
        if let Some(height) = self.screen_height {
            config.screen.height = height;
        }
        if self.deny_camera {
            config.camera.access_granted = false;
        }
        if self.strict {
            config.tracking.accept_degraded = false;
        }
    }
}
