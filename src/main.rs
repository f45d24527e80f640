use anyhow::{Context, Result};
use clap::Parser;
use colored::*;

use eyes::app::EyeTrackingApp;
use eyes::args::{Args, DetectorKind};
use eyes::camera::{CameraAccess, StaticAuthorizer, SyntheticCamera};
use eyes::config::AppConfig;
use eyes::detector::{LandmarkDetector, ReplayDetector, SimulatedDetector};
use eyes::display::{Scene, ViewModel};
use eyes::overlay::OverlaySink;
use eyes::pipeline::PipelineSettings;
use eyes::logging;

fn create_detector(args: &Args) -> Result<Box<dyn LandmarkDetector>> {
    Ok(match args.detector {
        DetectorKind::Simulated => Box::new(SimulatedDetector::new(args.drop_every)),
        DetectorKind::Replay => {
            let path = args.replay.as_ref().context("--replay <file> is required for the replay detector")?;
            Box::new(ReplayDetector::from_path(path)?)
        }
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 0. Load Config
    let mut config = AppConfig::load(&args.config)?;
    args.apply_to(&mut config);
    logging::init(&config.log.filter)?;

    // 1. Collaborators
    let detector = create_detector(&args)?;
    eprintln!("{}", format!("Active Detector: {}", detector.name()).green());

    let access = if config.camera.access_granted {
        CameraAccess::Granted
    } else {
        CameraAccess::Denied
    };
    let screen = config.screen.size();
    let app = EyeTrackingApp {
        authorizer: StaticAuthorizer(access),
        source: SyntheticCamera::new(config.camera.width, config.camera.height, config.camera.fps, config.camera.frames),
        detector,
        screen,
        settings: PipelineSettings::from(&config),
    };

    // 2. Run, overlay feed on stdout
    let mut view = ViewModel::new(screen);
    let stdout = std::io::stdout();
    let mut sink = OverlaySink::new(stdout.lock());
    let summary = app.run(&mut view, &mut sink)?;

    // 3. Final HUD
    match view.scene() {
        Scene::CameraDenied => eprintln!("{}", "Camera access not granted".red()),
        Scene::Starting => eprintln!("{}", "Waiting for the first frame".yellow()),
        Scene::Calibrating {
            marker,
            marker_diameter,
            prompt,
            prompt_at,
        } => {
            eprintln!("{}", prompt.yellow().bold());
            eprintln!(
                "Center marker: {:.0}px circle at ({:.2}, {:.2}), prompt at ({:.2}, {:.2})",
                marker_diameter, marker.x, marker.y, prompt_at.x, prompt_at.y
            );
        }
        Scene::Tracking { marker, marker_size } => {
            eprintln!("{}", format!("Gaze marker: {:.0}px square at ({:.2}, {:.2})", marker_size, marker.x, marker.y).green());
        }
    }
    for line in view.hud_lines() {
        eprintln!("{}", line);
    }
    eprintln!(
        "Frames: {} captured, {} dropped, {} without face, {} published",
        summary.frames_captured, summary.frames_dropped, summary.pipeline.no_face, summary.pipeline.published
    );

    Ok(())
}
