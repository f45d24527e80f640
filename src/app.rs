use anyhow::{Context, Result};
use std::io::Write;
use std::sync::mpsc::Receiver;
use tracing::{info, warn};

use crate::camera::{CameraAuthorizer, FrameSource};
use crate::detector::LandmarkDetector;
use crate::display::{ScreenMetrics, ViewModel};
use crate::overlay::OverlaySink;
use crate::pipeline::{FramePipeline, PipelineSettings, PipelineStats};
use crate::types::UiUpdate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_captured: u64,
    pub frames_dropped: u64,
    pub pipeline: PipelineStats,
}

/// Camera, detector and display wired to the frame worker and view model.
pub struct EyeTrackingApp<A, F, D, S> {
    pub authorizer: A,
    pub source: F,
    pub detector: D,
    pub screen: S,
    pub settings: PipelineSettings,
}

impl<A, F, D, S> EyeTrackingApp<A, F, D, S>
where
    A: CameraAuthorizer,
    F: FrameSource,
    D: LandmarkDetector + 'static,
    S: ScreenMetrics + 'static,
{
    /// Runs until the frame source ends. The view model and overlay sink are
    /// updated on the calling thread only.
    pub fn run<W: Write>(self, view: &mut ViewModel, sink: &mut OverlaySink<W>) -> Result<RunSummary> {
        let Self {
            mut authorizer,
            mut source,
            detector,
            screen,
            settings,
        } = self;

        let granted = authorizer.request_access().is_granted();
        publish(view, sink, UiUpdate::CameraAccess(granted))?;
        if !granted {
            warn!("Camera access not granted");
            sink.flush()?;
            return Ok(RunSummary::default());
        }

        info!("Opened camera: {}", source.name());
        let (pipeline, rx_ui) = FramePipeline::spawn(detector, screen, settings)?;

        let mut summary = RunSummary::default();
        while let Some(frame) = source.next_frame().context("Failed to capture frame")? {
            summary.frames_captured += 1;
            if !pipeline.submit(frame)? {
                summary.frames_dropped += 1;
            }
            drain(&rx_ui, view, sink, false)?;
        }

        summary.pipeline = pipeline.finish()?;
        drain(&rx_ui, view, sink, true)?;
        sink.flush()?;

        info!(
            captured = summary.frames_captured,
            dropped = summary.frames_dropped,
            published = summary.pipeline.published,
            "Camera stopped"
        );
        Ok(summary)
    }
}

fn publish<W: Write>(view: &mut ViewModel, sink: &mut OverlaySink<W>, update: UiUpdate) -> Result<()> {
    view.apply(&update);
    sink.apply(&update)
}

/// Applies pending updates. With `to_end` it blocks until the worker side
/// of the channel is gone.
fn drain<W: Write>(rx: &Receiver<UiUpdate>, view: &mut ViewModel, sink: &mut OverlaySink<W>, to_end: bool) -> Result<()> {
    if to_end {
        for update in rx.iter() {
            publish(view, sink, update)?;
        }
    } else {
        while let Ok(update) = rx.try_recv() {
            publish(view, sink, update)?;
        }
    }
    Ok(())
}
