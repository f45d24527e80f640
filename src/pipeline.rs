use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TrySendError};
use std::thread;
use tracing::{debug, info, warn};

use crate::calibration::{CalibrationManager, CalibrationState, FrameOutcome};
use crate::camera::Frame;
use crate::detector::LandmarkDetector;
use crate::display::ScreenMetrics;
use crate::error::{Error, Result};
use crate::gaze::face_anchor;
use crate::types::{FaceObservation, GazeEstimate, ScreenSize, UiUpdate};

#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub frame_queue: usize,
    pub drop_late: bool,
    pub accept_degraded: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            frame_queue: 1,
            drop_late: true,
            accept_degraded: true,
        }
    }
}

impl From<&crate::config::AppConfig> for PipelineSettings {
    fn from(config: &crate::config::AppConfig) -> Self {
        Self {
            frame_queue: config.pipeline.frame_queue.max(1),
            drop_late: config.pipeline.drop_late,
            accept_degraded: config.tracking.accept_degraded,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames_processed: u64,
    pub no_face: u64,
    pub degraded_skipped: u64,
    pub detector_errors: u64,
    pub published: u64,
}

// =========================================================================
// Frame Processor
// Detection result -> anchor -> calibration latch or screen position.
// =========================================================================
pub struct FrameProcessor {
    calibration: CalibrationManager,
    accept_degraded: bool,
    stats: PipelineStats,
}

impl FrameProcessor {
    pub fn new(settings: &PipelineSettings) -> Self {
        Self {
            calibration: CalibrationManager::new(),
            accept_degraded: settings.accept_degraded,
            stats: PipelineStats::default(),
        }
    }

    pub fn calibration(&self) -> CalibrationState {
        self.calibration.state()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Returns the update to publish for this frame, if any.
    pub fn process(&mut self, seq: u64, face: Option<&FaceObservation>, screen: ScreenSize) -> Option<UiUpdate> {
        self.stats.frames_processed += 1;

        let Some(face) = face else {
            self.stats.no_face += 1;
            debug!(seq, "No face detected, keeping previous position");
            return None;
        };

        let anchor = face_anchor(face);
        if anchor.quality.is_degraded() && !self.accept_degraded {
            self.stats.degraded_skipped += 1;
            debug!(seq, quality = ?anchor.quality, "Skipping degraded frame");
            return None;
        }

        let update = match self.calibration.process(anchor.point, screen) {
            FrameOutcome::Calibrated { center } => UiUpdate::Calibrated { center },
            FrameOutcome::Gaze(position) => {
                let offset = self
                    .calibration
                    .relative_offset(anchor.point)
                    .unwrap_or_default();
                UiUpdate::Gaze(GazeEstimate {
                    frame: seq,
                    anchor,
                    position,
                    offset,
                })
            }
        };
        self.stats.published += 1;
        Some(update)
    }

    fn record_detector_error(&mut self) {
        self.stats.frames_processed += 1;
        self.stats.detector_errors += 1;
    }
}

// =========================================================================
// Frame Pipeline
// A single worker thread owns the detector and calibration state. Results
// are handed to the UI owner over a channel.
// =========================================================================
pub struct FramePipeline {
    tx_frame: Option<SyncSender<Frame>>,
    worker: Option<thread::JoinHandle<PipelineStats>>,
    drop_late: bool,
}

impl FramePipeline {
    /// Starts the worker and returns the handle plus the UI-side receiver.
    pub fn spawn<D, S>(detector: D, screen: S, settings: PipelineSettings) -> Result<(Self, Receiver<UiUpdate>)>
    where
        D: LandmarkDetector + 'static,
        S: ScreenMetrics + 'static,
    {
        let (tx_ui, rx_ui) = mpsc::channel();
        let pipeline = Self::spawn_with_sender(detector, screen, settings, tx_ui)?;
        Ok((pipeline, rx_ui))
    }

    pub fn spawn_with_sender<D, S>(
        mut detector: D,
        screen: S,
        settings: PipelineSettings,
        tx_ui: Sender<UiUpdate>,
    ) -> Result<Self>
    where
        D: LandmarkDetector + 'static,
        S: ScreenMetrics + 'static,
    {
        let (tx_frame, rx_frame) = mpsc::sync_channel::<Frame>(settings.frame_queue.max(1));

        let worker = thread::Builder::new()
            .name("frame-pipeline".to_string())
            .spawn(move || {
                let mut processor = FrameProcessor::new(&settings);
                info!("Frame worker started: {}", detector.name());

                if tx_ui
                    .send(UiUpdate::CalibrationPrompt {
                        marker: screen.screen_size().midpoint(),
                    })
                    .is_err()
                {
                    return processor.stats();
                }

                while let Ok(frame) = rx_frame.recv() {
                    let face = match detector.detect(&frame) {
                        Ok(face) => face,
                        Err(e) => {
                            warn!(seq = frame.seq, "Error detecting eye landmarks: {:#}", e);
                            processor.record_detector_error();
                            continue;
                        }
                    };

                    if let Some(update) = processor.process(frame.seq, face.as_ref(), screen.screen_size()) {
                        if tx_ui.send(update).is_err() {
                            debug!("UI receiver gone, stopping frame worker");
                            break;
                        }
                    }
                }

                let stats = processor.stats();
                info!(?stats, "Frame worker stopped");
                stats
            })
            .map_err(Error::Spawn)?;

        Ok(Self {
            tx_frame: Some(tx_frame),
            worker: Some(worker),
            drop_late: settings.drop_late,
        })
    }

    /// Hands a frame to the worker. Returns `false` when the frame was
    /// dropped because the worker is still busy.
    pub fn submit(&self, frame: Frame) -> Result<bool> {
        let tx = self.tx_frame.as_ref().ok_or(Error::PipelineClosed)?;
        if self.drop_late {
            match tx.try_send(frame) {
                Ok(()) => Ok(true),
                Err(TrySendError::Full(frame)) => {
                    debug!(seq = frame.seq, "Worker busy, dropping frame");
                    Ok(false)
                }
                Err(TrySendError::Disconnected(_)) => Err(Error::PipelineClosed),
            }
        } else {
            tx.send(frame).map_err(|_| Error::PipelineClosed)?;
            Ok(true)
        }
    }

    /// Stops accepting frames, lets the worker drain its queue, and joins it.
    pub fn finish(mut self) -> Result<PipelineStats> {
        self.shutdown().ok_or(Error::PipelineClosed)
    }

    fn shutdown(&mut self) -> Option<PipelineStats> {
        self.tx_frame.take();
        let worker = self.worker.take()?;
        match worker.join() {
            Ok(stats) => Some(stats),
            Err(_) => {
                warn!("Frame worker panicked");
                None
            }
        }
    }
}

impl Drop for FramePipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
