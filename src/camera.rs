use anyhow::Result;
use image::RgbImage;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// One captured camera frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub seq: u64,
    pub image: RgbImage,
}

/// Anything that can deliver camera frames in order.
pub trait FrameSource {
    fn name(&self) -> String;
    /// `Ok(None)` once the stream has ended.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAccess {
    Granted,
    Denied,
}

impl CameraAccess {
    pub fn is_granted(&self) -> bool {
        matches!(self, CameraAccess::Granted)
    }
}

pub trait CameraAuthorizer {
    fn request_access(&mut self) -> CameraAccess;
}

/// Authorizer with a fixed answer, e.g. from config or a CLI flag.
#[derive(Debug, Clone, Copy)]
pub struct StaticAuthorizer(pub CameraAccess);

impl CameraAuthorizer for StaticAuthorizer {
    fn request_access(&mut self) -> CameraAccess {
        self.0
    }
}

/// Blank frames at a fixed size, paced to a target frame rate.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    interval: Option<Duration>,
    limit: Option<u64>,
    seq: u64,
    last: Option<Instant>,
}

impl SyntheticCamera {
    /// `fps == 0` delivers frames as fast as they are requested; `frames == 0`
    /// never ends the stream.
    pub fn new(width: u32, height: u32, fps: u32, frames: u64) -> Self {
        let interval = (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64));
        let limit = (frames > 0).then_some(frames);
        Self {
            width,
            height,
            interval,
            limit,
            seq: 0,
            last: None,
        }
    }
}

impl FrameSource for SyntheticCamera {
    fn name(&self) -> String {
        format!("Synthetic {}x{}", self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.limit.is_some_and(|limit| self.seq >= limit) {
            return Ok(None);
        }

        if let (Some(interval), Some(last)) = (self.interval, self.last) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        self.last = Some(Instant::now());

        let frame = Frame {
            seq: self.seq,
            image: RgbImage::new(self.width, self.height),
        };
        self.seq += 1;
        debug!(seq = frame.seq, "Captured frame");
        Ok(Some(frame))
    }
}
