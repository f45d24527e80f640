//! Gaze tracking from eye landmarks.
//!
//! A frame worker turns detected eye contours into a normalized anchor,
//! latches the first anchor as the calibration center, and maps every later
//! anchor onto the screen. Results reach the UI owner over a channel.

pub mod app;
pub mod args;
pub mod calibration;
pub mod camera;
pub mod config;
pub mod detector;
pub mod display;
pub mod error;
pub mod gaze;
pub mod logging;
pub mod overlay;
pub mod pipeline;
pub mod types;


pub use error::{Error, Result};
