//! Error types for the Gesturing library.
//!
//! This module defines the custom error types used throughout the crate.
//! It uses the `thiserror` crate to derive error implementations. File I/O
//! stays on `anyhow` with context attached at the call site.

use thiserror::Error;

/// Custom error type for the Gesturing library.
///
/// Malformed input from the tracking stage is an error. A well formed hand
/// that matches no gesture is not: it classifies as `Gesture::Unknown`.
#[derive(Error, Debug)]
pub enum Error {
    /// The tracker handed over the wrong number of landmarks
    #[error("Invalid landmarks: expected {expected} points, found {found}")]
    InvalidLandmarks { expected: usize, found: usize },

    /// Frame dimensions must be positive and finite
    #[error("Invalid frame size: {width}x{height}")]
    InvalidFrameSize { width: f64, height: f64 },

    /// A tracker record that could not be decoded
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// A string that does not name one of the gesture labels
    #[error("Unknown gesture label: {0}")]
    UnknownGesture(String),

    /// Error related to keyboard input simulation
    #[error("Keyboard input error: {0}")]
    KeyboardInput(String),

    /// Error related to application configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<rdev::SimulateError> for Error {
    fn from(_: rdev::SimulateError) -> Self {
        Error::KeyboardInput("could not simulate key event".to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
