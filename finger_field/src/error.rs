//! Error types.

use thiserror::Error;

/// Session-ending failures.
#[derive(Debug, Error)]
pub enum AppError {
    /// The camera could not be opened.  Nothing else is started.
    #[error("camera unavailable: {0}")]
    Camera(String),

    #[error("window error: {0}")]
    Window(#[from] minifb::Error),
}

/// Failures reported by a hand detector.
///
/// Inference errors are per-frame and never end the session; the frame
/// driver treats them as "no hand this frame".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    #[error("detector failed to initialise: {0}")]
    Init(String),

    #[error("inference failed: {0}")]
    Inference(String),
}
