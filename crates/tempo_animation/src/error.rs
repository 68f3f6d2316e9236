//! Animation error types

use thiserror::Error;

use crate::timeline::TimelineId;

/// Animation-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimationError {
    /// A timeline's tick callback panicked; the timeline has been stopped
    #[error("Tick callback of timeline {id} panicked: {message}")]
    CallbackPanicked { id: TimelineId, message: String },

    /// Curve name lookup failed
    #[error("Unknown easing curve: {0}")]
    UnknownEasing(String),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
