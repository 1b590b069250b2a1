//! Error types for playback management

use thiserror::Error;

/// Playback errors
///
/// None of these escape the controller's operations: they are recovered by
/// advancing past the failing track and surfaced through events and the
/// snapshot's `last_failure`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Track has no usable URL variant
    #[error("No playable source for track {track_id}")]
    NoPlayableSource {
        /// Offending track
        track_id: String,
    },

    /// Engine failed to load or play the media
    #[error("Failed to load track {track_id}: {message}")]
    Load {
        /// Offending track
        track_id: String,
        /// Engine-provided reason
        message: String,
    },

    /// Engine error unrelated to a specific track
    #[error("Engine error: {0}")]
    Engine(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
