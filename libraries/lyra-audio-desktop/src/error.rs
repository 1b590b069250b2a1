//! Desktop audio errors

use lyra_playback::PlaybackError;
use thiserror::Error;

/// Result type for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// No usable output device
    #[error("Audio device error: {0}")]
    Device(String),

    /// Fetch runtime could not be created
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// HTTP transport error
    #[error("Fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} for {url}")]
    Http {
        /// Response status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Media exceeds the configured size cap
    #[error("Media at {location} exceeds the {limit} byte limit")]
    TooLarge {
        /// Configured cap in bytes
        limit: u64,
        /// URL or path
        location: String,
    },

    /// No progress within the fetch timeout
    #[error("Fetch stalled: {0}")]
    Stalled(String),

    /// URL scheme we cannot load from
    #[error("Unsupported media location: {0}")]
    UnsupportedLocation(String),

    /// Local file error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Audio thread is gone
    #[error("Audio thread stopped")]
    ThreadStopped,
}

impl From<AudioError> for PlaybackError {
    fn from(err: AudioError) -> Self {
        PlaybackError::Engine(err.to_string())
    }
}
