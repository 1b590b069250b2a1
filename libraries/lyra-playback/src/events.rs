//! Playback Events
//!
//! Event-based communication for UI synchronization. The controller queues
//! these as it mutates state; consumers drain them after each operation or
//! pump.

use crate::types::PlaybackState;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Controller state changed
    StateChanged {
        /// The new state
        state: PlaybackState,
    },

    /// Current track changed (or was cleared)
    TrackChanged {
        /// ID of the new current track (if any)
        track_id: Option<String>,
        /// ID of the previous track (if any)
        previous_track_id: Option<String>,
    },

    /// Position update (periodic, and after seeks)
    PositionUpdate {
        /// Current playback position in seconds
        position_secs: f64,
        /// Total track duration in seconds (0 if unknown)
        duration_secs: f64,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0.0-1.0)
        level: f32,
        /// Whether audio is muted
        muted: bool,
    },

    /// Queue changed (tracks added/removed/consumed)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// History changed
    HistoryChanged {
        /// New history length
        length: usize,
    },

    /// A track failed and was skipped
    Error {
        /// Error message
        message: String,
    },
}
