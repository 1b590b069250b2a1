//! Core types for playback management

use crate::source::SourcePolicy;
use lyra_core::Track;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default playback volume (linear, 0.0-1.0)
pub const DEFAULT_VOLUME: f32 = 0.7;

/// Default number of tracks kept in history
pub const DEFAULT_HISTORY_SIZE: usize = 20;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No current track
    Idle,

    /// Engine is fetching/decoding the current track
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// What a user "next" does when the queue is empty
///
/// A natural end of track with an empty queue always stops; this only covers
/// the manual skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManualSkipAtEnd {
    /// Restart the current track from the beginning
    #[default]
    Restart,

    /// Tear playback down to idle
    Stop,

    /// Do nothing
    Ignore,
}

/// Why the controller is moving to the next track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceTrigger {
    /// User pressed "next"
    User,

    /// Current track ended naturally
    TrackEnded,
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Maximum history size (default: 20)
    pub history_size: usize,

    /// Initial volume (0.0-1.0, default: 0.7)
    pub volume: f32,

    /// "Previous" restarts the current track past this position (default: 3s)
    pub restart_threshold: Duration,

    /// How often the position is sampled while playing (default: 1s)
    pub position_poll_interval: Duration,

    /// Behaviour of a manual skip with an empty queue (default: restart)
    pub manual_skip_at_end: ManualSkipAtEnd,

    /// How a playable URL is picked from a track's variants (default: last)
    pub source_policy: SourcePolicy,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
            volume: DEFAULT_VOLUME,
            restart_threshold: Duration::from_secs(3),
            position_poll_interval: Duration::from_secs(1),
            manual_skip_at_end: ManualSkipAtEnd::default(),
            source_policy: SourcePolicy::default(),
        }
    }
}

/// Read-only view of the player for UI consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Controller state
    pub state: PlaybackState,

    /// Track bound to the live engine handle
    pub current_track: Option<Track>,

    /// Whether audio is audible right now
    pub is_playing: bool,

    /// Volume level (0.0-1.0), kept while muted
    pub volume: f32,

    /// Mute state
    pub muted: bool,

    /// Last sampled position in seconds
    pub position_secs: f64,

    /// Duration reported by the engine (0 until loaded)
    pub duration_secs: f64,

    /// Upcoming tracks, next first
    pub queue: Vec<Track>,

    /// Previously played tracks, most recent first
    pub history: Vec<Track>,

    /// Most recent recovered playback failure
    pub last_failure: Option<String>,
}
