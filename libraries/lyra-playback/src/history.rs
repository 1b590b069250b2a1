//! Recently played tracks
//!
//! Feeds "previous": the newest entry is the one a skip back returns to.

use crate::types::DEFAULT_HISTORY_SIZE;
use lyra_core::Track;
use std::collections::VecDeque;

/// Bounded, most-recent-first list of played tracks
///
/// Pushing onto a full history discards the oldest entry.
#[derive(Debug, Clone)]
pub struct History {
    /// History buffer (most recent = front)
    tracks: VecDeque<Track>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// History keeping at most `max_size` tracks (0 keeps nothing)
    pub fn new(max_size: usize) -> Self {
        Self {
            tracks: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Prepend a track, evicting the oldest entries past capacity
    pub fn push(&mut self, track: Track) {
        if self.max_size == 0 {
            return;
        }
        self.tracks.push_front(track);
        self.tracks.truncate(self.max_size);
    }

    /// Most recent track without removing it
    pub fn peek(&self) -> Option<&Track> {
        self.tracks.front()
    }

    /// Pop most recent track
    pub fn pop_front(&mut self) -> Option<Track> {
        self.tracks.pop_front()
    }

    /// Iterate most recent first
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Owned copy, most recent first
    pub fn to_vec(&self) -> Vec<Track> {
        self.tracks.iter().cloned().collect()
    }

    /// Number of tracks in history
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Maximum history size
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}
