//! Play queue
//!
//! Plain FIFO of upcoming tracks. Duplicates are allowed; the controller
//! decides when a track leaves the queue to become current.

use lyra_core::Track;

/// FIFO play queue
#[derive(Debug, Clone, Default)]
pub struct Queue {
    /// Upcoming tracks, next first
    tracks: Vec<Track>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    /// Append track to the end
    pub fn enqueue(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Append tracks preserving their order
    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.tracks.extend(tracks);
    }

    /// Put a track in front of everything else
    pub fn push_front(&mut self, track: Track) {
        self.tracks.insert(0, track);
    }

    /// Remove and return the next track
    pub fn dequeue_front(&mut self) -> Option<Track> {
        if self.tracks.is_empty() {
            None
        } else {
            Some(self.tracks.remove(0))
        }
    }

    /// Remove track at index
    ///
    /// Out-of-range indices are ignored.
    pub fn remove_at(&mut self, index: usize) -> Option<Track> {
        (index < self.tracks.len()).then(|| self.tracks.remove(index))
    }

    /// Remove all tracks
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Next track without removing it
    pub fn peek(&self) -> Option<&Track> {
        self.tracks.first()
    }

    /// Iterate in play order
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Owned copy in play order
    pub fn to_vec(&self) -> Vec<Track> {
        self.tracks.clone()
    }

    /// Number of queued tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
