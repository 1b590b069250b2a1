//! Platform-agnostic playback engine trait
//!
//! Abstracts the native audio element for different platforms. An engine owns
//! at most one live handle; every load retires the previous one.

use crate::error::Result;
use std::fmt;

/// Identifier of one loaded media handle
///
/// Ids are never reused by an engine, so a notice carrying an old id can be
/// recognised as stale after the handle was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle event reported by an engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Media is decoded enough to know its duration
    Loaded {
        /// Duration in seconds (0 when unknown)
        duration_secs: f64,
    },

    /// Audio output started
    Started,

    /// Audio output paused
    Paused,

    /// Handle stopped
    Stopped,

    /// Media played to the end
    Ended,

    /// Load or playback failed
    Errored {
        /// Engine-provided reason
        message: String,
    },
}

/// Event tagged with the handle it concerns
#[derive(Debug, Clone, PartialEq)]
pub struct EngineNotice {
    /// Handle the event belongs to
    pub handle: HandleId,

    /// What happened
    pub event: EngineEvent,
}

impl EngineNotice {
    /// Create a notice
    pub fn new(handle: HandleId, event: EngineEvent) -> Self {
        Self { handle, event }
    }
}

/// Platform-agnostic playback engine
///
/// Implementors wrap one native audio handle. Loading is asynchronous: `load`
/// returns immediately and progress arrives through [`poll_events`].
/// Commands without a live handle are no-ops. Engines never touch controller
/// state.
///
/// [`poll_events`]: PlaybackEngine::poll_events
pub trait PlaybackEngine {
    /// Start loading `url` into a fresh handle at `volume`
    ///
    /// Any previous handle must already be released by the caller.
    ///
    /// # Returns
    /// * `Ok(handle)` - Load started; events will follow for `handle`
    /// * `Err(_)` - Engine could not even start the load
    fn load(&mut self, url: &str, volume: f32) -> Result<HandleId>;

    /// Start or resume output
    fn play(&mut self);

    /// Pause output
    fn pause(&mut self);

    /// Stop output (handle stays allocated)
    fn stop(&mut self);

    /// Seek to `seconds`, returning the resulting position
    fn seek(&mut self, seconds: f64) -> f64;

    /// Set output volume (0.0-1.0)
    fn set_volume(&mut self, volume: f32);

    /// Current position in seconds
    fn position(&self) -> f64;

    /// Whether audio is currently being output
    fn is_playing(&self) -> bool;

    /// Stop and free the live handle
    fn release(&mut self);

    /// Drain pending lifecycle notices
    fn poll_events(&mut self) -> Vec<EngineNotice>;
}

impl<E: PlaybackEngine + ?Sized> PlaybackEngine for Box<E> {
    fn load(&mut self, url: &str, volume: f32) -> Result<HandleId> {
        (**self).load(url, volume)
    }

    fn play(&mut self) {
        (**self).play();
    }

    fn pause(&mut self) {
        (**self).pause();
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn seek(&mut self, seconds: f64) -> f64 {
        (**self).seek(seconds)
    }

    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume);
    }

    fn position(&self) -> f64 {
        (**self).position()
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }

    fn release(&mut self) {
        (**self).release();
    }

    fn poll_events(&mut self) -> Vec<EngineNotice> {
        (**self).poll_events()
    }
}
