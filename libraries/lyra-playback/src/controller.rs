//! Playback controller - core orchestration
//!
//! Owns the player state and drives a [`PlaybackEngine`]. Every operation runs
//! to completion on the owning thread; engine notices are fed back through
//! [`PlaybackController::pump_engine`] (or [`PlaybackController::handle_engine_event`]).
//!
//! Invariants:
//! - at most one live engine handle, released before the next load
//! - `current_track` is set exactly when a handle is live
//! - each handle advances the queue at most once (end of track or error)
//! - notices from replaced handles are ignored

use crate::{
    engine::{EngineEvent, EngineNotice, HandleId, PlaybackEngine},
    error::PlaybackError,
    events::PlaybackEvent,
    history::History,
    queue::Queue,
    ticker::PositionTicker,
    types::{AdvanceTrigger, ManualSkipAtEnd, PlaybackState, PlayerConfig, PlayerSnapshot},
    volume::Volume,
};
use lyra_core::Track;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Playback controller
pub struct PlaybackController<E: PlaybackEngine> {
    engine: E,
    config: PlayerConfig,

    state: PlaybackState,
    current_track: Option<Track>,
    live_handle: Option<HandleId>,

    // One-shot guard: cleared when the live handle advances the queue
    advance_armed: bool,

    queue: Queue,
    history: History,
    volume: Volume,

    position_secs: f64,
    duration_secs: f64,
    last_failure: Option<String>,

    ticker: PositionTicker,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl<E: PlaybackEngine> PlaybackController<E> {
    /// Create a controller around `engine`
    pub fn new(engine: E, config: PlayerConfig) -> Self {
        let mut engine = engine;
        let volume = Volume::new(config.volume);
        engine.set_volume(volume.effective());

        Self {
            engine,
            state: PlaybackState::Idle,
            current_track: None,
            live_handle: None,
            advance_armed: false,
            queue: Queue::new(),
            history: History::new(config.history_size),
            volume,
            position_secs: 0.0,
            duration_secs: 0.0,
            last_failure: None,
            ticker: PositionTicker::new(config.position_poll_interval),
            pending_events: Vec::new(),
            config,
        }
    }

    // ===== Playback Control =====

    /// Play `track` now
    ///
    /// The current track (if any) goes to history. A track without a playable
    /// source is skipped in favour of the next queued one; if none can be
    /// started the controller settles idle.
    pub fn play_track(&mut self, track: Track) {
        let previous = self.retire_current();
        let previous_id = previous.as_ref().map(|t| t.id.clone());
        if let Some(previous) = previous {
            self.push_history(previous);
        }

        self.start_from(track, previous_id);
    }

    /// Pause playback
    ///
    /// Only acts while playing; pausing a paused player does nothing.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }

        self.engine.pause();
        self.set_state(PlaybackState::Paused);
    }

    /// Resume a paused track
    pub fn resume(&mut self) {
        if self.state != PlaybackState::Paused || self.current_track.is_none() {
            return;
        }

        self.engine.play();
        self.set_state(PlaybackState::Playing);
    }

    /// Pause when playing, resume when paused
    pub fn toggle_play_pause(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
            PlaybackState::Idle | PlaybackState::Loading => {}
        }
    }

    /// Skip to the next queued track (user command)
    pub fn skip_next(&mut self) {
        self.advance(AdvanceTrigger::User);
    }

    /// Go to previous track
    ///
    /// Past the restart threshold this restarts the current track. Otherwise
    /// the most recent history entry becomes current and the interrupted
    /// track is put back at the front of the queue.
    pub fn skip_previous(&mut self) {
        let threshold = self.config.restart_threshold.as_secs_f64();
        if self.current_track.is_some() && self.current_position() > threshold {
            self.seek(0.0);
            return;
        }

        let Some(previous) = self.history.pop_front() else {
            self.seek(0.0);
            return;
        };
        self.emit_history_changed();

        let interrupted = self.retire_current();
        let interrupted_id = interrupted.as_ref().map(|t| t.id.clone());
        if let Some(interrupted) = interrupted {
            self.queue.push_front(interrupted);
            self.emit_queue_changed();
        }

        self.start_from(previous, interrupted_id);
    }

    /// Stop playback and release the engine handle
    ///
    /// Queue and history are kept.
    pub fn shutdown(&mut self) {
        let previous_id = self.retire_current().map(|t| t.id);
        self.settle_idle(previous_id);
    }

    // ===== Seek =====

    /// Seek within the current track
    ///
    /// Clamped to the track duration once it is known. Ignored without a live
    /// handle or for non-finite input.
    pub fn seek(&mut self, seconds: f64) {
        if self.current_track.is_none() || self.live_handle.is_none() || !seconds.is_finite() {
            return;
        }

        let mut target = seconds.max(0.0);
        if self.duration_secs > 0.0 {
            target = target.min(self.duration_secs);
        }

        let reached = self.engine.seek(target);
        self.position_secs = if reached.is_finite() { reached.max(0.0) } else { target };
        self.emit_position();
    }

    // ===== Volume =====

    /// Set volume (clamped to 0.0-1.0; NaN/infinite ignored)
    pub fn set_volume(&mut self, level: f32) {
        if !self.volume.set_level(level) {
            debug!(level, "Ignoring non-finite volume");
            return;
        }
        self.apply_volume();
    }

    /// Toggle mute
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_volume();
    }

    fn apply_volume(&mut self) {
        if self.live_handle.is_some() {
            self.engine.set_volume(self.volume.effective());
        }
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            level: self.volume.level(),
            muted: self.volume.is_muted(),
        });
    }

    // ===== Queue Management =====

    /// Append a track to the queue
    pub fn enqueue(&mut self, track: Track) {
        self.queue.enqueue(track);
        self.emit_queue_changed();
    }

    /// Append tracks in order
    ///
    /// When nothing is current, the first track starts playing and the rest
    /// are queued behind it.
    pub fn enqueue_many(&mut self, tracks: Vec<Track>) {
        let mut tracks = tracks.into_iter();

        if self.current_track.is_some() {
            self.queue.extend(tracks);
            self.emit_queue_changed();
            return;
        }

        let Some(first) = tracks.next() else {
            return;
        };

        // Queue the remainder first so a dead first track falls through to it
        self.queue.extend(tracks);
        self.emit_queue_changed();
        self.play_track(first);
    }

    /// Remove track at queue index (out-of-range is a no-op)
    pub fn remove_from_queue(&mut self, index: usize) -> Option<Track> {
        let removed = self.queue.remove_at(index);
        if removed.is_some() {
            self.emit_queue_changed();
        }
        removed
    }

    /// Remove all queued tracks
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.emit_queue_changed();
    }

    // ===== Engine Integration =====

    /// Drain the engine's notices and react to each
    pub fn pump_engine(&mut self) {
        for notice in self.engine.poll_events() {
            self.handle_engine_event(notice);
        }
    }

    /// React to one engine notice
    pub fn handle_engine_event(&mut self, notice: EngineNotice) {
        if Some(notice.handle) != self.live_handle {
            debug!(handle = %notice.handle, event = ?notice.event, "Ignoring stale engine notice");
            return;
        }

        match notice.event {
            EngineEvent::Loaded { duration_secs } => {
                if duration_secs.is_finite() && duration_secs > 0.0 {
                    self.duration_secs = duration_secs;
                }
                debug!(handle = %notice.handle, duration_secs, "Track loaded");
                self.emit_position();
            }
            EngineEvent::Started => {
                if self.state == PlaybackState::Loading
                    || (self.state == PlaybackState::Paused && self.engine.is_playing())
                {
                    self.set_state(PlaybackState::Playing);
                }
                self.last_failure = None;
                self.ticker.arm(notice.handle, Instant::now());
            }
            EngineEvent::Paused => {
                if self.state == PlaybackState::Playing && !self.engine.is_playing() {
                    self.set_state(PlaybackState::Paused);
                }
            }
            EngineEvent::Stopped => {
                debug!(handle = %notice.handle, "Engine stopped");
            }
            EngineEvent::Ended => {
                if !self.advance_armed {
                    debug!(handle = %notice.handle, "Ignoring repeated end of track");
                    return;
                }
                self.advance_armed = false;
                self.advance(AdvanceTrigger::TrackEnded);
            }
            EngineEvent::Errored { message } => {
                if !self.advance_armed {
                    return;
                }
                self.advance_armed = false;
                self.fail_current(message);
            }
        }
    }

    /// Sample the position if the ticker is due
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Sample the position if the ticker is due at `now`
    pub fn tick_at(&mut self, now: Instant) {
        let Some(handle) = self.ticker.poll(now) else {
            return;
        };

        if Some(handle) == self.live_handle && self.engine.is_playing() {
            self.position_secs = self.engine.position();
            self.emit_position();
        }
    }

    // ===== State Queries =====

    /// Controller state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether audio is playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Current track
    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    /// Live engine handle
    pub fn live_handle(&self) -> Option<HandleId> {
        self.live_handle
    }

    /// Upcoming tracks
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Played tracks, most recent first
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Volume level (0.0-1.0)
    pub fn volume(&self) -> f32 {
        self.volume.level()
    }

    /// Mute state
    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// Last sampled position in seconds
    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    /// Duration reported by the engine
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Most recent recovered failure
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Active configuration
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Whether the position ticker is bound to a handle
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_armed()
    }

    /// Underlying engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Read-only copy of the player state
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state,
            current_track: self.current_track.clone(),
            is_playing: self.is_playing(),
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            position_secs: self.position_secs,
            duration_secs: self.duration_secs,
            queue: self.queue.to_vec(),
            history: self.history.to_vec(),
            last_failure: self.last_failure.clone(),
        }
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    /// Move to the next queued track
    fn advance(&mut self, trigger: AdvanceTrigger) {
        if let Some(next) = self.queue.dequeue_front() {
            self.emit_queue_changed();
            let previous = self.retire_current();
            let previous_id = previous.as_ref().map(|t| t.id.clone());
            if let Some(previous) = previous {
                self.push_history(previous);
            }
            self.start_from(next, previous_id);
            return;
        }

        match (trigger, self.config.manual_skip_at_end) {
            (AdvanceTrigger::TrackEnded, _) | (AdvanceTrigger::User, ManualSkipAtEnd::Stop) => {
                info!("Queue exhausted");
                self.shutdown();
            }
            (AdvanceTrigger::User, ManualSkipAtEnd::Restart) => self.seek(0.0),
            (AdvanceTrigger::User, ManualSkipAtEnd::Ignore) => {}
        }
    }

    /// Live handle failed: skip without recording history
    fn fail_current(&mut self, message: String) {
        let failed = self.retire_current();
        let failed_id = failed.as_ref().map(|t| t.id.clone());

        let error = PlaybackError::Load {
            track_id: failed_id.clone().unwrap_or_default(),
            message,
        };
        self.record_failure(&error);

        match self.queue.dequeue_front() {
            Some(next) => {
                self.emit_queue_changed();
                self.start_from(next, failed_id);
            }
            None => self.settle_idle(failed_id),
        }
    }

    /// Try `track`, then queued tracks, until one loads
    ///
    /// Assumes no handle is live.
    fn start_from(&mut self, track: Track, previous_id: Option<String>) {
        let mut candidate = Some(track);

        while let Some(track) = candidate.take() {
            match self.load(&track) {
                Ok(handle) => {
                    info!(track_id = %track.id, handle = %handle, "Starting track");

                    self.live_handle = Some(handle);
                    self.advance_armed = true;
                    self.position_secs = 0.0;
                    self.duration_secs = 0.0;

                    let track_id = track.id.clone();
                    self.current_track = Some(track);
                    self.engine.play();

                    self.set_state(PlaybackState::Loading);
                    self.pending_events.push(PlaybackEvent::TrackChanged {
                        track_id: Some(track_id),
                        previous_track_id: previous_id,
                    });
                    return;
                }
                Err(error) => {
                    self.record_failure(&error);
                    candidate = self.queue.dequeue_front();
                    if candidate.is_some() {
                        self.emit_queue_changed();
                    }
                }
            }
        }

        self.settle_idle(previous_id);
    }

    fn load(&mut self, track: &Track) -> Result<HandleId, PlaybackError> {
        let url = self.config.source_policy.resolve(track)?;
        debug!(track_id = %track.id, url, "Resolved source");

        self.engine
            .load(url, self.volume.effective())
            .map_err(|e| PlaybackError::Load {
                track_id: track.id.clone(),
                message: e.to_string(),
            })
    }

    /// Release the live handle and take the current track
    fn retire_current(&mut self) -> Option<Track> {
        if let Some(handle) = self.live_handle.take() {
            debug!(handle = %handle, "Releasing engine handle");
            self.engine.release();
        }
        self.ticker.cancel();
        self.advance_armed = false;
        self.current_track.take()
    }

    /// Nothing is current any more
    fn settle_idle(&mut self, previous_id: Option<String>) {
        self.position_secs = 0.0;
        self.duration_secs = 0.0;
        self.set_state(PlaybackState::Idle);

        if previous_id.is_some() {
            self.pending_events.push(PlaybackEvent::TrackChanged {
                track_id: None,
                previous_track_id: previous_id,
            });
        }
    }

    fn push_history(&mut self, track: Track) {
        self.history.push(track);
        self.emit_history_changed();
    }

    fn record_failure(&mut self, error: &PlaybackError) {
        warn!(error = %error, "Skipping track");
        let message = error.to_string();
        self.last_failure = Some(message.clone());
        self.pending_events.push(PlaybackEvent::Error { message });
    }

    fn current_position(&mut self) -> f64 {
        if self.live_handle.is_some() {
            self.position_secs = self.engine.position();
        }
        self.position_secs
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.pending_events.push(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_position(&mut self) {
        self.pending_events.push(PlaybackEvent::PositionUpdate {
            position_secs: self.position_secs,
            duration_secs: self.duration_secs,
        });
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    fn emit_history_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::HistoryChanged {
            length: self.history.len(),
        });
    }
}

impl<E: PlaybackEngine> Drop for PlaybackController<E> {
    fn drop(&mut self) {
        if self.live_handle.take().is_some() {
            self.engine.release();
        }
        self.ticker.cancel();
    }
}
