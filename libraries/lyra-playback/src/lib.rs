//! Lyra - Playback Management
//!
//! Platform-agnostic playback control for Lyra.
//!
//! This crate provides:
//! - Media source resolution (pick one URL from a track's variants)
//! - FIFO play queue and bounded, most-recent-first history
//! - Volume control (linear 0.0-1.0, mute/unmute)
//! - The playback state machine (Idle, Loading, Playing, Paused)
//! - Position sampling and UI events
//!
//! # Architecture
//!
//! `lyra-playback` does not produce sound. Platform code implements
//! [`PlaybackEngine`] around one native audio handle; the
//! [`PlaybackController`] commands it and reacts to the lifecycle notices it
//! reports. Everything runs on the thread that owns the controller.
//!
//! # Example: Platform Integration
//!
//! ```rust
//! use lyra_core::{MediaVariant, Track};
//! use lyra_playback::{
//!     EngineEvent, EngineNotice, HandleId, PlaybackController, PlaybackEngine, PlaybackState,
//!     PlayerConfig, Result,
//! };
//!
//! // Implement PlaybackEngine for your platform
//! #[derive(Default)]
//! struct MyEngine {
//!     next_id: u64,
//!     pending: Vec<EngineNotice>,
//! }
//!
//! impl PlaybackEngine for MyEngine {
//!     fn load(&mut self, _url: &str, _volume: f32) -> Result<HandleId> {
//!         self.next_id += 1;
//!         let handle = HandleId(self.next_id);
//!         self.pending.push(EngineNotice::new(handle, EngineEvent::Started));
//!         Ok(handle)
//!     }
//!     fn play(&mut self) {}
//!     fn pause(&mut self) {}
//!     fn stop(&mut self) {}
//!     fn seek(&mut self, seconds: f64) -> f64 { seconds }
//!     fn set_volume(&mut self, _volume: f32) {}
//!     fn position(&self) -> f64 { 0.0 }
//!     fn is_playing(&self) -> bool { true }
//!     fn release(&mut self) {}
//!     fn poll_events(&mut self) -> Vec<EngineNotice> { std::mem::take(&mut self.pending) }
//! }
//!
//! let mut player = PlaybackController::new(MyEngine::default(), PlayerConfig::default());
//!
//! let track = Track::new("t1", "Song")
//!     .with_sources(vec![MediaVariant::new("320kbps", "https://cdn.example/t1.mp4")]);
//! player.enqueue_many(vec![track]);
//! assert_eq!(player.state(), PlaybackState::Loading);
//!
//! // Feed engine notices back on the owning thread
//! player.pump_engine();
//! assert_eq!(player.state(), PlaybackState::Playing);
//! ```

mod controller;
pub mod engine;
mod error;
mod events;
mod history;
mod queue;
pub mod source;
mod ticker;
pub mod types;
mod volume;

// Public exports
pub use controller::PlaybackController;
pub use engine::{EngineEvent, EngineNotice, HandleId, PlaybackEngine};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use history::History;
pub use queue::Queue;
pub use source::{resolve_url, SourcePolicy};
pub use ticker::PositionTicker;
pub use types::{
    AdvanceTrigger, ManualSkipAtEnd, PlaybackState, PlayerConfig, PlayerSnapshot, DEFAULT_VOLUME,
};
pub use volume::Volume;
