//! Desktop playback engine for Lyra
//!
//! This crate provides [`RodioEngine`], the native implementation of
//! `lyra_playback::PlaybackEngine`.
//!
//! # Features
//!
//! - Cross-platform audio output using rodio
//! - Media fetched over HTTP(S) (reqwest) or read from disk
//! - Duration probing with symphonia
//! - Handle-tagged commands, so late results for replaced tracks are dropped
//!
//! # Example
//!
//! ```no_run
//! use lyra_audio_desktop::{FetchSettings, RodioEngine};
//! use lyra_playback::{PlaybackController, PlayerConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = RodioEngine::new(FetchSettings::default())?;
//! let mut player = PlaybackController::new(engine, PlayerConfig::default());
//!
//! // Drive the controller from your event loop
//! player.pump_engine();
//! player.tick();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod engine;
mod error;
pub mod fetch;
pub mod probe;

pub use engine::RodioEngine;
pub use error::{AudioError, Result};
pub use fetch::{FetchSettings, Fetcher, MediaLocation};
pub use probe::probe_duration;
