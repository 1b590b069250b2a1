//! Lyra Core
//!
//! Platform-agnostic domain types and helpers shared by every Lyra crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `MediaVariant`, `Artwork`
//! - **Catalog ingestion**: parsing catalog API responses into tracks
//! - **Display helpers**: entity decoding, `mm:ss` formatting
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use lyra_core::types::{Artwork, MediaVariant, Track};
//!
//! let track = Track::new("t1", "Song")
//!     .with_artists("Artist")
//!     .with_sources(vec![
//!         MediaVariant::new("96kbps", "https://cdn.example/t1_96.mp4"),
//!         MediaVariant::new("320kbps", "https://cdn.example/t1_320.mp4"),
//!     ]);
//!
//! assert_eq!(track.now_playing_title(), "Song - Artist");
//! assert_eq!(track.artwork, Artwork::None);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod text;
pub mod types;

pub use catalog::{load_catalog, parse_catalog};
pub use error::{CoreError, Result};
pub use types::{Artwork, MediaVariant, Track};
