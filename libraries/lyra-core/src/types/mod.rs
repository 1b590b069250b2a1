mod track;

pub use track::{Artwork, MediaVariant, Track};
