//! Media source resolution
//!
//! Picks the one URL the engine should load from a track's variants.

use crate::error::{PlaybackError, Result};
use lyra_core::{MediaVariant, Track};
use serde::{Deserialize, Serialize};

/// Variant selection policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePolicy {
    /// Last listed variant (catalog lists low to high quality)
    #[default]
    LastVariant,

    /// Highest parsed bitrate tag (`"320kbps"`), falling back to the last variant
    HighestBitrate,
}

impl SourcePolicy {
    /// Resolve a playable URL for `track`
    ///
    /// Variants with a blank URL are ignored.
    pub fn resolve<'a>(&self, track: &'a Track) -> Result<&'a str> {
        let usable = || track.sources.iter().filter(|v| v.has_url());

        let chosen = match self {
            SourcePolicy::LastVariant => usable().last(),
            SourcePolicy::HighestBitrate => usable()
                .filter_map(|v| bitrate_kbps(v).map(|kbps| (kbps, v)))
                // max_by_key keeps the last of equal keys, matching positional order
                .max_by_key(|(kbps, _)| *kbps)
                .map(|(_, v)| v)
                .or_else(|| usable().last()),
        };

        chosen
            .map(|v| v.url.as_str())
            .ok_or_else(|| PlaybackError::NoPlayableSource {
                track_id: track.id.clone(),
            })
    }
}

/// Numeric prefix of a quality tag (`"320kbps"` → 320)
fn bitrate_kbps(variant: &MediaVariant) -> Option<u32> {
    let tag = variant.quality.as_deref()?.trim();
    let end = tag.find(|c: char| !c.is_ascii_digit()).unwrap_or(tag.len());
    tag[..end].parse().ok()
}

/// Resolve with the default policy
pub fn resolve_url(track: &Track) -> Result<&str> {
    SourcePolicy::default().resolve(track)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_with(sources: Vec<MediaVariant>) -> Track {
        Track::new("t1", "Song").with_sources(sources)
    }

    #[test]
    fn picks_last_variant() {
        let track = track_with(vec![
            MediaVariant::new("12kbps", "https://cdn/12"),
            MediaVariant::new("96kbps", "https://cdn/96"),
            MediaVariant::new("320kbps", "https://cdn/320"),
        ]);
        assert_eq!(resolve_url(&track).unwrap(), "https://cdn/320");
    }

    #[test]
    fn last_variant_is_positional() {
        let track = track_with(vec![
            MediaVariant::new("320kbps", "https://cdn/320"),
            MediaVariant::new("96kbps", "https://cdn/96"),
        ]);
        assert_eq!(resolve_url(&track).unwrap(), "https://cdn/96");
    }

    #[test]
    fn empty_variants_fail() {
        let err = resolve_url(&track_with(vec![])).unwrap_err();
        assert_eq!(
            err,
            PlaybackError::NoPlayableSource {
                track_id: "t1".to_string()
            }
        );
    }

    #[test]
    fn blank_urls_are_skipped() {
        let track = track_with(vec![
            MediaVariant::new("96kbps", "https://cdn/96"),
            MediaVariant::new("320kbps", "  "),
        ]);
        assert_eq!(resolve_url(&track).unwrap(), "https://cdn/96");

        let track = track_with(vec![MediaVariant::untagged("")]);
        assert!(resolve_url(&track).is_err());
    }

    #[test]
    fn highest_bitrate_ignores_order() {
        let track = track_with(vec![
            MediaVariant::new("320kbps", "https://cdn/320"),
            MediaVariant::new("96kbps", "https://cdn/96"),
            MediaVariant::untagged("https://cdn/unknown"),
        ]);
        let url = SourcePolicy::HighestBitrate.resolve(&track).unwrap();
        assert_eq!(url, "https://cdn/320");
    }

    #[test]
    fn highest_bitrate_falls_back_to_last() {
        let track = track_with(vec![
            MediaVariant::new("low", "https://cdn/low"),
            MediaVariant::untagged("https://cdn/high"),
        ]);
        let url = SourcePolicy::HighestBitrate.resolve(&track).unwrap();
        assert_eq!(url, "https://cdn/high");
    }
}
