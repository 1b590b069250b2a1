//! Catalog listing for `lyra inspect`

use lyra_core::text::format_time;
use lyra_core::Track;
use lyra_playback::SourcePolicy;
use std::io::{self, Write};

/// Print one line per track with the URL `policy` would play
///
/// Returns how many tracks have a playable source.
pub fn write_catalog<W: Write>(out: &mut W, tracks: &[Track], policy: SourcePolicy) -> io::Result<usize> {
    let mut playable = 0;

    for (i, track) in tracks.iter().enumerate() {
        let duration = track
            .duration_hint_secs()
            .map_or_else(|| "--:--".to_string(), format_time);

        writeln!(out, "{:>3}. {} [{duration}]", i + 1, track.now_playing_title())?;
        if let Some(album) = &track.album {
            writeln!(out, "     album:   {album}")?;
        }
        match policy.resolve(track) {
            Ok(url) => {
                playable += 1;
                writeln!(out, "     source:  {url}")?;
            }
            Err(e) => writeln!(out, "     source:  none ({e})")?,
        }
        if let Some(artwork) = track.artwork_url() {
            writeln!(out, "     artwork: {artwork}")?;
        }
    }

    writeln!(out, "{playable} of {} tracks playable", tracks.len())?;
    Ok(playable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_core::MediaVariant;

    #[test]
    fn test_lists_sources_and_counts_playable() {
        let tracks = vec![
            Track::new("a", "Alpha")
                .with_artists("Band")
                .with_duration_hint("185")
                .with_sources(vec![
                    MediaVariant::new("96kbps", "https://cdn.test/a_96.mp4"),
                    MediaVariant::new("320kbps", "https://cdn.test/a_320.mp4"),
                ]),
            Track::new("b", "Beta"),
        ];

        let mut out = Vec::new();
        let playable = write_catalog(&mut out, &tracks, SourcePolicy::default()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(playable, 1);
        assert!(text.contains("  1. Alpha - Band [03:05]"));
        assert!(text.contains("source:  https://cdn.test/a_320.mp4"));
        assert!(text.contains("  2. Beta [--:--]"));
        assert!(text.contains("source:  none"));
        assert!(text.ends_with("1 of 2 tracks playable\n"));
    }
}
