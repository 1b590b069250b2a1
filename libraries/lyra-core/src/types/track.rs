/// Track domain type
use serde::{Deserialize, Serialize};

/// One playable (or displayable) rendition of a resource
///
/// The catalog lists these low to high quality, e.g. `"96kbps"` then `"320kbps"`
/// for audio or `"150x150"` then `"500x500"` for artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaVariant {
    /// Free-form quality tag as reported by the catalog
    pub quality: Option<String>,

    /// Absolute URL (or local path) of the rendition
    pub url: String,
}

impl MediaVariant {
    /// Create a variant with a quality tag
    pub fn new(quality: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            quality: Some(quality.into()),
            url: url.into(),
        }
    }

    /// Create a variant without a quality tag
    pub fn untagged(url: impl Into<String>) -> Self {
        Self {
            quality: None,
            url: url.into(),
        }
    }

    /// Whether the URL is usable at all
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Artwork reference for a track
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Artwork {
    /// No artwork
    #[default]
    None,

    /// A single image URL
    Single(String),

    /// Several sizes of the same image
    Variants(Vec<MediaVariant>),
}

/// Audio track as delivered by the catalog
///
/// Tracks are immutable once ingested. The playback controller keeps its own
/// clones in the queue, history and current slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog identifier (unique per track)
    pub id: String,

    /// Display name
    pub name: String,

    /// Artist name(s), already joined for display
    pub artists: String,

    /// Album name
    pub album: Option<String>,

    /// Artwork reference
    #[serde(default)]
    pub artwork: Artwork,

    /// Duration in seconds as reported by the catalog (may be absent or non-numeric)
    pub duration_hint: Option<String>,

    /// Playable URL variants, ordered low to high quality (possibly empty)
    #[serde(default)]
    pub sources: Vec<MediaVariant>,
}

impl Track {
    /// Create a track with only an id and a name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists: String::new(),
            album: None,
            artwork: Artwork::None,
            duration_hint: None,
            sources: Vec::new(),
        }
    }

    /// Set the artist line
    #[must_use]
    pub fn with_artists(mut self, artists: impl Into<String>) -> Self {
        self.artists = artists.into();
        self
    }

    /// Set the album name
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Set the artwork reference
    #[must_use]
    pub fn with_artwork(mut self, artwork: Artwork) -> Self {
        self.artwork = artwork;
        self
    }

    /// Set the duration hint
    #[must_use]
    pub fn with_duration_hint(mut self, hint: impl Into<String>) -> Self {
        self.duration_hint = Some(hint.into());
        self
    }

    /// Set the playable variants
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<MediaVariant>) -> Self {
        self.sources = sources;
        self
    }

    /// Duration hint parsed as seconds
    ///
    /// Returns `None` for missing, negative or non-numeric hints.
    pub fn duration_hint_secs(&self) -> Option<f64> {
        let secs: f64 = self.duration_hint.as_deref()?.trim().parse().ok()?;
        (secs.is_finite() && secs >= 0.0).then_some(secs)
    }

    /// Best artwork URL for display
    ///
    /// Prefers `500x500`, then `150x150`, then the first listed size.
    pub fn artwork_url(&self) -> Option<&str> {
        match &self.artwork {
            Artwork::None => None,
            Artwork::Single(url) => (!url.trim().is_empty()).then_some(url.as_str()),
            Artwork::Variants(variants) => {
                let sized = |size: &str| {
                    variants
                        .iter()
                        .find(|v| v.quality.as_deref() == Some(size) && v.has_url())
                };

                sized("500x500")
                    .or_else(|| sized("150x150"))
                    .or_else(|| variants.first().filter(|v| v.has_url()))
                    .map(|v| v.url.as_str())
            }
        }
    }

    /// Title line shown while the track plays: `"<name> - <artists>"`
    pub fn now_playing_title(&self) -> String {
        if self.artists.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.artists)
        }
    }
}
