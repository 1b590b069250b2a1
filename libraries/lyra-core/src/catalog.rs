//! Catalog ingestion
//!
//! Converts catalog API song payloads into [`Track`]s. The catalog is loose
//! about shapes: artwork may be a URL or a list of sizes, the album may be a
//! name or an object, durations arrive as strings or numbers, and variant URLs
//! appear under `url` or `link`. Everything is normalised here so the rest of
//! the workspace only ever sees a `Track`.

use crate::error::{CoreError, Result};
use crate::text::decode_html_entities;
use crate::types::{Artwork, MediaVariant, Track};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawVariant {
    quality: Option<String>,
    #[serde(alias = "link")]
    url: Option<String>,
}

impl RawVariant {
    fn into_variant(self) -> Option<MediaVariant> {
        let url = self.url.filter(|u| !u.trim().is_empty())?;
        Some(MediaVariant {
            quality: self.quality,
            url,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawImage {
    Url(String),
    Sizes(Vec<RawVariant>),
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAlbum {
    Name(String),
    Object(NamedRef),
}

#[derive(Debug, Deserialize)]
struct RawArtists {
    // `null` and missing both mean no artists
    primary: Option<Vec<NamedRef>>,
}

/// Song as returned by the catalog API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogSong {
    id: Option<StringOrNumber>,
    name: Option<String>,
    title: Option<String>,
    primary_artists: Option<String>,
    singers: Option<String>,
    artists: Option<RawArtists>,
    album: Option<RawAlbum>,
    image: Option<RawImage>,
    duration: Option<StringOrNumber>,
    download_url: Option<Vec<RawVariant>>,
}

impl CatalogSong {
    fn into_track(self) -> Option<Track> {
        let id = self.id.map(StringOrNumber::into_string)?;
        if id.trim().is_empty() {
            return None;
        }

        let name = self
            .name
            .or(self.title)
            .map(|n| decode_html_entities(&n))
            .unwrap_or_default();

        let artists = self
            .primary_artists
            .filter(|a| !a.trim().is_empty())
            .or_else(|| self.singers.filter(|s| !s.trim().is_empty()))
            .or_else(|| {
                let names: Vec<String> = self
                    .artists?
                    .primary
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|a| a.name)
                    .collect();
                (!names.is_empty()).then(|| names.join(", "))
            })
            .map(|a| decode_html_entities(&a))
            .unwrap_or_default();

        let album = match self.album {
            Some(RawAlbum::Name(name)) => Some(name),
            Some(RawAlbum::Object(obj)) => obj.name,
            None => None,
        }
        .filter(|a| !a.trim().is_empty())
        .map(|a| decode_html_entities(&a));

        let artwork = match self.image {
            Some(RawImage::Url(url)) if !url.trim().is_empty() => Artwork::Single(url),
            Some(RawImage::Sizes(sizes)) => {
                let sizes: Vec<MediaVariant> =
                    sizes.into_iter().filter_map(RawVariant::into_variant).collect();
                if sizes.is_empty() {
                    Artwork::None
                } else {
                    Artwork::Variants(sizes)
                }
            }
            _ => Artwork::None,
        };

        let sources = self
            .download_url
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawVariant::into_variant)
            .collect();

        Some(Track {
            id,
            name,
            artists,
            album,
            artwork,
            duration_hint: self.duration.map(StringOrNumber::into_string),
            sources,
        })
    }
}

/// Locate the song list inside a catalog document
fn song_list(doc: &Value) -> Option<&Vec<Value>> {
    if let Value::Array(items) = doc {
        return Some(items);
    }

    let candidates = [
        doc.pointer("/data/results"),
        doc.pointer("/data/songs/results"),
        doc.pointer("/data/songs"),
        doc.pointer("/data"),
        doc.pointer("/songs/results"),
        doc.pointer("/songs"),
        doc.pointer("/results"),
    ];

    candidates.into_iter().flatten().find_map(Value::as_array)
}

/// Parse a catalog document into tracks
///
/// Accepts a bare song array, `{"data": {"results": [...]}}`,
/// `{"data": [...]}`, `{"songs": [...]}` and `{"songs": {"results": [...]}}`.
/// Entries without an id or with an unexpected shape are skipped.
pub fn parse_catalog(json: &str) -> Result<Vec<Track>> {
    let doc: Value = serde_json::from_str(json)?;
    let items = song_list(&doc)
        .ok_or_else(|| CoreError::InvalidCatalog("no song list found".to_string()))?;

    let mut tracks = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match CatalogSong::deserialize(item) {
            Ok(song) => match song.into_track() {
                Some(track) => tracks.push(track),
                None => debug!(index, "Skipping catalog entry without id"),
            },
            Err(e) => warn!(index, error = %e, "Skipping malformed catalog entry"),
        }
    }

    debug!(count = tracks.len(), "Parsed catalog");
    Ok(tracks)
}

/// Read and parse a catalog document from disk
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Track>> {
    let json = std::fs::read_to_string(path.as_ref())?;
    parse_catalog(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_response() {
        let json = r#"{
            "data": {
                "results": [{
                    "id": "abc",
                    "name": "Tum Hi Ho &amp; More",
                    "primaryArtists": "Arijit Singh",
                    "album": {"id": "al1", "name": "Aashiqui 2"},
                    "duration": "262",
                    "image": [
                        {"quality": "50x50", "link": "https://img/50.jpg"},
                        {"quality": "500x500", "link": "https://img/500.jpg"}
                    ],
                    "downloadUrl": [
                        {"quality": "96kbps", "link": "https://cdn/96.mp4"},
                        {"quality": "320kbps", "link": "https://cdn/320.mp4"}
                    ]
                }]
            }
        }"#;

        let tracks = parse_catalog(json).unwrap();
        assert_eq!(tracks.len(), 1);

        let track = &tracks[0];
        assert_eq!(track.id, "abc");
        assert_eq!(track.name, "Tum Hi Ho & More");
        assert_eq!(track.artists, "Arijit Singh");
        assert_eq!(track.album.as_deref(), Some("Aashiqui 2"));
        assert_eq!(track.duration_hint_secs(), Some(262.0));
        assert_eq!(track.artwork_url(), Some("https://img/500.jpg"));
        assert_eq!(track.sources.len(), 2);
        assert_eq!(track.sources[1].url, "https://cdn/320.mp4");
    }

    #[test]
    fn parses_bare_array_with_loose_shapes() {
        let json = r#"[
            {"id": 42, "title": "Numbered", "singers": "Someone", "album": "Plain", "duration": 180,
             "image": "https://img/one.jpg", "downloadUrl": [{"url": "https://cdn/a.mp3"}]},
            {"id": "b", "name": "Artists block", "artists": {"primary": [{"name": "X"}, {"name": "Y"}]}}
        ]"#;

        let tracks = parse_catalog(json).unwrap();
        assert_eq!(tracks.len(), 2);

        assert_eq!(tracks[0].id, "42");
        assert_eq!(tracks[0].name, "Numbered");
        assert_eq!(tracks[0].artists, "Someone");
        assert_eq!(tracks[0].album.as_deref(), Some("Plain"));
        assert_eq!(tracks[0].duration_hint.as_deref(), Some("180"));
        assert_eq!(tracks[0].artwork, Artwork::Single("https://img/one.jpg".to_string()));
        assert_eq!(tracks[0].sources[0].quality, None);

        assert_eq!(tracks[1].artists, "X, Y");
        assert!(tracks[1].sources.is_empty());
    }

    #[test]
    fn drops_blank_variant_urls() {
        let json = r#"{"songs": [{"id": "a", "name": "A", "downloadUrl": [
            {"quality": "96kbps", "url": ""},
            {"quality": "160kbps", "url": "https://cdn/160"}
        ]}]}"#;

        let tracks = parse_catalog(json).unwrap();
        assert_eq!(tracks[0].sources, vec![MediaVariant::new("160kbps", "https://cdn/160")]);
    }

    #[test]
    fn null_lists_are_treated_as_empty() {
        let json = r#"[
            {"id": "a", "name": "A", "downloadUrl": null, "image": null},
            {"id": "b", "name": "B", "artists": {"primary": null},
             "downloadUrl": [{"quality": "320kbps", "url": "https://cdn/b_320"}]}
        ]"#;

        let tracks = parse_catalog(json).unwrap();
        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);

        assert!(tracks[0].sources.is_empty());
        assert_eq!(tracks[0].artwork, Artwork::None);
        assert_eq!(tracks[1].artists, "");
        assert_eq!(tracks[1].sources[0].url, "https://cdn/b_320");
    }

    #[test]
    fn skips_entries_without_id_or_with_bad_shape() {
        let json = r#"{"data": [
            {"name": "no id"},
            {"id": "ok", "name": "Fine"},
            {"id": "bad", "downloadUrl": "not-a-list"},
            "not an object"
        ]}"#;

        let tracks = parse_catalog(json).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "ok");
    }

    #[test]
    fn rejects_documents_without_song_list() {
        let err = parse_catalog(r#"{"status": "SUCCESS"}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCatalog(_)));

        let err = parse_catalog("{not json").unwrap_err();
        assert!(matches!(err, CoreError::Json(_)));
    }

    #[test]
    fn load_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"[{"id": "f", "name": "From file"}]"#).unwrap();

        let tracks = load_catalog(&path).unwrap();
        assert_eq!(tracks[0].name, "From file");

        let err = load_catalog(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
