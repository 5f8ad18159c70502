//! Query classification
//!
//! A raw `/play` argument is classified once into a [`QueryKind`] and then
//! resolved per variant. The matching rules live here so they can be tested
//! without any catalog.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Marker of a catalog-B (Spotify) playlist link
const EXTERNAL_PLAYLIST_MARKER: &str = "spotify.com/playlist";

/// Marker of a catalog-A (YouTube) playlist link
const CATALOG_PLAYLIST_MARKER: &str = "/playlist?list=";

/// Shape of a user query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    /// Catalog-B playlist link, raw text
    ExternalPlaylist(String),
    /// Catalog-A playlist reference, raw text
    CatalogPlaylist(String),
    /// Free text or a single-item link
    Text(String),
}

impl QueryKind {
    /// Classify a raw query, first rule wins
    pub fn classify(query: &str) -> Self {
        let query = query.trim();

        if query.contains(EXTERNAL_PLAYLIST_MARKER) {
            Self::ExternalPlaylist(query.to_string())
        } else if query.contains(CATALOG_PLAYLIST_MARKER) {
            Self::CatalogPlaylist(query.to_string())
        } else {
            Self::Text(query.to_string())
        }
    }
}

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=|\?v=)([^#&?]*).*")
            .expect("video id pattern is a valid regex")
    })
}

/// Extract a video id from watch / share / embed links
///
/// `https://www.youtube.com/watch?v=dQw4w9WgXcQ` → `dQw4w9WgXcQ`
pub fn extract_video_id(text: &str) -> Option<String> {
    video_id_pattern()
        .captures(text)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Playlist id from a catalog-B link
///
/// Accepts links with or without a scheme and strips share parameters
/// (`?si=...`).
pub fn external_playlist_id(link: &str) -> Option<String> {
    let link = link.trim();
    let url = Url::parse(link)
        .or_else(|_| Url::parse(&format!("https://{link}")))
        .ok()?;

    if !url.host_str()?.ends_with("spotify.com") {
        return None;
    }

    let mut segments = url.path_segments()?;
    segments.find(|segment| *segment == "playlist")?;
    segments
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
