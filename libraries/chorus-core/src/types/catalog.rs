//! Catalog answers
//!
//! Catalog A (the audio node's track loader) answers every lookup with one
//! of a handful of shapes; catalog B only enumerates playlist pages.

use super::track::Track;
use serde::{Deserialize, Serialize};

/// Result of a catalog-A lookup or search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadResult {
    /// A single track was loaded directly
    Track(Track),
    /// A whole playlist was loaded, in catalog order
    Playlist {
        /// Playlist name
        name: String,
        /// Playlist entries
        tracks: Vec<Track>,
    },
    /// Search results, best match first
    Search(Vec<Track>),
    /// Nothing matched
    Empty,
    /// The provider answered with an explicit error result
    Error(String),
}

impl LoadResult {
    /// First track of whatever was loaded
    pub fn first(&self) -> Option<&Track> {
        match self {
            Self::Track(track) => Some(track),
            Self::Playlist { tracks, .. } | Self::Search(tracks) => tracks.first(),
            Self::Empty | Self::Error(_) => None,
        }
    }

    /// Consume into the loaded tracks, in provider order
    pub fn into_tracks(self) -> Vec<Track> {
        match self {
            Self::Track(track) => vec![track],
            Self::Playlist { tracks, .. } | Self::Search(tracks) => tracks,
            Self::Empty | Self::Error(_) => Vec::new(),
        }
    }
}

/// One entry of a catalog-B playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaylistEntry {
    /// A music track
    Track {
        /// First credited artist, if any
        artist: Option<String>,
        /// Track title
        title: String,
    },
    /// Podcast episodes, removed items and anything else unplayable
    Other,
}

impl PlaylistEntry {
    /// Search text for catalog A: "{artist} {title}"
    pub fn search_query(&self) -> Option<String> {
        match self {
            Self::Track { artist, title } => {
                let artist = artist.as_deref().unwrap_or_default();
                Some(format!("{artist} {title}").trim().to_string())
            }
            Self::Other => None,
        }
    }
}

/// One page of a catalog-B playlist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistPage {
    /// Entries on this page; an empty page marks the end of the playlist
    pub entries: Vec<PlaylistEntry>,
}

impl PlaylistPage {
    /// Whether this page terminates pagination
    pub fn is_last(&self) -> bool {
        self.entries.is_empty()
    }
}
