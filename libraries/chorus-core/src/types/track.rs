/// Playable track descriptor
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A track resolved from a catalog, ready to hand to a player
///
/// Tracks are opaque to the orchestrator: it stores, orders and forwards
/// them but never looks inside beyond display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Provider-specific identifier (e.g. a YouTube video id)
    pub identifier: String,
    /// Encoded blob the audio node needs to start playback
    pub encoded: String,
    /// Track title
    pub title: String,
    /// Uploader / artist
    pub author: String,
    /// Track length
    pub duration: Duration,
    /// Source URI, if the provider exposes one
    pub uri: Option<String>,
    /// Artwork / thumbnail URL
    pub artwork_url: Option<String>,
}

impl Track {
    /// Create a track with the required fields; the rest default to empty
    pub fn new(
        identifier: impl Into<String>,
        encoded: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            encoded: encoded.into(),
            title: title.into(),
            author: String::new(),
            duration: Duration::ZERO,
            uri: None,
            artwork_url: None,
        }
    }

    /// Set the author
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the duration
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the source URI
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the artwork URL
    #[must_use]
    pub fn with_artwork_url(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }
}

/// Player-side view of the loaded track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackStatus {
    /// Track on the player
    pub track: Track,
    /// Playback position within the track
    pub position: Duration,
    /// Whether playback is paused
    pub paused: bool,
}

impl PlaybackStatus {
    /// Status for `track` at `position`, playing
    pub fn new(track: Track, position: Duration) -> Self {
        Self {
            track,
            position,
            paused: false,
        }
    }

    /// Position clamped to the track length
    ///
    /// Streams report a zero length and are returned unclamped.
    pub fn clamped_position(&self) -> Duration {
        if self.track.duration.is_zero() {
            self.position
        } else {
            self.position.min(self.track.duration)
        }
    }
}
