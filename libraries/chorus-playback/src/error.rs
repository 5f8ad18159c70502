//! Error types for playback orchestration
//!
//! `Display` output of [`PlaybackError`] is what the user sees as the reply
//! to their command, so keep the messages short and actionable.

use chorus_core::ChorusError;
use thiserror::Error;

/// Why the playback gate refused a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    /// No player exists for the session
    #[error("The bot is not connected to a voice channel in this server!")]
    NotConnected,

    /// Invoker is not in voice, or is in a different channel than the player
    #[error("You must be in the same voice channel as the bot!")]
    NotColocated,
}

/// Queue store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Nothing left to pop (queue empty or session unknown)
    #[error("Queue is empty")]
    Empty,

    /// The session has no queue entry at all
    #[error("No queue exists for this session")]
    Missing,
}

/// Playback command errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Gate refused the command
    #[error(transparent)]
    Denied(#[from] Denial),

    /// Invoker is not in any voice channel (connect)
    #[error("You must be connected to a voice channel to use this command!")]
    NotInVoice,

    /// Nothing is currently playing
    #[error("Nothing is playing!")]
    NothingPlaying,

    /// Queue has no pending tracks
    #[error("Nothing is in the queue.")]
    QueueEmpty,

    /// Shuffle requested without a queue
    #[error("Nothing to shuffle.")]
    NothingToShuffle,

    /// Resolver found nothing for the query
    #[error("Nothing found for `{0}`.")]
    NothingFound(String),

    /// Catalog-A playlist below the minimum size
    #[error("Playlist too small, {min}+ songs required.")]
    PlaylistTooSmall {
        /// Entries the playlist actually had
        found: usize,
        /// Required minimum
        min: usize,
    },

    /// Track lookup or search returned no usable result
    #[error("Track search failed for `{0}`.")]
    SearchFailed(String),

    /// A catalog failed while resolving
    #[error("{provider} is unavailable right now: {message}")]
    Provider {
        /// Failing collaborator
        provider: String,
        /// Cause reported by the client
        message: String,
    },

    /// Player or voice-gateway call failed
    #[error("Player error: {0}")]
    Player(#[from] ChorusError),
}

impl From<QueueError> for PlaybackError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Empty => Self::QueueEmpty,
            QueueError::Missing => Self::NothingToShuffle,
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
