/// Core error types for Chorus
use crate::types::SessionId;
use thiserror::Error;

/// Result type alias using `ChorusError`
pub type Result<T> = std::result::Result<T, ChorusError>;

/// Core error type for Chorus
///
/// Collaborator implementations (audio node, catalogs, voice gateway) report
/// their failures through this type so the orchestrator can tell a failing
/// provider apart from an empty answer.
#[derive(Error, Debug)]
pub enum ChorusError {
    /// A catalog or the audio node could not be reached or answered garbage
    #[error("{provider} request failed: {message}")]
    Provider {
        /// Which collaborator failed ("lavalink", "spotify", ...)
        provider: String,
        /// Human readable cause
        message: String,
    },

    /// A player command was rejected by the audio node
    #[error("Player error: {0}")]
    Player(String),

    /// No player exists for the session
    #[error("No player connected for session {0}")]
    NotConnected(SessionId),

    /// The audio node has no usable connection
    #[error("Audio node unavailable: {0}")]
    NodeUnavailable(String),
}

impl ChorusError {
    /// Create a provider error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a player error
    pub fn player(msg: impl Into<String>) -> Self {
        Self::Player(msg.into())
    }
}
