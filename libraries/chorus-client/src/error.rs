//! Error types for the HTTP collaborators.

use chorus_core::ChorusError;
use thiserror::Error;

/// Errors that can occur when talking to Lavalink or Spotify.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Credentials were rejected
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Invalid base URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse a response body
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Player operation needs a node session that was never established
    #[error("No Lavalink session; wait for the node's ready event")]
    NoSession,
}

impl ClientError {
    /// Wrap as a provider failure for the collaborator traits.
    pub fn into_provider(self, provider: &str) -> ChorusError {
        ChorusError::provider(provider, self.to_string())
    }

    /// Map a send failure, separating "can't connect" from other errors.
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::ServerUnreachable(e.to_string())
        } else {
            Self::Request(e)
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
