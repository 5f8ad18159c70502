//! Chorus Core
//!
//! Platform-agnostic core types, collaborator traits, and error handling for Chorus.
//!
//! This crate provides the building blocks shared by the playback orchestrator
//! and the HTTP clients that talk to the audio node and the song catalogs.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `SessionId`, `FinishNotification`, etc.
//! - **Collaborator Traits**: `Player`, `PlayerRegistry`, `VoicePresence`,
//!   `TrackCatalog`, `PlaylistCatalog`
//! - **Error Handling**: Unified `ChorusError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use chorus_core::types::{SessionId, Track};
//! use std::time::Duration;
//!
//! let session = SessionId::new(809_493_208_504_860_692);
//! let track = Track::new("dQw4w9WgXcQ", "QAAA...", "Never Gonna Give You Up")
//!     .with_author("Rick Astley")
//!     .with_duration(Duration::from_secs(212));
//!
//! assert_eq!(session.get(), 809_493_208_504_860_692);
//! assert_eq!(track.author, "Rick Astley");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{ChorusError, Result};
pub use traits::{PlaylistCatalog, Player, PlayerRegistry, TrackCatalog, VoicePresence};

pub use types::{
    FinishNotification, LoadResult, ParticipantId, PlaybackStatus, PlaylistEntry, PlaylistPage,
    SessionId, Track, TrackEndReason, VoiceChannelId,
};
