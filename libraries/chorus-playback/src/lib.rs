//! Chorus - Playback Orchestration
//!
//! Per-session playback queues for the Chorus music assistant.
//!
//! This crate provides:
//! - Session queue store (FIFO per session, current-track slot, shuffle)
//! - Playback gate (player exists, invoker in the same voice channel)
//! - Advance controller (skip / track finished → next track or stop)
//! - Track resolver (catalog-B playlists, catalog-A playlists, search)
//! - Finish-notification routing (one worker per session)
//! - Command service (`/play`, `/skip`, `/queue`, ...)
//!
//! # Architecture
//!
//! `chorus-playback` knows nothing about HTTP or the chat gateway:
//! - Players, voice state and catalogs are reached through `chorus-core` traits
//! - Real implementations live in `chorus-client`
//!
//! # Example: Queue Store
//!
//! ```rust
//! use chorus_playback::{Advance, SessionQueueStore};
//! use chorus_core::{SessionId, Track};
//!
//! let store = SessionQueueStore::new();
//! let session = SessionId::new(1);
//!
//! // First enqueue on an idle session hands back the track to start
//! let start = store.enqueue(session, vec![
//!     Track::new("a", "enc-a", "Song A"),
//!     Track::new("b", "enc-b", "Song B"),
//! ]);
//! assert_eq!(start.map(|t| t.identifier), Some("a".to_string()));
//!
//! // Skip: B moves into the current slot
//! assert!(matches!(store.advance(session), Advance::Start(_)));
//! assert!(store.is_empty(session));
//!
//! // Drained: stop the player, session stays idle
//! assert_eq!(store.advance(session), Advance::Stop);
//! assert!(store.exists(session));
//! ```
//!
//! # Example: Query Classification
//!
//! ```rust
//! use chorus_playback::query::{extract_video_id, QueryKind};
//!
//! let kind = QueryKind::classify("https://www.youtube.com/playlist?list=PL123");
//! assert!(matches!(kind, QueryKind::CatalogPlaylist(_)));
//!
//! assert_eq!(
//!     extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
//!     Some("dQw4w9WgXcQ")
//! );
//! ```

mod advance;
mod error;
mod events;
mod gate;
mod queue;
mod resolver;
mod service;
mod shuffle;

pub mod query;

// Public exports
pub use advance::AdvanceController;
pub use error::{Denial, PlaybackError, QueueError, Result};
pub use events::FinishRouter;
pub use gate::PlaybackGate;
pub use queue::{Advance, SessionQueueStore};
pub use resolver::{Resolution, ResolverConfig, TrackResolver};
pub use service::{MusicService, QueueView, Reply};
pub use shuffle::{shuffle_tracks, shuffle_with};
