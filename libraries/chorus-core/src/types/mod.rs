//! Domain types for Chorus

mod catalog;
mod events;
mod ids;
mod track;

pub use catalog::{LoadResult, PlaylistEntry, PlaylistPage};
pub use events::{FinishNotification, TrackEndReason};
pub use ids::{ParticipantId, SessionId, VoiceChannelId};
pub use track::{PlaybackStatus, Track};
