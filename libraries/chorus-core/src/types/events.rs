//! Player notifications
//!
//! The audio node reports every track termination with a reason. Only
//! natural ends and failures should move a session's queue forward; the
//! other reasons are side effects of a command that already did its own
//! bookkeeping.

use super::ids::SessionId;
use serde::{Deserialize, Serialize};

/// Why a track stopped playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackEndReason {
    /// Reached the end of the stream
    Finished,
    /// The node failed to load or play the track
    #[serde(alias = "loadFailed")]
    Failed,
    /// Another track was started on the same player
    Replaced,
    /// Playback was stopped explicitly
    Stopped,
}

impl TrackEndReason {
    /// Whether this termination should advance the session queue
    pub fn may_advance(self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

/// "Track finished" notification emitted by a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishNotification {
    /// Session whose player finished a track
    pub session: SessionId,
    /// Why the track ended
    pub reason: TrackEndReason,
}

impl FinishNotification {
    /// Create a notification
    pub fn new(session: SessionId, reason: TrackEndReason) -> Self {
        Self { session, reason }
    }
}
