//! Playback gate
//!
//! Every playback-mutating command passes through here first. The gate reads
//! the player registry and the invoker's voice state at call time and keeps
//! nothing between calls.

use crate::error::Denial;
use chorus_core::{ParticipantId, Player, PlayerRegistry, SessionId, VoicePresence};
use std::sync::Arc;
use tracing::debug;

/// Admission check for playback commands
#[derive(Clone)]
pub struct PlaybackGate {
    players: Arc<dyn PlayerRegistry>,
    presence: Arc<dyn VoicePresence>,
}

impl PlaybackGate {
    /// Create a gate over the platform collaborators
    pub fn new(players: Arc<dyn PlayerRegistry>, presence: Arc<dyn VoicePresence>) -> Self {
        Self { players, presence }
    }

    /// Validate that `participant` may control the session's player
    ///
    /// Checks, first match wins:
    /// 1. no player for the session → [`Denial::NotConnected`]
    /// 2. participant not in voice, or in another channel → [`Denial::NotColocated`]
    ///
    /// On success the freshly looked-up player is returned; callers must not
    /// keep it past the command they are serving.
    pub async fn validate(
        &self,
        session: SessionId,
        participant: ParticipantId,
    ) -> Result<Arc<dyn Player>, Denial> {
        let Some(player) = self.players.player(session).await else {
            debug!(session = %session, "Denied: no player");
            return Err(Denial::NotConnected);
        };

        let invoker_channel = self.presence.voice_channel(session, participant).await;
        if invoker_channel != Some(player.channel()) {
            debug!(
                session = %session,
                participant = %participant,
                invoker_channel = ?invoker_channel,
                player_channel = %player.channel(),
                "Denied: participant not colocated"
            );
            return Err(Denial::NotColocated);
        }

        Ok(player)
    }

    /// Player for the session, without any membership check
    pub async fn player(&self, session: SessionId) -> Option<Arc<dyn Player>> {
        self.players.player(session).await
    }
}
