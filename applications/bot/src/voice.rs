/// Voice state cache fed by the chat gateway
use async_trait::async_trait;
use chorus_core::{ParticipantId, SessionId, VoiceChannelId, VoicePresence};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Last known voice channel of every participant, per session
#[derive(Debug, Default)]
pub struct VoiceStateCache {
    states: RwLock<HashMap<(SessionId, ParticipantId), VoiceChannelId>>,
}

impl VoiceStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a voice state update; `None` means the participant left voice
    pub async fn update(
        &self,
        session: SessionId,
        participant: ParticipantId,
        channel: Option<VoiceChannelId>,
    ) {
        debug!(session = %session, participant = %participant, channel = ?channel, "Voice state update");

        let mut states = self.states.write().await;
        match channel {
            Some(channel) => {
                states.insert((session, participant), channel);
            }
            None => {
                states.remove(&(session, participant));
            }
        }
    }

    /// Forget everything about a session (bot removed from the server)
    pub async fn forget_session(&self, session: SessionId) {
        self.states.write().await.retain(|(s, _), _| *s != session);
    }
}

#[async_trait]
impl VoicePresence for VoiceStateCache {
    async fn voice_channel(
        &self,
        session: SessionId,
        participant: ParticipantId,
    ) -> Option<VoiceChannelId> {
        self.states.read().await.get(&(session, participant)).copied()
    }
}
