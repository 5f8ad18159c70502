/// Collaborator traits for Chorus
///
/// Everything the orchestrator needs from the outside world: the audio
/// node's players, the chat platform's voice state, and the two catalogs.
use crate::error::Result;
use crate::types::{
    LoadResult, ParticipantId, PlaybackStatus, PlaylistPage, SessionId, Track, VoiceChannelId,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Player handle for one voice session
///
/// Owned by the audio node integration. The orchestrator borrows it per
/// command through [`PlayerRegistry`] and never holds on to it.
#[async_trait]
pub trait Player: Send + Sync {
    /// Voice channel the player is connected to
    fn channel(&self) -> VoiceChannelId;

    /// Start playing `track`, replacing whatever is playing
    ///
    /// # Errors
    /// Returns an error if the node rejects the request
    async fn start(&self, track: &Track) -> Result<()>;

    /// Stop playback
    async fn stop(&self) -> Result<()>;

    /// Pause playback
    async fn pause(&self) -> Result<()>;

    /// Resume paused playback
    async fn resume(&self) -> Result<()>;

    /// Loaded track with its playback position, if any
    async fn status(&self) -> Result<Option<PlaybackStatus>>;

    /// Track currently loaded on the player, if any
    async fn current_track(&self) -> Result<Option<Track>> {
        Ok(self.status().await?.map(|status| status.track))
    }
}

/// Lookup of live players by session
#[async_trait]
pub trait PlayerRegistry: Send + Sync {
    /// Player for the session, if one is connected
    async fn player(&self, session: SessionId) -> Option<Arc<dyn Player>>;

    /// Join `channel` and return the new player
    ///
    /// # Errors
    /// Returns an error if no audio node is available
    async fn connect(&self, session: SessionId, channel: VoiceChannelId)
        -> Result<Arc<dyn Player>>;

    /// Leave the voice channel and destroy the player
    async fn disconnect(&self, session: SessionId) -> Result<()>;
}

/// Voice state snapshot from the chat platform
#[async_trait]
pub trait VoicePresence: Send + Sync {
    /// Voice channel the participant currently sits in, if any
    async fn voice_channel(
        &self,
        session: SessionId,
        participant: ParticipantId,
    ) -> Option<VoiceChannelId>;
}

/// Catalog A: direct lookups and free-text search
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Load an identifier or link (single track, playlist, ...)
    async fn load(&self, identifier: &str) -> Result<LoadResult>;

    /// Free-text search, best match first
    async fn search(&self, query: &str) -> Result<LoadResult>;
}

/// Catalog B: paginated playlist enumeration
#[async_trait]
pub trait PlaylistCatalog: Send + Sync {
    /// Fetch the page of `playlist_id` starting at `offset`
    ///
    /// An empty page means there is nothing past `offset`.
    async fn playlist_page(&self, playlist_id: &str, offset: usize) -> Result<PlaylistPage>;
}
