//! Advance controller
//!
//! Shared logic behind an explicit skip and the asynchronous "track
//! finished" notification: pop the next track and start it, or stop the
//! player when the queue is drained.
//!
//! Per-session state machine:
//!
//! ```text
//! NoSession --enqueue/connect--> Playing <--> Idle --stop/leave--> NoSession
//! ```
//!
//! `Idle` keeps the session entry (empty queue, nothing current) so the next
//! enqueue starts playback immediately instead of only appending.

use crate::queue::{Advance, SessionQueueStore};
use chorus_core::{FinishNotification, Player, PlayerRegistry, Result, SessionId, Track};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Moves session queues forward
#[derive(Clone)]
pub struct AdvanceController {
    store: Arc<SessionQueueStore>,
    players: Arc<dyn PlayerRegistry>,
}

impl AdvanceController {
    /// Create a controller over the shared store
    pub fn new(store: Arc<SessionQueueStore>, players: Arc<dyn PlayerRegistry>) -> Self {
        Self { store, players }
    }

    /// Explicit skip; the caller has already passed the gate
    pub async fn skip(&self, session: SessionId, player: &dyn Player) -> Result<Advance> {
        debug!(session = %session, "Skip requested");
        self.advance(session, player).await
    }

    /// Handle a "track finished" notification from the player
    ///
    /// `Replaced` and `Stopped` are ignored: the command that caused them has
    /// already updated the queue, and acting again would advance twice.
    /// Returns `None` when nothing was done.
    pub async fn on_track_finished(
        &self,
        notification: FinishNotification,
    ) -> Result<Option<Advance>> {
        let FinishNotification { session, reason } = notification;

        if !reason.may_advance() {
            debug!(session = %session, reason = ?reason, "Ignoring track end");
            return Ok(None);
        }

        let Some(player) = self.players.player(session).await else {
            debug!(session = %session, "Track ended but player is gone");
            return Ok(None);
        };

        self.advance(session, player.as_ref()).await.map(Some)
    }

    /// Enqueue `tracks` and start playback if the session was idle
    ///
    /// Returns the track that was started, if any. This is the old pending
    /// head when one was waiting, not necessarily the first of `tracks`.
    pub async fn start_if_idle(
        &self,
        session: SessionId,
        player: &dyn Player,
        tracks: Vec<Track>,
    ) -> Result<Option<Track>> {
        let count = tracks.len();
        let Some(track) = self.store.enqueue(session, tracks) else {
            debug!(session = %session, count, "Appended to queue");
            return Ok(None);
        };

        self.start_from(session, player, track).await.map(Some)
    }

    async fn advance(&self, session: SessionId, player: &dyn Player) -> Result<Advance> {
        match self.store.advance(session) {
            Advance::Start(track) => self
                .start_from(session, player, track)
                .await
                .map(Advance::Start),
            Advance::Stop => {
                info!(session = %session, "Queue drained, stopping player");
                player.stop().await?;
                Ok(Advance::Stop)
            }
        }
    }

    /// Start `track`, moving on through the queue while the player refuses
    ///
    /// Refused tracks are dropped. If nothing playable is left the session
    /// is idle and the last refusal is returned.
    async fn start_from(
        &self,
        session: SessionId,
        player: &dyn Player,
        mut track: Track,
    ) -> Result<Track> {
        loop {
            info!(session = %session, title = %track.title, "Starting track");

            match player.start(&track).await {
                Ok(()) => return Ok(track),
                Err(e) => {
                    warn!(
                        session = %session,
                        title = %track.title,
                        error = %e,
                        "Player refused track"
                    );
                    match self.store.advance(session) {
                        Advance::Start(next) => track = next,
                        Advance::Stop => return Err(e),
                    }
                }
            }
        }
    }
}
