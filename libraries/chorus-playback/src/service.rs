//! Music command service
//!
//! One method per chat command. Each call validates session state through
//! the [`PlaybackGate`], then touches the queue store and the player. The
//! returned [`Reply`] (or [`PlaybackError`]) renders as the plain-text answer
//! to the invoking user.

use crate::advance::AdvanceController;
use crate::error::{Denial, PlaybackError, QueueError, Result};
use crate::events::FinishRouter;
use crate::gate::PlaybackGate;
use crate::queue::SessionQueueStore;
use crate::resolver::{Resolution, TrackResolver};
use chorus_core::{
    FinishNotification, ParticipantId, PlaybackStatus, PlayerRegistry, SessionId, Track,
    VoiceChannelId, VoicePresence,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Width of the now-playing progress bar
const PROGRESS_BAR_WIDTH: usize = 20;

/// What the queue looks like right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueView {
    /// Track on the player
    pub now_playing: Option<Track>,
    /// Pending tracks, next first
    pub upcoming: Vec<Track>,
}

/// Successful command outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Joined the invoker's voice channel
    Joined(VoiceChannelId),
    /// Left voice and dropped the queue
    Left,
    /// Single track started immediately
    Playing(Track),
    /// Single track appended behind the current one
    Queued(Track),
    /// Playlist tracks enqueued
    QueuedBatch(usize),
    /// Skip accepted
    Skipping,
    /// Playback paused
    Paused,
    /// Playback resumed, with the resumed track if known
    Resumed(Option<Track>),
    /// Playback stopped and queue cleared
    Stopped,
    /// Pending tracks shuffled
    Shuffled(usize),
    /// Queue listing
    Queue(QueueView),
    /// Now-playing card
    NowPlaying {
        /// Current track and playback position
        current: PlaybackStatus,
        /// Next pending track
        next: Option<Track>,
    },
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Joined(channel) => write!(f, "The bot has joined the channel `{channel}`"),
            Self::Left => write!(f, "The bot left the voice channel"),
            Self::Playing(track) => write!(f, "Playing {}.", track.title),
            Self::Queued(track) => write!(f, "Added {} to the queue", track.title),
            Self::QueuedBatch(count) => write!(f, "Queued {count} songs."),
            Self::Skipping => write!(f, "Skipping ..."),
            Self::Paused => write!(f, "Paused!"),
            Self::Resumed(Some(track)) => write!(f, "Now playing `{}`", track.title),
            Self::Resumed(None) => write!(f, "Resumed!"),
            Self::Stopped => write!(f, "Playback is stopped!"),
            Self::Shuffled(_) => write!(f, "Shuffled."),
            Self::Queue(view) => {
                if let Some(track) = &view.now_playing {
                    writeln!(f, "Now playing: {}", track.title)?;
                }
                for (index, track) in view.upcoming.iter().enumerate() {
                    writeln!(f, "{}: {}", index + 1, track.title)?;
                }
                Ok(())
            }
            Self::NowPlaying { current, next } => {
                let track = &current.track;
                writeln!(f, "Currently playing: {} by {}", track.title, track.author)?;
                writeln!(
                    f,
                    "{} [{}] {}",
                    clock(current.clamped_position()),
                    progress_bar(current.clamped_position(), track.duration, PROGRESS_BAR_WIDTH),
                    clock(track.duration)
                )?;
                match next {
                    Some(next) => write!(f, "Next up: {} by {}", next.title, next.author),
                    None => write!(f, "Nothing next in queue"),
                }
            }
        }
    }
}

/// `mm:ss`, or `h:mm:ss` past the hour
fn clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Dashes with a `|` marker at the playback position, `width` chars wide
fn progress_bar(position: Duration, length: Duration, width: usize) -> String {
    let slots = width.saturating_sub(1);
    let filled = if length.is_zero() {
        0
    } else {
        let ratio = position.as_secs_f64() / length.as_secs_f64();
        ((slots as f64 * ratio) as usize).min(slots)
    };

    format!("{}|{}", "-".repeat(filled), "-".repeat(slots - filled))
}

/// Entry point for all music commands
#[derive(Clone)]
pub struct MusicService {
    store: Arc<SessionQueueStore>,
    gate: PlaybackGate,
    advance: AdvanceController,
    resolver: TrackResolver,
    players: Arc<dyn PlayerRegistry>,
    presence: Arc<dyn VoicePresence>,
}

impl MusicService {
    /// Create the service with a fresh queue store
    pub fn new(
        players: Arc<dyn PlayerRegistry>,
        presence: Arc<dyn VoicePresence>,
        resolver: TrackResolver,
    ) -> Self {
        let store = Arc::new(SessionQueueStore::new());
        Self {
            gate: PlaybackGate::new(players.clone(), presence.clone()),
            advance: AdvanceController::new(store.clone(), players.clone()),
            store,
            resolver,
            players,
            presence,
        }
    }

    /// Shared queue store
    pub fn store(&self) -> &Arc<SessionQueueStore> {
        &self.store
    }

    /// Advance controller shared with the finish router
    pub fn advance_controller(&self) -> &AdvanceController {
        &self.advance
    }

    /// Start consuming the player's finish notifications
    pub fn spawn_finish_listener(
        &self,
        notifications: mpsc::Receiver<FinishNotification>,
    ) -> JoinHandle<()> {
        FinishRouter::new(self.advance.clone(), self.store.clone()).spawn(notifications)
    }

    /// `/connect`: join the invoker's voice channel
    pub async fn connect(&self, session: SessionId, participant: ParticipantId) -> Result<Reply> {
        let channel = self
            .presence
            .voice_channel(session, participant)
            .await
            .ok_or(PlaybackError::NotInVoice)?;

        self.players.connect(session, channel).await?;
        info!(session = %session, channel = %channel, "Joined voice channel");

        Ok(Reply::Joined(channel))
    }

    /// `/leave`: disconnect and drop the session's queue
    pub async fn leave(&self, session: SessionId) -> Result<Reply> {
        if self.gate.player(session).await.is_none() {
            return Err(Denial::NotConnected.into());
        }

        // The queue goes even if the node fails to drop its player
        let disconnected = self.players.disconnect(session).await;
        self.store.clear(session);
        if let Err(e) = &disconnected {
            warn!(session = %session, error = %e, "Disconnect failed, queue cleared");
        }
        disconnected?;
        info!(session = %session, "Left voice channel");

        Ok(Reply::Left)
    }

    /// `/play <query>`: resolve and enqueue, starting playback when idle
    pub async fn play(
        &self,
        session: SessionId,
        participant: ParticipantId,
        query: &str,
    ) -> Result<Reply> {
        self.gate.validate(session, participant).await?;

        let resolution = self.resolver.resolve(query).await;
        let single = matches!(resolution, Resolution::Single(_));
        let tracks = resolution.into_tracks()?;

        // Resolution may take a while; the earlier admission may be stale
        let player = self.gate.validate(session, participant).await?;

        let count = tracks.len();
        let requested = tracks.first().cloned();
        let started = self
            .advance
            .start_if_idle(session, player.as_ref(), tracks)
            .await?;

        // An older pending track may be the one that started
        match (single, requested) {
            (true, Some(track)) if started.as_ref() == Some(&track) => Ok(Reply::Playing(track)),
            (true, Some(track)) => Ok(Reply::Queued(track)),
            _ => Ok(Reply::QueuedBatch(count)),
        }
    }

    /// `/skip`: start the next track or stop when the queue is empty
    pub async fn skip(&self, session: SessionId, participant: ParticipantId) -> Result<Reply> {
        let player = self.gate.validate(session, participant).await?;

        if player.current_track().await?.is_none() && self.store.is_empty(session) {
            return Err(PlaybackError::NothingPlaying);
        }

        self.advance.skip(session, player.as_ref()).await?;
        Ok(Reply::Skipping)
    }

    /// `/pause`
    pub async fn pause(&self, session: SessionId, participant: ParticipantId) -> Result<Reply> {
        let player = self.gate.validate(session, participant).await?;
        player.pause().await?;
        debug!(session = %session, "Paused");
        Ok(Reply::Paused)
    }

    /// `/resume`
    pub async fn resume(&self, session: SessionId, participant: ParticipantId) -> Result<Reply> {
        let player = self.gate.validate(session, participant).await?;
        player.resume().await?;
        debug!(session = %session, "Resumed");
        Ok(Reply::Resumed(player.current_track().await?))
    }

    /// `/stop`: stop the player and discard the queue
    pub async fn stop(&self, session: SessionId, participant: ParticipantId) -> Result<Reply> {
        let player = self.gate.validate(session, participant).await?;
        player.stop().await?;
        self.store.clear(session);
        info!(session = %session, "Playback stopped, queue cleared");
        Ok(Reply::Stopped)
    }

    /// `/shuffle`: shuffle the pending tracks
    pub async fn shuffle(&self, session: SessionId, participant: ParticipantId) -> Result<Reply> {
        self.gate.validate(session, participant).await?;

        let count = self
            .store
            .replace_shuffled(session)
            .map_err(|_: QueueError| PlaybackError::NothingToShuffle)?;
        Ok(Reply::Shuffled(count))
    }

    /// `/queue`: list pending tracks
    pub async fn queue(&self, session: SessionId, participant: ParticipantId) -> Result<Reply> {
        let player = self.gate.validate(session, participant).await?;

        let upcoming = self.store.snapshot(session);
        if upcoming.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }

        Ok(Reply::Queue(QueueView {
            now_playing: player.current_track().await?,
            upcoming,
        }))
    }

    /// `/nowplaying`: current track, its position, and what comes next
    pub async fn now_playing(
        &self,
        session: SessionId,
        participant: ParticipantId,
    ) -> Result<Reply> {
        let player = self.gate.validate(session, participant).await?;

        let current = player
            .status()
            .await?
            .ok_or(PlaybackError::NothingPlaying)?;

        Ok(Reply::NowPlaying {
            current,
            next: self.store.peek_next(session),
        })
    }
}
