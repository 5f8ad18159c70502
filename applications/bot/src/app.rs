//! Application wiring
//!
//! Builds the HTTP collaborators from configuration and hands them to the
//! music service. The chat gateway drives an [`App`] from outside: it
//! forwards voice state updates, node websocket frames and slash commands.

use crate::config::BotConfig;
use crate::error::Result;
use crate::voice::VoiceStateCache;
use chorus_client::{LavalinkClient, LavalinkPlayers, SpotifyClient};
use chorus_core::FinishNotification;
use chorus_playback::{MusicService, TrackResolver};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Finish notifications buffered between the node and the router
const FINISH_CHANNEL_CAPACITY: usize = 256;

/// Build the track resolver over Lavalink and Spotify
pub fn build_resolver(config: &BotConfig) -> Result<(TrackResolver, LavalinkClient)> {
    let lavalink = LavalinkClient::new(&config.lavalink_config())?;
    let spotify = SpotifyClient::new(config.spotify_config())?;

    let resolver = TrackResolver::with_config(
        Arc::new(lavalink.clone()),
        Arc::new(spotify),
        config.resolver_config(),
    );
    Ok((resolver, lavalink))
}

/// Running bot: service, collaborators and the finish listener
pub struct App {
    service: MusicService,
    lavalink: LavalinkClient,
    players: Arc<LavalinkPlayers>,
    voice: Arc<VoiceStateCache>,
    finished: mpsc::Sender<FinishNotification>,
    listener: JoinHandle<()>,
}

impl App {
    /// Wire everything up; must run inside a tokio runtime
    pub fn new(config: &BotConfig) -> Result<Self> {
        let (resolver, lavalink) = build_resolver(config)?;
        let players = Arc::new(LavalinkPlayers::new(lavalink.clone()));
        let voice = Arc::new(VoiceStateCache::new());

        let service = MusicService::new(players.clone(), voice.clone(), resolver);
        let (finished, notifications) = mpsc::channel(FINISH_CHANNEL_CAPACITY);
        let listener = service.spawn_finish_listener(notifications);

        info!(node = %lavalink.base_url(), "Chorus initialized");

        Ok(Self {
            service,
            lavalink,
            players,
            voice,
            finished,
            listener,
        })
    }

    pub fn service(&self) -> &MusicService {
        &self.service
    }

    pub fn voice(&self) -> &Arc<VoiceStateCache> {
        &self.voice
    }

    pub fn players(&self) -> &Arc<LavalinkPlayers> {
        &self.players
    }

    /// Feed one Lavalink websocket frame
    ///
    /// Track-end events are queued for the finish router.
    pub async fn handle_node_message(&self, text: &str) -> Result<()> {
        if let Some(notification) = self.lavalink.handle_message(text).await? {
            if self.finished.send(notification).await.is_err() {
                warn!(session = %notification.session, "Finish listener is gone");
            }
        }
        Ok(())
    }

    /// Stop accepting notifications and wait for the router to drain
    pub async fn shutdown(self) {
        drop(self.finished);
        if let Err(e) = self.listener.await {
            warn!(error = %e, "Finish listener panicked");
        }
        info!("Chorus stopped");
    }
}
