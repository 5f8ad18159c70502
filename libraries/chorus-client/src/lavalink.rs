//! Lavalink v4 REST client.
//!
//! The node is catalog A (track loading and search) and the audio player.
//! Voice credentials arrive through the chat gateway, which is not handled
//! here: the gateway layer forwards them with [`LavalinkPlayer::update_voice`]
//! and feeds websocket frames to [`LavalinkClient::handle_message`].

use crate::error::{ClientError, Result};
use crate::types::{
    LavalinkConfig, LoadTracksResponse, NodeEvent, NodeMessage, PlayerState, UpdatePlayer,
    UpdatePlayerTrack, VoiceState,
};
use async_trait::async_trait;
use chorus_core::{
    ChorusError, FinishNotification, LoadResult, PlaybackStatus, Player, PlayerRegistry,
    SessionId, Track, TrackCatalog, VoiceChannelId,
};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const PROVIDER: &str = "lavalink";

/// Prefix that turns a load into a YouTube search
const SEARCH_PREFIX: &str = "ytsearch:";

/// Client for one Lavalink node.
///
/// Cheap to clone; clones share the HTTP pool and the node session id.
#[derive(Clone)]
pub struct LavalinkClient {
    http: Client,
    base_url: String,
    password: String,
    session_id: Arc<RwLock<Option<String>>>,
}

impl LavalinkClient {
    /// Create a new client for the node described by `config`.
    pub fn new(config: &LavalinkConfig) -> Result<Self> {
        if config.host.is_empty() {
            return Err(ClientError::InvalidUrl("host cannot be empty".into()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Chorus/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            password: config.password.clone(),
            session_id: Arc::new(RwLock::new(None)),
        })
    }

    /// REST base URL of the node.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Node session id, once the websocket reported ready.
    pub async fn session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }

    /// Set the node session id (from the websocket `ready` op).
    pub async fn set_session_id(&self, session_id: impl Into<String>) {
        let session_id = session_id.into();
        info!(session_id = %session_id, "Lavalink session ready");
        *self.session_id.write().await = Some(session_id);
    }

    /// Handle one websocket frame from the node.
    ///
    /// `ready` records the session id. A `TrackEndEvent` becomes a
    /// [`FinishNotification`] for the finish router. Everything else is
    /// ignored.
    pub async fn handle_message(&self, text: &str) -> Result<Option<FinishNotification>> {
        let message: NodeMessage = serde_json::from_str(text)
            .map_err(|e| ClientError::ParseError(format!("Invalid node message: {}", e)))?;

        match message {
            NodeMessage::Ready { session_id, resumed } => {
                debug!(resumed, "Node ready");
                self.set_session_id(session_id).await;
                Ok(None)
            }
            NodeMessage::Event(NodeEvent::TrackEndEvent { guild_id, reason }) => {
                let session: SessionId = guild_id.parse().map_err(|_| {
                    ClientError::ParseError(format!("Invalid guild id: {}", guild_id))
                })?;
                debug!(session = %session, reason = ?reason, "Track ended");
                Ok(Some(FinishNotification::new(session, reason.into())))
            }
            NodeMessage::Event(NodeEvent::Other) | NodeMessage::Other => Ok(None),
        }
    }

    /// `GET /v4/loadtracks?identifier=...`
    pub async fn load_tracks(&self, identifier: &str) -> Result<LoadTracksResponse> {
        let url = format!("{}/v4/loadtracks", self.base_url);
        debug!(url = %url, identifier = %identifier, "Loading tracks");

        let response = self
            .send(self.http.get(&url).query(&[("identifier", identifier)]))
            .await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse load result: {}", e)))
    }

    /// `PATCH /v4/sessions/{session}/players/{guild}`
    pub async fn update_player(&self, guild: SessionId, update: &UpdatePlayer) -> Result<()> {
        let url = self.player_url(guild).await?;
        debug!(url = %url, "Updating player");

        self.send(
            self.http
                .patch(&url)
                .query(&[("noReplace", "false")])
                .json(update),
        )
        .await?;
        Ok(())
    }

    /// `GET /v4/sessions/{session}/players/{guild}`; `None` when the node has no such player.
    pub async fn get_player(&self, guild: SessionId) -> Result<Option<PlayerState>> {
        let url = self.player_url(guild).await?;
        debug!(url = %url, "Fetching player");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, &self.password)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let state = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse player: {}", e)))?;
        Ok(Some(state))
    }

    /// `DELETE /v4/sessions/{session}/players/{guild}`
    pub async fn destroy_player(&self, guild: SessionId) -> Result<()> {
        let url = self.player_url(guild).await?;
        debug!(url = %url, "Destroying player");

        self.send(self.http.delete(&url)).await?;
        Ok(())
    }

    async fn player_url(&self, guild: SessionId) -> Result<String> {
        let session = self.session_id().await.ok_or(ClientError::NoSession)?;
        Ok(format!(
            "{}/v4/sessions/{}/players/{}",
            self.base_url, session, guild
        ))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .header(AUTHORIZATION, &self.password)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        Ok(response)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        warn!(status = %status, "Lavalink rejected the password");
        Err(ClientError::AuthFailed("Lavalink password rejected".to_string()))
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(ClientError::ServerError {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl TrackCatalog for LavalinkClient {
    async fn load(&self, identifier: &str) -> chorus_core::Result<LoadResult> {
        self.load_tracks(identifier)
            .await
            .map(LoadResult::from)
            .map_err(|e| e.into_provider(PROVIDER))
    }

    async fn search(&self, query: &str) -> chorus_core::Result<LoadResult> {
        self.load(&format!("{SEARCH_PREFIX}{query}")).await
    }
}

/// Player for one session (guild), driven over the REST player API.
pub struct LavalinkPlayer {
    client: LavalinkClient,
    guild: SessionId,
    channel: VoiceChannelId,
}

impl LavalinkPlayer {
    /// Create a handle; the node creates the player on the first update.
    pub fn new(client: LavalinkClient, guild: SessionId, channel: VoiceChannelId) -> Self {
        Self {
            client,
            guild,
            channel,
        }
    }

    /// Forward voice credentials received from the chat gateway.
    pub async fn update_voice(&self, voice: VoiceState) -> chorus_core::Result<()> {
        self.update(UpdatePlayer {
            voice: Some(voice),
            ..UpdatePlayer::default()
        })
        .await
    }

    async fn update(&self, update: UpdatePlayer) -> chorus_core::Result<()> {
        self.client
            .update_player(self.guild, &update)
            .await
            .map_err(|e| ChorusError::player(e.to_string()))
    }
}

#[async_trait]
impl Player for LavalinkPlayer {
    fn channel(&self) -> VoiceChannelId {
        self.channel
    }

    async fn start(&self, track: &Track) -> chorus_core::Result<()> {
        self.update(UpdatePlayer {
            track: Some(UpdatePlayerTrack {
                encoded: Some(track.encoded.clone()),
            }),
            paused: Some(false),
            ..UpdatePlayer::default()
        })
        .await
    }

    async fn stop(&self) -> chorus_core::Result<()> {
        self.update(UpdatePlayer {
            track: Some(UpdatePlayerTrack { encoded: None }),
            ..UpdatePlayer::default()
        })
        .await
    }

    async fn pause(&self) -> chorus_core::Result<()> {
        self.update(UpdatePlayer {
            paused: Some(true),
            ..UpdatePlayer::default()
        })
        .await
    }

    async fn resume(&self) -> chorus_core::Result<()> {
        self.update(UpdatePlayer {
            paused: Some(false),
            ..UpdatePlayer::default()
        })
        .await
    }

    async fn status(&self) -> chorus_core::Result<Option<PlaybackStatus>> {
        let state = self
            .client
            .get_player(self.guild)
            .await
            .map_err(|e| ChorusError::player(e.to_string()))?;

        Ok(state.and_then(PlayerState::into_status))
    }
}

/// Registry of the players this process controls on one node.
pub struct LavalinkPlayers {
    client: LavalinkClient,
    players: RwLock<HashMap<SessionId, Arc<LavalinkPlayer>>>,
}

impl LavalinkPlayers {
    /// Create an empty registry over `client`.
    pub fn new(client: LavalinkClient) -> Self {
        Self {
            client,
            players: RwLock::new(HashMap::new()),
        }
    }

    /// Concrete player for a session, for voice updates.
    pub async fn get(&self, session: SessionId) -> Option<Arc<LavalinkPlayer>> {
        self.players.read().await.get(&session).cloned()
    }
}

#[async_trait]
impl PlayerRegistry for LavalinkPlayers {
    async fn player(&self, session: SessionId) -> Option<Arc<dyn Player>> {
        self.get(session).await.map(|p| p as Arc<dyn Player>)
    }

    async fn connect(
        &self,
        session: SessionId,
        channel: VoiceChannelId,
    ) -> chorus_core::Result<Arc<dyn Player>> {
        if self.client.session_id().await.is_none() {
            return Err(ChorusError::NodeUnavailable(self.client.base_url().to_string()));
        }

        let player = Arc::new(LavalinkPlayer::new(self.client.clone(), session, channel));
        self.players.write().await.insert(session, player.clone());
        info!(session = %session, channel = %channel, "Player registered");
        Ok(player)
    }

    async fn disconnect(&self, session: SessionId) -> chorus_core::Result<()> {
        let removed = self.players.write().await.remove(&session);
        if removed.is_none() {
            return Err(ChorusError::NotConnected(session));
        }

        self.client
            .destroy_player(session)
            .await
            .map_err(|e| ChorusError::player(e.to_string()))?;
        info!(session = %session, "Player destroyed");
        Ok(())
    }
}
