//! Connection settings and wire types for Lavalink v4 and the Spotify Web API.

use chorus_core::{LoadResult, PlaybackStatus, PlaylistEntry, Track, TrackEndReason};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for a Lavalink node.
#[derive(Debug, Clone)]
pub struct LavalinkConfig {
    /// Node host name
    pub host: String,
    /// Node port
    pub port: u16,
    /// Value sent in the `Authorization` header
    pub password: String,
    /// Use https instead of http
    pub secure: bool,
}

impl LavalinkConfig {
    /// Create settings for a plain-http node.
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            secure: false,
        }
    }

    /// REST base URL, e.g. `http://localhost:2333`
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

/// Credentials and endpoints for the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    /// Application client id
    pub client_id: String,
    /// Application client secret
    pub client_secret: String,
    /// Web API base URL
    pub api_url: String,
    /// Accounts service base URL (token endpoint)
    pub accounts_url: String,
    /// Items requested per playlist page (Spotify caps this at 100)
    pub page_size: usize,
}

impl SpotifyConfig {
    /// Create settings pointing at the public Spotify endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_url: "https://api.spotify.com".to_string(),
            accounts_url: "https://accounts.spotify.com".to_string(),
            page_size: 100,
        }
    }

    /// Override both base URLs (tests, proxies).
    #[must_use]
    pub fn with_base_urls(mut self, api_url: impl Into<String>, accounts_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self.accounts_url = accounts_url.into();
        self
    }
}

// =============================================================================
// Lavalink Types
// =============================================================================

/// Track as returned by Lavalink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LavalinkTrack {
    pub encoded: String,
    pub info: LavalinkTrackInfo,
}

/// Track metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LavalinkTrackInfo {
    pub identifier: String,
    pub title: String,
    pub author: String,
    /// Length in milliseconds
    pub length: u64,
    #[serde(default)]
    pub is_stream: bool,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub artwork_url: Option<String>,
}

impl From<LavalinkTrack> for Track {
    fn from(track: LavalinkTrack) -> Self {
        let info = track.info;
        let mut out = Track::new(info.identifier, track.encoded, info.title)
            .with_author(info.author)
            .with_duration(Duration::from_millis(info.length));
        if let Some(uri) = info.uri {
            out = out.with_uri(uri);
        }
        if let Some(artwork) = info.artwork_url {
            out = out.with_artwork_url(artwork);
        }
        out
    }
}

/// Playlist header.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LavalinkPlaylistInfo {
    pub name: String,
}

/// Loaded playlist.
#[derive(Debug, Clone, Deserialize)]
pub struct LavalinkPlaylist {
    pub info: LavalinkPlaylistInfo,
    pub tracks: Vec<LavalinkTrack>,
}

/// Error payload of a failed load.
#[derive(Debug, Clone, Deserialize)]
pub struct LavalinkException {
    #[serde(default)]
    pub message: Option<String>,
    pub severity: String,
}

/// Response of `GET /v4/loadtracks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "loadType", content = "data", rename_all = "lowercase")]
pub enum LoadTracksResponse {
    Track(LavalinkTrack),
    Playlist(LavalinkPlaylist),
    Search(Vec<LavalinkTrack>),
    Empty {},
    Error(LavalinkException),
}

impl From<LoadTracksResponse> for LoadResult {
    fn from(response: LoadTracksResponse) -> Self {
        match response {
            LoadTracksResponse::Track(track) => Self::Track(track.into()),
            LoadTracksResponse::Playlist(playlist) => Self::Playlist {
                name: playlist.info.name,
                tracks: playlist.tracks.into_iter().map(Track::from).collect(),
            },
            LoadTracksResponse::Search(tracks) => {
                Self::Search(tracks.into_iter().map(Track::from).collect())
            }
            LoadTracksResponse::Empty {} => Self::Empty,
            LoadTracksResponse::Error(e) => {
                Self::Error(e.message.unwrap_or(e.severity))
            }
        }
    }
}

/// Track slot of a player update; `encoded: None` serializes as `null` and stops playback.
#[derive(Debug, Serialize)]
pub struct UpdatePlayerTrack {
    pub encoded: Option<String>,
}

/// Voice credentials forwarded from the chat gateway.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceState {
    pub token: String,
    pub endpoint: String,
    pub session_id: String,
}

/// Body of `PATCH /v4/sessions/{session}/players/{guild}`.
#[derive(Debug, Default, Serialize)]
pub struct UpdatePlayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<UpdatePlayerTrack>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceState>,
}

/// Response of `GET /v4/sessions/{session}/players/{guild}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub guild_id: String,
    #[serde(default)]
    pub track: Option<LavalinkTrack>,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub state: RealtimeState,
}

/// `state` object of a player.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RealtimeState {
    /// Position in milliseconds
    #[serde(default)]
    pub position: u64,
    #[serde(default)]
    pub connected: bool,
}

impl PlayerState {
    /// Loaded track and position; `None` when the player is empty.
    pub fn into_status(self) -> Option<PlaybackStatus> {
        let paused = self.paused;
        let position = Duration::from_millis(self.state.position);

        self.track.map(|track| PlaybackStatus {
            track: track.into(),
            position,
            paused,
        })
    }
}

/// Reason field of a `TrackEndEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LavalinkEndReason {
    Finished,
    LoadFailed,
    Stopped,
    Replaced,
    Cleanup,
}

impl From<LavalinkEndReason> for TrackEndReason {
    fn from(reason: LavalinkEndReason) -> Self {
        match reason {
            LavalinkEndReason::Finished => Self::Finished,
            LavalinkEndReason::LoadFailed => Self::Failed,
            LavalinkEndReason::Replaced => Self::Replaced,
            LavalinkEndReason::Stopped | LavalinkEndReason::Cleanup => Self::Stopped,
        }
    }
}

/// Websocket messages the node sends.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum NodeMessage {
    #[serde(rename_all = "camelCase")]
    Ready { session_id: String, resumed: bool },
    Event(NodeEvent),
    #[serde(other)]
    Other,
}

/// Player events carried by `op: "event"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum NodeEvent {
    #[serde(rename_all = "camelCase")]
    TrackEndEvent {
        guild_id: String,
        reason: LavalinkEndReason,
    },
    #[serde(other)]
    Other,
}

// =============================================================================
// Spotify Types
// =============================================================================

/// Response of the client-credentials token request.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Token validity in seconds
    pub expires_in: u64,
}

/// One page of `GET /v1/playlists/{id}/tracks`.
#[derive(Debug, Deserialize)]
pub struct PlaylistTracksPage {
    pub items: Vec<PlaylistItem>,
    #[serde(default)]
    pub total: Option<usize>,
}

/// Playlist item; `track` is null for removed or unavailable entries.
#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<SpotifyTrack>,
}

/// Track or episode object.
#[derive(Debug, Deserialize)]
pub struct SpotifyTrack {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
}

/// Artist reference.
#[derive(Debug, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

impl From<PlaylistItem> for PlaylistEntry {
    fn from(item: PlaylistItem) -> Self {
        match item.track {
            Some(track) if track.kind.as_deref().unwrap_or("track") == "track" => Self::Track {
                artist: track.artists.into_iter().next().map(|a| a.name),
                title: track.name,
            },
            _ => Self::Other,
        }
    }
}
