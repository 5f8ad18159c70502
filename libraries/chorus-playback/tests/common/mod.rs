//! Common test utilities and fakes for the collaborator traits
#![allow(dead_code)]

use async_trait::async_trait;
use chorus_core::{
    ChorusError, LoadResult, ParticipantId, PlaybackStatus, Player, PlayerRegistry,
    PlaylistCatalog, PlaylistEntry, PlaylistPage, Result, SessionId, Track, TrackCatalog,
    VoiceChannelId, VoicePresence,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SESSION: SessionId = SessionId::new(809_493_208_504_860_692);
pub const MEMBER: ParticipantId = ParticipantId::new(1001);
pub const OTHER_MEMBER: ParticipantId = ParticipantId::new(1002);
pub const CHANNEL: VoiceChannelId = VoiceChannelId::new(5001);
pub const OTHER_CHANNEL: VoiceChannelId = VoiceChannelId::new(5002);

pub fn track(id: &str) -> Track {
    Track::new(id, format!("enc-{id}"), format!("Title {id}")).with_author(format!("Author {id}"))
}

pub fn ids(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.identifier.clone()).collect()
}

/// Calls recorded by [`FakePlayer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Start(String),
    Stop,
    Pause,
    Resume,
}

/// In-memory player that records every call
pub struct FakePlayer {
    channel: VoiceChannelId,
    current: Mutex<Option<Track>>,
    position: Mutex<Duration>,
    calls: Mutex<Vec<PlayerCall>>,
    fail_start: Mutex<usize>,
}

impl FakePlayer {
    pub fn new(channel: VoiceChannelId) -> Self {
        Self {
            channel,
            current: Mutex::new(None),
            position: Mutex::new(Duration::ZERO),
            calls: Mutex::new(Vec::new()),
            fail_start: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn current(&self) -> Option<Track> {
        self.current.lock().unwrap().clone()
    }

    pub fn set_current(&self, track: Option<Track>) {
        *self.current.lock().unwrap() = track;
    }

    pub fn set_position(&self, position: Duration) {
        *self.position.lock().unwrap() = position;
    }

    pub fn fail_next_start(&self) {
        self.fail_next_starts(1);
    }

    /// Refuse the next `count` start requests
    pub fn fail_next_starts(&self, count: usize) {
        *self.fail_start.lock().unwrap() = count;
    }
}

#[async_trait]
impl Player for FakePlayer {
    fn channel(&self) -> VoiceChannelId {
        self.channel
    }

    async fn start(&self, track: &Track) -> Result<()> {
        {
            let mut failures = self.fail_start.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(ChorusError::player("track rejected"));
            }
        }
        self.calls
            .lock()
            .unwrap()
            .push(PlayerCall::Start(track.identifier.clone()));
        *self.current.lock().unwrap() = Some(track.clone());
        *self.position.lock().unwrap() = Duration::ZERO;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.calls.lock().unwrap().push(PlayerCall::Stop);
        *self.current.lock().unwrap() = None;
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.calls.lock().unwrap().push(PlayerCall::Pause);
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.calls.lock().unwrap().push(PlayerCall::Resume);
        Ok(())
    }

    async fn status(&self) -> Result<Option<PlaybackStatus>> {
        let position = *self.position.lock().unwrap();
        Ok(self
            .current()
            .map(|track| PlaybackStatus::new(track, position)))
    }
}

/// Registry handing out [`FakePlayer`]s
#[derive(Default)]
pub struct FakeRegistry {
    players: Mutex<HashMap<SessionId, Arc<FakePlayer>>>,
    unavailable: Mutex<bool>,
    fail_disconnect: Mutex<bool>,
}

impl FakeRegistry {
    pub fn with_player(session: SessionId, channel: VoiceChannelId) -> (Arc<Self>, Arc<FakePlayer>) {
        let registry = Arc::new(Self::default());
        let player = registry.insert(session, channel);
        (registry, player)
    }

    pub fn insert(&self, session: SessionId, channel: VoiceChannelId) -> Arc<FakePlayer> {
        let player = Arc::new(FakePlayer::new(channel));
        self.players.lock().unwrap().insert(session, player.clone());
        player
    }

    pub fn get(&self, session: SessionId) -> Option<Arc<FakePlayer>> {
        self.players.lock().unwrap().get(&session).cloned()
    }

    pub fn remove(&self, session: SessionId) {
        self.players.lock().unwrap().remove(&session);
    }

    pub fn set_unavailable(&self) {
        *self.unavailable.lock().unwrap() = true;
    }

    /// Drop the player but report the node call as failed
    pub fn fail_disconnect(&self) {
        *self.fail_disconnect.lock().unwrap() = true;
    }
}

#[async_trait]
impl PlayerRegistry for FakeRegistry {
    async fn player(&self, session: SessionId) -> Option<Arc<dyn Player>> {
        self.get(session).map(|p| p as Arc<dyn Player>)
    }

    async fn connect(
        &self,
        session: SessionId,
        channel: VoiceChannelId,
    ) -> Result<Arc<dyn Player>> {
        if *self.unavailable.lock().unwrap() {
            return Err(ChorusError::NodeUnavailable("no sessions".into()));
        }
        Ok(self.insert(session, channel))
    }

    async fn disconnect(&self, session: SessionId) -> Result<()> {
        self.remove(session);
        if *self.fail_disconnect.lock().unwrap() {
            return Err(ChorusError::player("node unreachable"));
        }
        Ok(())
    }
}

/// Voice state snapshot keyed by participant
#[derive(Default)]
pub struct FakePresence {
    channels: Mutex<HashMap<ParticipantId, VoiceChannelId>>,
}

impl FakePresence {
    pub fn with(participant: ParticipantId, channel: VoiceChannelId) -> Arc<Self> {
        let presence = Arc::new(Self::default());
        presence.join(participant, channel);
        presence
    }

    pub fn join(&self, participant: ParticipantId, channel: VoiceChannelId) {
        self.channels.lock().unwrap().insert(participant, channel);
    }

    pub fn leave(&self, participant: ParticipantId) {
        self.channels.lock().unwrap().remove(&participant);
    }
}

#[async_trait]
impl VoicePresence for FakePresence {
    async fn voice_channel(
        &self,
        _session: SessionId,
        participant: ParticipantId,
    ) -> Option<VoiceChannelId> {
        self.channels.lock().unwrap().get(&participant).copied()
    }
}

/// Catalog A with canned answers
#[derive(Default)]
pub struct FakeTrackCatalog {
    loads: Mutex<HashMap<String, LoadResult>>,
    searches: Mutex<HashMap<String, LoadResult>>,
    search_log: Mutex<Vec<String>>,
    load_log: Mutex<Vec<String>>,
    failing: Mutex<bool>,
}

impl FakeTrackCatalog {
    pub fn on_load(&self, identifier: &str, result: LoadResult) -> &Self {
        self.loads
            .lock()
            .unwrap()
            .insert(identifier.to_string(), result);
        self
    }

    pub fn on_search(&self, query: &str, result: LoadResult) -> &Self {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), result);
        self
    }

    pub fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }

    pub fn searched(&self) -> Vec<String> {
        self.search_log.lock().unwrap().clone()
    }

    pub fn loaded(&self) -> Vec<String> {
        self.load_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackCatalog for FakeTrackCatalog {
    async fn load(&self, identifier: &str) -> Result<LoadResult> {
        self.load_log.lock().unwrap().push(identifier.to_string());
        if *self.failing.lock().unwrap() {
            return Err(ChorusError::provider("lavalink", "connection refused"));
        }
        Ok(self
            .loads
            .lock()
            .unwrap()
            .get(identifier)
            .cloned()
            .unwrap_or(LoadResult::Empty))
    }

    async fn search(&self, query: &str) -> Result<LoadResult> {
        self.search_log.lock().unwrap().push(query.to_string());
        if *self.failing.lock().unwrap() {
            return Err(ChorusError::provider("lavalink", "connection refused"));
        }
        Ok(self
            .searches
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or(LoadResult::Empty))
    }
}

/// Catalog B serving one playlist in fixed-size pages
pub struct FakePlaylistCatalog {
    playlist_id: String,
    entries: Vec<PlaylistEntry>,
    page_size: usize,
    offsets: Mutex<Vec<usize>>,
    failing: Mutex<bool>,
}

impl FakePlaylistCatalog {
    pub fn new(playlist_id: &str, entries: Vec<PlaylistEntry>, page_size: usize) -> Self {
        Self {
            playlist_id: playlist_id.to_string(),
            entries,
            page_size,
            offsets: Mutex::new(Vec::new()),
            failing: Mutex::new(false),
        }
    }

    pub fn empty() -> Self {
        Self::new("none", Vec::new(), 100)
    }

    pub fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }

    pub fn requested_offsets(&self) -> Vec<usize> {
        self.offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaylistCatalog for FakePlaylistCatalog {
    async fn playlist_page(&self, playlist_id: &str, offset: usize) -> Result<PlaylistPage> {
        self.offsets.lock().unwrap().push(offset);
        if *self.failing.lock().unwrap() {
            return Err(ChorusError::provider("spotify", "401 Unauthorized"));
        }
        if playlist_id != self.playlist_id {
            return Ok(PlaylistPage::default());
        }
        let entries = self
            .entries
            .iter()
            .skip(offset)
            .take(self.page_size)
            .cloned()
            .collect();
        Ok(PlaylistPage { entries })
    }
}

pub fn entry(artist: &str, title: &str) -> PlaylistEntry {
    PlaylistEntry::Track {
        artist: Some(artist.to_string()),
        title: title.to_string(),
    }
}
