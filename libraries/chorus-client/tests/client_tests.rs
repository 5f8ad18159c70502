//! Tests for the Lavalink and Spotify clients.
//!
//! These tests use mock servers to verify request shapes and response
//! handling without a real node or Spotify account.

use chorus_client::{
    ClientError, LavalinkClient, LavalinkConfig, LavalinkPlayer, LavalinkPlayers, SpotifyClient,
    SpotifyConfig,
};
use chorus_core::{
    ChorusError, LoadResult, Player, PlayerRegistry, PlaylistCatalog, PlaylistEntry, SessionId,
    TrackCatalog, TrackEndReason, VoiceChannelId,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PASSWORD: &str = "youshallnotpass";
const GUILD: SessionId = SessionId::new(809_493_208_504_860_692);
const NODE_SESSION: &str = "la3kfsdf5eafe848";

fn lavalink_config(server: &MockServer) -> LavalinkConfig {
    let address = server.address();
    LavalinkConfig::new(address.ip().to_string(), address.port(), PASSWORD)
}

fn track_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "encoded": format!("QAAA-{id}"),
        "info": {
            "identifier": id,
            "isSeekable": true,
            "author": "Rick Astley",
            "length": 212000,
            "isStream": false,
            "position": 0,
            "title": title,
            "uri": format!("https://www.youtube.com/watch?v={id}"),
            "artworkUrl": null,
            "isrc": null,
            "sourceName": "youtube"
        },
        "pluginInfo": {}
    })
}

async fn ready_client(server: &MockServer) -> LavalinkClient {
    let client = LavalinkClient::new(&lavalink_config(server)).unwrap();
    client.set_session_id(NODE_SESSION).await;
    client
}

fn player_path() -> String {
    format!("/v4/sessions/{NODE_SESSION}/players/{GUILD}")
}

// =============================================================================
// Lavalink Config Tests
// =============================================================================

mod lavalink_config {
    use super::*;

    #[test]
    fn test_base_url_plain() {
        let config = LavalinkConfig::new("localhost", 2333, "pw");
        assert_eq!(config.base_url(), "http://localhost:2333");
    }

    #[test]
    fn test_base_url_secure() {
        let mut config = LavalinkConfig::new("lava.example.com", 443, "pw");
        config.secure = true;
        assert_eq!(config.base_url(), "https://lava.example.com:443");
    }

    #[test]
    fn test_empty_host_rejected() {
        let result = LavalinkClient::new(&LavalinkConfig::new("", 2333, "pw"));
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}

// =============================================================================
// Track Loading Tests
// =============================================================================

mod track_loading {
    use super::*;

    #[tokio::test]
    async fn test_search_uses_prefix_and_password() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/loadtracks"))
            .and(query_param("identifier", "ytsearch:never gonna give you up"))
            .and(header("Authorization", PASSWORD))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "loadType": "search",
                "data": [
                    track_json("dQw4w9WgXcQ", "Never Gonna Give You Up"),
                    track_json("yPYZpwSpKmA", "Together Forever")
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LavalinkClient::new(&lavalink_config(&server)).unwrap();
        let result = client.search("never gonna give you up").await.unwrap();

        let LoadResult::Search(tracks) = result else {
            panic!("expected search result");
        };
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].identifier, "dQw4w9WgXcQ");
        assert_eq!(tracks[0].encoded, "QAAA-dQw4w9WgXcQ");
        assert_eq!(tracks[0].author, "Rick Astley");
        assert_eq!(tracks[0].duration, Duration::from_secs(212));
        assert!(tracks[0].artwork_url.is_none());
    }

    #[tokio::test]
    async fn test_load_single_track() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/loadtracks"))
            .and(query_param("identifier", "dQw4w9WgXcQ"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "loadType": "track",
                "data": track_json("dQw4w9WgXcQ", "Never Gonna Give You Up")
            })))
            .mount(&server)
            .await;

        let client = LavalinkClient::new(&lavalink_config(&server)).unwrap();
        let result = client.load("dQw4w9WgXcQ").await.unwrap();

        assert_eq!(result.first().unwrap().title, "Never Gonna Give You Up");
    }

    #[tokio::test]
    async fn test_load_playlist_keeps_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/loadtracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "loadType": "playlist",
                "data": {
                    "info": { "name": "Mix", "selectedTrack": -1 },
                    "pluginInfo": {},
                    "tracks": [
                        track_json("a", "First"),
                        track_json("b", "Second"),
                        track_json("c", "Third")
                    ]
                }
            })))
            .mount(&server)
            .await;

        let client = LavalinkClient::new(&lavalink_config(&server)).unwrap();
        let result = client
            .load("https://www.youtube.com/playlist?list=PL1")
            .await
            .unwrap();

        let LoadResult::Playlist { name, tracks } = result else {
            panic!("expected playlist");
        };
        assert_eq!(name, "Mix");
        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_empty_and_error_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/loadtracks"))
            .and(query_param("identifier", "ytsearch:nothing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "loadType": "empty",
                "data": {}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v4/loadtracks"))
            .and(query_param("identifier", "private"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "loadType": "error",
                "data": {
                    "message": "This video is private",
                    "severity": "common",
                    "cause": "..."
                }
            })))
            .mount(&server)
            .await;

        let client = LavalinkClient::new(&lavalink_config(&server)).unwrap();

        assert_eq!(client.search("nothing").await.unwrap(), LoadResult::Empty);
        assert_eq!(
            client.load("private").await.unwrap(),
            LoadResult::Error("This video is private".to_string())
        );
    }

    #[tokio::test]
    async fn test_wrong_password_is_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/loadtracks"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = LavalinkClient::new(&lavalink_config(&server)).unwrap();
        let err = client.load("anything").await.unwrap_err();

        match err {
            ChorusError::Provider { provider, message } => {
                assert_eq!(provider, "lavalink");
                assert!(message.contains("Authentication failed"));
            }
            other => panic!("Expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_node() {
        let client = LavalinkClient::new(&LavalinkConfig::new("127.0.0.1", 1, PASSWORD)).unwrap();

        let err = client.load_tracks("anything").await.unwrap_err();
        assert!(matches!(err, ClientError::ServerUnreachable(_)));
    }
}

// =============================================================================
// Player Tests
// =============================================================================

mod player {
    use super::*;

    #[tokio::test]
    async fn test_start_sends_encoded_track() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(player_path()))
            .and(query_param("noReplace", "false"))
            .and(body_json(json!({
                "track": { "encoded": "QAAA-abc" },
                "paused": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let player = LavalinkPlayer::new(
            ready_client(&server).await,
            GUILD,
            VoiceChannelId::new(5001),
        );
        let track = chorus_core::Track::new("abc", "QAAA-abc", "Song");

        player.start(&track).await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_sends_null_track() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(player_path()))
            .and(body_json(json!({ "track": { "encoded": null } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let player = LavalinkPlayer::new(ready_client(&server).await, GUILD, VoiceChannelId::new(1));
        player.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_pause_and_resume() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(player_path()))
            .and(body_json(json!({ "paused": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path(player_path()))
            .and(body_json(json!({ "paused": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let player = LavalinkPlayer::new(ready_client(&server).await, GUILD, VoiceChannelId::new(1));
        player.pause().await.unwrap();
        player.resume().await.unwrap();
    }

    #[tokio::test]
    async fn test_current_track() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(player_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "guildId": GUILD.to_string(),
                "track": track_json("abc", "Playing Now"),
                "volume": 100,
                "paused": false,
                "state": { "time": 0, "position": 1000, "connected": true, "ping": 20 },
                "voice": { "token": "t", "endpoint": "e", "sessionId": "s" },
                "filters": {}
            })))
            .mount(&server)
            .await;

        let player = LavalinkPlayer::new(ready_client(&server).await, GUILD, VoiceChannelId::new(1));
        let current = player.current_track().await.unwrap();

        assert_eq!(current.unwrap().title, "Playing Now");
    }

    #[tokio::test]
    async fn test_status_reports_position() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(player_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "guildId": GUILD.to_string(),
                "track": track_json("abc", "Playing Now"),
                "volume": 100,
                "paused": true,
                "state": { "time": 0, "position": 83500, "connected": true, "ping": 20 },
                "voice": { "token": "t", "endpoint": "e", "sessionId": "s" },
                "filters": {}
            })))
            .mount(&server)
            .await;

        let player = LavalinkPlayer::new(ready_client(&server).await, GUILD, VoiceChannelId::new(1));
        let status = player.status().await.unwrap().unwrap();

        assert_eq!(status.track.identifier, "abc");
        assert_eq!(status.position, Duration::from_millis(83_500));
        assert!(status.paused);
    }

    #[tokio::test]
    async fn test_status_of_empty_player() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(player_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "guildId": GUILD.to_string(),
                "track": null,
                "paused": false,
                "state": { "time": 0, "position": 0, "connected": true, "ping": 20 }
            })))
            .mount(&server)
            .await;

        let player = LavalinkPlayer::new(ready_client(&server).await, GUILD, VoiceChannelId::new(1));
        assert!(player.status().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_current_track_when_player_missing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(player_path()))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let player = LavalinkPlayer::new(ready_client(&server).await, GUILD, VoiceChannelId::new(1));
        assert!(player.current_track().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_player_without_node_session_fails() {
        let server = MockServer::start().await;
        let client = LavalinkClient::new(&lavalink_config(&server)).unwrap();
        let player = LavalinkPlayer::new(client, GUILD, VoiceChannelId::new(1));

        let err = player.pause().await.unwrap_err();
        assert!(matches!(err, ChorusError::Player(_)));
    }
}

// =============================================================================
// Registry Tests
// =============================================================================

mod registry {
    use super::*;

    #[tokio::test]
    async fn test_connect_requires_node_session() {
        let server = MockServer::start().await;
        let players =
            LavalinkPlayers::new(LavalinkClient::new(&lavalink_config(&server)).unwrap());

        let err = players
            .connect(GUILD, VoiceChannelId::new(1))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ChorusError::NodeUnavailable(_)));
    }

    #[tokio::test]
    async fn test_connect_then_disconnect() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(player_path()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let players = LavalinkPlayers::new(ready_client(&server).await);
        let channel = VoiceChannelId::new(5001);

        players.connect(GUILD, channel).await.unwrap();
        assert_eq!(players.player(GUILD).await.unwrap().channel(), channel);

        players.disconnect(GUILD).await.unwrap();
        assert!(players.player(GUILD).await.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_unknown_session() {
        let server = MockServer::start().await;
        let players = LavalinkPlayers::new(ready_client(&server).await);

        let err = players.disconnect(GUILD).await.unwrap_err();
        assert!(matches!(err, ChorusError::NotConnected(id) if id == GUILD));
    }
}

// =============================================================================
// Node Message Tests
// =============================================================================

mod node_messages {
    use super::*;

    #[tokio::test]
    async fn test_ready_sets_session() {
        let server = MockServer::start().await;
        let client = LavalinkClient::new(&lavalink_config(&server)).unwrap();

        let outcome = client
            .handle_message(r#"{"op":"ready","resumed":false,"sessionId":"abc123"}"#)
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert_eq!(client.session_id().await.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_track_end_becomes_notification() {
        let server = MockServer::start().await;
        let client = LavalinkClient::new(&lavalink_config(&server)).unwrap();

        let frame = json!({
            "op": "event",
            "type": "TrackEndEvent",
            "guildId": GUILD.to_string(),
            "track": track_json("abc", "Song"),
            "reason": "loadFailed"
        })
        .to_string();

        let notification = client.handle_message(&frame).await.unwrap().unwrap();

        assert_eq!(notification.session, GUILD);
        assert_eq!(notification.reason, TrackEndReason::Failed);
    }

    #[tokio::test]
    async fn test_cleanup_maps_to_stopped() {
        let server = MockServer::start().await;
        let client = LavalinkClient::new(&lavalink_config(&server)).unwrap();

        let frame = json!({
            "op": "event",
            "type": "TrackEndEvent",
            "guildId": GUILD.to_string(),
            "reason": "cleanup"
        })
        .to_string();

        let notification = client.handle_message(&frame).await.unwrap().unwrap();
        assert!(!notification.reason.may_advance());
    }

    #[tokio::test]
    async fn test_other_messages_ignored() {
        let server = MockServer::start().await;
        let client = LavalinkClient::new(&lavalink_config(&server)).unwrap();

        let stats = r#"{"op":"stats","players":1,"playingPlayers":1,"uptime":1000}"#;
        let start = json!({
            "op": "event",
            "type": "TrackStartEvent",
            "guildId": GUILD.to_string()
        })
        .to_string();

        assert!(client.handle_message(stats).await.unwrap().is_none());
        assert!(client.handle_message(&start).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_garbage_is_parse_error() {
        let server = MockServer::start().await;
        let client = LavalinkClient::new(&lavalink_config(&server)).unwrap();

        let err = client.handle_message("not json").await.unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }
}

// =============================================================================
// Spotify Tests
// =============================================================================

mod spotify {
    use super::*;

    fn spotify_config(server: &MockServer) -> SpotifyConfig {
        SpotifyConfig::new("client-id", "client-secret").with_base_urls(server.uri(), server.uri())
    }

    async fn mount_token(server: &MockServer, expires_in: u64, times: u64) {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "token-1",
                "token_type": "Bearer",
                "expires_in": expires_in
            })))
            .expect(times)
            .mount(server)
            .await;
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let result = SpotifyClient::new(SpotifyConfig::new("", "secret"));
        assert!(matches!(result, Err(ClientError::AuthFailed(_))));
    }

    #[test]
    fn test_bad_url_rejected() {
        let config = SpotifyConfig::new("id", "secret").with_base_urls("api.local", "accounts.local");
        assert!(matches!(
            SpotifyClient::new(config),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_playlist_page_maps_entries() {
        let server = MockServer::start().await;
        mount_token(&server, 3600, 1).await;

        Mock::given(method("GET"))
            .and(path("/v1/playlists/37i9dQZF1DXcBWIGoYBM5M/tracks"))
            .and(query_param("offset", "0"))
            .and(query_param("limit", "100"))
            .and(header("Authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "track": { "name": "One More Time", "type": "track",
                                 "artists": [{ "name": "Daft Punk" }, { "name": "Romanthony" }] } },
                    { "track": null },
                    { "track": { "name": "Episode 12", "type": "episode", "artists": [] } },
                    { "track": { "name": "Untitled", "type": "track", "artists": [] } }
                ],
                "total": 4
            })))
            .mount(&server)
            .await;

        let client = SpotifyClient::new(spotify_config(&server)).unwrap();
        let page = client
            .playlist_page("37i9dQZF1DXcBWIGoYBM5M", 0)
            .await
            .unwrap();

        assert_eq!(
            page.entries,
            vec![
                PlaylistEntry::Track {
                    artist: Some("Daft Punk".into()),
                    title: "One More Time".into()
                },
                PlaylistEntry::Other,
                PlaylistEntry::Other,
                PlaylistEntry::Track {
                    artist: None,
                    title: "Untitled".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_playlist_tracks_carries_total() {
        let server = MockServer::start().await;
        mount_token(&server, 3600, 1).await;

        Mock::given(method("GET"))
            .and(path("/v1/playlists/p1/tracks"))
            .and(query_param("offset", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "track": { "name": "Late", "type": "track", "artists": [] } }],
                "total": 101
            })))
            .mount(&server)
            .await;

        let client = SpotifyClient::new(spotify_config(&server)).unwrap();
        let page = client.playlist_tracks("p1", 100).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, Some(101));
    }

    #[tokio::test]
    async fn test_token_is_cached() {
        let server = MockServer::start().await;
        mount_token(&server, 3600, 1).await;

        Mock::given(method("GET"))
            .and(path("/v1/playlists/p1/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(2)
            .mount(&server)
            .await;

        let client = SpotifyClient::new(spotify_config(&server)).unwrap();
        let first = client.playlist_page("p1", 0).await.unwrap();
        let second = client.playlist_page("p1", 100).await.unwrap();

        assert!(first.is_last());
        assert!(second.is_last());
    }

    #[tokio::test]
    async fn test_short_lived_token_is_refreshed() {
        let server = MockServer::start().await;
        // Inside the expiry margin: every call fetches a new token
        mount_token(&server, 10, 2).await;

        Mock::given(method("GET"))
            .and(path("/v1/playlists/p1/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        let client = SpotifyClient::new(spotify_config(&server)).unwrap();
        client.playlist_page("p1", 0).await.unwrap();
        client.playlist_page("p1", 0).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_client"
            })))
            .mount(&server)
            .await;

        let client = SpotifyClient::new(spotify_config(&server)).unwrap();
        let err = client.playlist_tracks("p1", 0).await.unwrap_err();

        assert!(matches!(err, ClientError::AuthFailed(_)));
    }

    #[tokio::test]
    async fn test_missing_playlist_is_provider_error() {
        let server = MockServer::start().await;
        mount_token(&server, 3600, 1).await;

        Mock::given(method("GET"))
            .and(path("/v1/playlists/gone/tracks"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .mount(&server)
            .await;

        let client = SpotifyClient::new(spotify_config(&server)).unwrap();
        let err = client.playlist_page("gone", 0).await.unwrap_err();

        match err {
            ChorusError::Provider { provider, message } => {
                assert_eq!(provider, "spotify");
                assert!(message.contains("404"));
            }
            other => panic!("Expected provider error, got {other:?}"),
        }
    }
}
