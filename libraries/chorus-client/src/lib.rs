//! Chorus HTTP Collaborators
//!
//! Implementations of the `chorus-core` collaborator traits over HTTP.
//!
//! # Features
//!
//! - **Lavalink**: track loading and search (`TrackCatalog`), REST player
//!   control (`Player`), player bookkeeping (`PlayerRegistry`), websocket
//!   frame decoding into finish notifications
//! - **Spotify**: playlist enumeration (`PlaylistCatalog`) with a cached
//!   client-credentials token
//!
//! # Example
//!
//! ```ignore
//! use chorus_client::{LavalinkClient, LavalinkConfig, SpotifyClient, SpotifyConfig};
//! use chorus_core::TrackCatalog;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let lavalink = LavalinkClient::new(&LavalinkConfig::new("localhost", 2333, "youshallnotpass"))?;
//!     let result = lavalink.search("daft punk one more time").await?;
//!     println!("Top hit: {:?}", result.first().map(|t| &t.title));
//!
//!     let spotify = SpotifyClient::new(SpotifyConfig::new("id", "secret"))?;
//!     let page = spotify.playlist_tracks("37i9dQZF1DXcBWIGoYBM5M", 0).await?;
//!     println!("{} items on the first page", page.items.len());
//!
//!     Ok(())
//! }
//! ```

mod error;
mod lavalink;
mod spotify;
mod types;

pub use error::{ClientError, Result};
pub use lavalink::{LavalinkClient, LavalinkPlayer, LavalinkPlayers};
pub use spotify::SpotifyClient;
pub use types::{
    LavalinkConfig, LavalinkEndReason, LavalinkTrack, LavalinkTrackInfo, LoadTracksResponse,
    PlayerState, PlaylistItem, PlaylistTracksPage, RealtimeState, SpotifyConfig, SpotifyTrack,
    UpdatePlayer, VoiceState,
};
