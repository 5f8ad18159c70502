//! Chorus bot library: configuration, voice state and wiring
pub mod app;
pub mod config;
pub mod error;
pub mod voice;

pub use app::{build_resolver, App};
pub use config::BotConfig;
pub use error::{BotError, Result};
pub use voice::VoiceStateCache;
