/// Bot configuration
use crate::error::{BotError, Result};
use chorus_client::{LavalinkConfig, SpotifyConfig};
use chorus_playback::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "chorus.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    #[serde(default = "default_lavalink")]
    pub lavalink: LavalinkSettings,

    #[serde(default = "default_spotify")]
    pub spotify: SpotifySettings,

    #[serde(default = "default_resolver")]
    pub resolver: ResolverSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LavalinkSettings {
    #[serde(default = "default_lavalink_host")]
    pub host: String,

    #[serde(default = "default_lavalink_port")]
    pub port: u16,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub secure: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpotifySettings {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_spotify_api_url")]
    pub api_url: String,

    #[serde(default = "default_spotify_accounts_url")]
    pub accounts_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverSettings {
    /// Smallest YouTube playlist accepted
    #[serde(default = "default_min_playlist_len")]
    pub min_playlist_len: usize,

    /// Spotify items per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Concurrent searches while mapping a Spotify playlist
    #[serde(default = "default_search_concurrency")]
    pub search_concurrency: usize,
}

impl BotConfig {
    /// Load configuration from file and environment
    ///
    /// `path` defaults to `chorus.toml` in the working directory; a missing
    /// default file is fine, a missing explicit one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables, e.g. CHORUS_LAVALINK__PASSWORD
        settings = settings.add_source(
            config::Environment::with_prefix("CHORUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::build(settings)
    }

    /// Parse configuration from TOML text, without environment overrides
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml));

        Self::build(settings)
    }

    fn build(settings: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config = settings
            .build()
            .map_err(|e| BotError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| BotError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.lavalink.host.is_empty() {
            return Err(BotError::Config("Lavalink host is required".to_string()));
        }

        if self.lavalink.password.is_empty() {
            return Err(BotError::Config(
                "Lavalink password is required (set CHORUS_LAVALINK__PASSWORD)".to_string(),
            ));
        }

        if self.spotify.client_id.is_empty() || self.spotify.client_secret.is_empty() {
            return Err(BotError::Config(
                "Spotify credentials are required (set CHORUS_SPOTIFY__CLIENT_ID and CHORUS_SPOTIFY__CLIENT_SECRET)"
                    .to_string(),
            ));
        }

        if !(1..=100).contains(&self.resolver.page_size) {
            return Err(BotError::Config(format!(
                "resolver.page_size must be between 1 and 100, got {}",
                self.resolver.page_size
            )));
        }

        if self.resolver.min_playlist_len == 0 || self.resolver.search_concurrency == 0 {
            return Err(BotError::Config(
                "resolver.min_playlist_len and resolver.search_concurrency must be positive"
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn lavalink_config(&self) -> LavalinkConfig {
        LavalinkConfig {
            host: self.lavalink.host.clone(),
            port: self.lavalink.port,
            password: self.lavalink.password.clone(),
            secure: self.lavalink.secure,
        }
    }

    pub fn spotify_config(&self) -> SpotifyConfig {
        let mut config =
            SpotifyConfig::new(&self.spotify.client_id, &self.spotify.client_secret)
                .with_base_urls(&self.spotify.api_url, &self.spotify.accounts_url);
        config.page_size = self.resolver.page_size;
        config
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            min_playlist_len: self.resolver.min_playlist_len,
            search_concurrency: self.resolver.search_concurrency,
        }
    }
}

// Default values
fn default_lavalink() -> LavalinkSettings {
    LavalinkSettings {
        host: default_lavalink_host(),
        port: default_lavalink_port(),
        password: String::new(),
        secure: false,
    }
}

fn default_lavalink_host() -> String {
    "localhost".to_string()
}

fn default_lavalink_port() -> u16 {
    2333
}

fn default_spotify() -> SpotifySettings {
    SpotifySettings {
        client_id: String::new(),
        client_secret: String::new(),
        api_url: default_spotify_api_url(),
        accounts_url: default_spotify_accounts_url(),
    }
}

fn default_spotify_api_url() -> String {
    "https://api.spotify.com".to_string()
}

fn default_spotify_accounts_url() -> String {
    "https://accounts.spotify.com".to_string()
}

fn default_resolver() -> ResolverSettings {
    ResolverSettings {
        min_playlist_len: default_min_playlist_len(),
        page_size: default_page_size(),
        search_concurrency: default_search_concurrency(),
    }
}

fn default_min_playlist_len() -> usize {
    3
}

fn default_page_size() -> usize {
    100
}

fn default_search_concurrency() -> usize {
    4
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            lavalink: default_lavalink(),
            spotify: default_spotify(),
            resolver: default_resolver(),
        }
    }
}
