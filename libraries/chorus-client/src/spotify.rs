//! Spotify Web API client (catalog B).
//!
//! Only playlist enumeration is needed. Authentication uses the
//! client-credentials flow; the token is cached until shortly before it
//! expires and refreshed once if the API rejects it early.

use crate::error::{ClientError, Result};
use crate::types::{PlaylistTracksPage, SpotifyConfig, TokenResponse};
use async_trait::async_trait;
use chorus_core::{PlaylistCatalog, PlaylistEntry, PlaylistPage};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

const PROVIDER: &str = "spotify";

/// Tokens this close to expiry are refreshed before use
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

/// Client for the Spotify Web API.
pub struct SpotifyClient {
    http: Client,
    config: SpotifyConfig,
    token: RwLock<Option<CachedToken>>,
}

impl SpotifyClient {
    /// Create a new client.
    pub fn new(config: SpotifyConfig) -> Result<Self> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(ClientError::AuthFailed(
                "client id and secret are required".into(),
            ));
        }
        for url in [&config.api_url, &config.accounts_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ClientError::InvalidUrl(format!(
                    "{} must start with http:// or https://",
                    url
                )));
            }
            Url::parse(url).map_err(|e| ClientError::InvalidUrl(format!("{url}: {e}")))?;
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Chorus/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let config = SpotifyConfig {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            accounts_url: config.accounts_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.clamp(1, 100),
            ..config
        };

        Ok(Self {
            http,
            config,
            token: RwLock::new(None),
        })
    }

    /// Fetch one page of a playlist's items.
    pub async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
    ) -> Result<PlaylistTracksPage> {
        let token = self.access_token().await?;

        match self.get_playlist_page(playlist_id, offset, &token).await {
            Err(ClientError::AuthFailed(_)) => {
                // Revoked before its announced expiry
                warn!("Spotify rejected cached token, refreshing");
                self.invalidate_token().await;
                let token = self.access_token().await?;
                self.get_playlist_page(playlist_id, offset, &token).await
            }
            other => other,
        }
    }

    async fn get_playlist_page(
        &self,
        playlist_id: &str,
        offset: usize,
        token: &str,
    ) -> Result<PlaylistTracksPage> {
        let url = format!("{}/v1/playlists/{}/tracks", self.config.api_url, playlist_id);
        debug!(url = %url, offset, "Fetching playlist page");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("offset", offset.to_string()),
                ("limit", self.config.page_size.to_string()),
            ])
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let page: PlaylistTracksPage = response.json().await.map_err(|e| {
                ClientError::ParseError(format!("Failed to parse playlist page: {}", e))
            })?;
            debug!(
                playlist = %playlist_id,
                offset,
                received = page.items.len(),
                total = ?page.total,
                "Fetched playlist page"
            );
            Ok(page)
        } else if status == StatusCode::UNAUTHORIZED {
            Err(ClientError::AuthFailed("Access token rejected".to_string()))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }

    /// Cached token, or a fresh one from the accounts service.
    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let mut slot = self.token.write().await;
        // Another task may have refreshed while we waited
        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let fetched = self.request_token().await?;
        let value = fetched.access_token.clone();
        *slot = Some(CachedToken {
            value: fetched.access_token,
            expires_at: Instant::now() + Duration::from_secs(fetched.expires_in),
        });
        Ok(value)
    }

    async fn invalidate_token(&self) {
        *self.token.write().await = None;
    }

    async fn request_token(&self) -> Result<TokenResponse> {
        let url = format!("{}/api/token", self.config.accounts_url);
        debug!(url = %url, "Requesting client-credentials token");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let token: TokenResponse = response.json().await.map_err(|e| {
                ClientError::ParseError(format!("Failed to parse token response: {}", e))
            })?;
            info!(expires_in = token.expires_in, "Obtained Spotify token");
            Ok(token)
        } else if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Spotify credentials rejected");
            Err(ClientError::AuthFailed(
                "Invalid Spotify client credentials".to_string(),
            ))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}

#[async_trait]
impl PlaylistCatalog for SpotifyClient {
    async fn playlist_page(
        &self,
        playlist_id: &str,
        offset: usize,
    ) -> chorus_core::Result<PlaylistPage> {
        let page = self
            .playlist_tracks(playlist_id, offset)
            .await
            .map_err(|e| e.into_provider(PROVIDER))?;

        Ok(PlaylistPage {
            entries: page.items.into_iter().map(PlaylistEntry::from).collect(),
        })
    }
}
