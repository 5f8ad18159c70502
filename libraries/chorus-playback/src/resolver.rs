//! Track resolver
//!
//! Turns a raw query into zero or more playable tracks:
//!
//! 1. Catalog-B playlist link: enumerate every page, search catalog A for
//!    "{artist} {title}" of each entry, keep the hits
//! 2. Catalog-A playlist: load it whole, require a minimum size
//! 3. Anything else: direct lookup of an embedded video id, or a text
//!    search taking the top result
//!
//! The resolver never fails with `Err`; every path ends in a [`Resolution`]
//! the caller turns into a reply. It never touches the queue either.

use crate::error::PlaybackError;
use crate::query::{extract_video_id, external_playlist_id, QueryKind};
use chorus_core::{
    ChorusError, LoadResult, PlaylistCatalog, PlaylistEntry, Track, TrackCatalog,
};
use futures_util::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resolver tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Smallest catalog-A playlist accepted
    pub min_playlist_len: usize,
    /// Catalog-A searches in flight while mapping a catalog-B playlist
    pub search_concurrency: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_playlist_len: 3,
            search_concurrency: 4,
        }
    }
}

/// Outcome of resolving one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one track (search or direct link)
    Single(Track),
    /// A playlist's tracks in catalog order; may be empty for catalog B
    Batch(Vec<Track>),
    /// The query pointed at nothing
    NothingFound(String),
    /// Catalog-A playlist below the minimum size
    PlaylistTooSmall {
        /// Entries the playlist had
        found: usize,
        /// Required minimum
        min: usize,
    },
    /// Lookup or search came back empty or with an error result
    SearchFailed(String),
    /// A catalog could not be reached
    ProviderFailed {
        /// Failing collaborator
        provider: String,
        /// Cause
        message: String,
    },
}

impl Resolution {
    fn provider_failed(err: ChorusError, fallback_provider: &str) -> Self {
        warn!(error = %err, "Catalog request failed");
        match err {
            ChorusError::Provider { provider, message } => Self::ProviderFailed { provider, message },
            other => Self::ProviderFailed {
                provider: fallback_provider.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Number of tracks produced
    pub fn track_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(tracks) => tracks.len(),
            _ => 0,
        }
    }

    /// Tracks to enqueue, or the failure to report
    pub fn into_tracks(self) -> Result<Vec<Track>, PlaybackError> {
        match self {
            Self::Single(track) => Ok(vec![track]),
            Self::Batch(tracks) => Ok(tracks),
            Self::NothingFound(query) => Err(PlaybackError::NothingFound(query)),
            Self::PlaylistTooSmall { found, min } => {
                Err(PlaybackError::PlaylistTooSmall { found, min })
            }
            Self::SearchFailed(query) => Err(PlaybackError::SearchFailed(query)),
            Self::ProviderFailed { provider, message } => {
                Err(PlaybackError::Provider { provider, message })
            }
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(track) => write!(f, "Found {}", track.title),
            Self::Batch(tracks) => write!(f, "Queued {} songs.", tracks.len()),
            Self::NothingFound(query) => write!(f, "Nothing found for `{query}`."),
            Self::PlaylistTooSmall { min, .. } => {
                write!(f, "Playlist too small, {min}+ songs required.")
            }
            Self::SearchFailed(query) => write!(f, "Track search failed for `{query}`."),
            Self::ProviderFailed { provider, message } => {
                write!(f, "{provider} is unavailable right now: {message}")
            }
        }
    }
}

/// Resolves user queries against the two catalogs
#[derive(Clone)]
pub struct TrackResolver {
    tracks: Arc<dyn TrackCatalog>,
    playlists: Arc<dyn PlaylistCatalog>,
    config: ResolverConfig,
}

impl TrackResolver {
    /// Create a resolver with default tuning
    pub fn new(tracks: Arc<dyn TrackCatalog>, playlists: Arc<dyn PlaylistCatalog>) -> Self {
        Self::with_config(tracks, playlists, ResolverConfig::default())
    }

    /// Create a resolver with explicit tuning
    pub fn with_config(
        tracks: Arc<dyn TrackCatalog>,
        playlists: Arc<dyn PlaylistCatalog>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            tracks,
            playlists,
            config,
        }
    }

    /// Resolver tuning in use
    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    /// Resolve a raw query
    pub async fn resolve(&self, query: &str) -> Resolution {
        let kind = QueryKind::classify(query);
        debug!(kind = ?kind, "Resolving query");

        let resolution = match kind {
            QueryKind::ExternalPlaylist(link) => self.resolve_external_playlist(&link).await,
            QueryKind::CatalogPlaylist(reference) => self.resolve_catalog_playlist(&reference).await,
            QueryKind::Text(text) => self.resolve_text(&text).await,
        };

        info!(query = %query, tracks = resolution.track_count(), "Resolved query");
        resolution
    }

    async fn resolve_external_playlist(&self, link: &str) -> Resolution {
        let Some(playlist_id) = external_playlist_id(link) else {
            return Resolution::NothingFound(link.to_string());
        };

        let entries = match self.fetch_external_playlist(&playlist_id).await {
            Ok(entries) => entries,
            Err(e) => return Resolution::provider_failed(e, "playlist catalog"),
        };

        let queries: Vec<String> = entries
            .iter()
            .filter_map(PlaylistEntry::search_query)
            .collect();
        debug!(playlist = %playlist_id, entries = entries.len(), searches = queries.len(), "Mapping playlist");

        // `buffered` keeps catalog order while searches overlap
        let results: Vec<_> = stream::iter(queries)
            .map(|query| self.search_first(query))
            .buffered(self.config.search_concurrency.max(1))
            .collect()
            .await;

        let mut tracks = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(Some(track)) => tracks.push(track),
                Ok(None) => {}
                Err(e) => return Resolution::provider_failed(e, "track catalog"),
            }
        }

        Resolution::Batch(tracks)
    }

    /// Collect every entry, page by page, until a page comes back empty
    async fn fetch_external_playlist(
        &self,
        playlist_id: &str,
    ) -> chorus_core::Result<Vec<PlaylistEntry>> {
        let mut entries = Vec::new();

        loop {
            let page = self
                .playlists
                .playlist_page(playlist_id, entries.len())
                .await?;
            if page.is_last() {
                break;
            }
            entries.extend(page.entries);
        }

        Ok(entries)
    }

    /// Top search hit; no match and error results are dropped
    async fn search_first(&self, query: String) -> chorus_core::Result<Option<Track>> {
        let result = self.tracks.search(&query).await?;

        if let LoadResult::Error(message) = &result {
            debug!(query = %query, message = %message, "Dropping playlist entry");
        }

        let track = result.into_tracks().into_iter().next();
        if track.is_none() {
            debug!(query = %query, "No match for playlist entry");
        }
        Ok(track)
    }

    async fn resolve_catalog_playlist(&self, reference: &str) -> Resolution {
        let result = match self.tracks.load(reference).await {
            Ok(result) => result,
            Err(e) => return Resolution::provider_failed(e, "track catalog"),
        };

        if let LoadResult::Error(message) = &result {
            debug!(reference = %reference, message = %message, "Playlist load failed");
            return Resolution::SearchFailed(reference.to_string());
        }

        let tracks = result.into_tracks();
        let min = self.config.min_playlist_len;

        if tracks.is_empty() {
            Resolution::NothingFound(reference.to_string())
        } else if tracks.len() < min {
            Resolution::PlaylistTooSmall {
                found: tracks.len(),
                min,
            }
        } else {
            Resolution::Batch(tracks)
        }
    }

    async fn resolve_text(&self, text: &str) -> Resolution {
        let lookup = match extract_video_id(text) {
            Some(video_id) => {
                debug!(video_id = %video_id, "Loading video directly");
                self.tracks.load(&video_id).await
            }
            None => self.tracks.search(text).await,
        };

        match lookup {
            Ok(result) => result
                .into_tracks()
                .into_iter()
                .next()
                .map_or_else(|| Resolution::SearchFailed(text.to_string()), Resolution::Single),
            Err(e) => Resolution::provider_failed(e, "track catalog"),
        }
    }
}
