//! Enrichment service - soft-failing facade over the lookup clients
//!
//! Every lookup answers `Option`: a network error, an empty search or a
//! malformed body all mean "no data" and are logged, never raised. The
//! only error surfaced is a missing Last.fm key, which the on-demand
//! import endpoint reports to the caller.

use std::sync::Arc;

use crate::config::Config;
use crate::enrichment::{
    domain::{EnrichmentError, EnrichmentResult, EnrichmentSource},
    lastfm::LastFmClient,
    lyrics::LyricsClient,
    musicbrainz::MusicBrainzClient,
    traits::{LyricsLookup, RecordingLookup, TrackInfoLookup},
};

/// Service for enriching track metadata from external sources
#[derive(Clone)]
pub struct EnrichmentService {
    registry: Arc<dyn RecordingLookup>,
    lyrics: Arc<dyn LyricsLookup>,
    track_info: Option<Arc<dyn TrackInfoLookup>>,
}

impl EnrichmentService {
    /// Assemble a service from explicit collaborators
    pub fn new(
        registry: Arc<dyn RecordingLookup>,
        lyrics: Arc<dyn LyricsLookup>,
        track_info: Option<Arc<dyn TrackInfoLookup>>,
    ) -> Self {
        Self {
            registry,
            lyrics,
            track_info,
        }
    }

    /// Build the real HTTP clients; Last.fm only when a key is configured
    pub fn from_config(config: &Config) -> Result<Self, EnrichmentError> {
        let registry = Arc::new(MusicBrainzClient::new(&config.musicbrainz)?);
        let lyrics = Arc::new(LyricsClient::new(&config.lyrics)?);
        let track_info = match config.lastfm_api_key() {
            Some(key) => Some(Arc::new(LastFmClient::new(key, &config.lastfm)?)
                as Arc<dyn TrackInfoLookup>),
            None => None,
        };

        Ok(Self::new(registry, lyrics, track_info))
    }

    /// Whether the track-info service has an API key
    pub fn is_track_info_configured(&self) -> bool {
        self.track_info.is_some()
    }

    /// Registry metadata for a track, or `None` when nothing usable came back
    pub async fn registry_metadata(&self, artist: &str, title: &str) -> Option<EnrichmentResult> {
        let result = self.registry.find_recording(artist, title).await;
        soft(EnrichmentSource::MusicBrainz, artist, title, result)
    }

    /// Lyrics for a track, or `None`
    pub async fn lyrics(&self, artist: &str, title: &str) -> Option<String> {
        let result = self.lyrics.lookup(artist, title).await;
        soft(EnrichmentSource::LyricsOvh, artist, title, result)
    }

    /// Track info for a track.
    ///
    /// Fails only with `NotConfigured`; every lookup failure is `Ok(None)`.
    pub async fn track_info(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<EnrichmentResult>, EnrichmentError> {
        let client = self
            .track_info
            .as_ref()
            .ok_or(EnrichmentError::NotConfigured(EnrichmentSource::LastFm))?;

        let result = client.track_info(artist, title).await;
        Ok(soft(EnrichmentSource::LastFm, artist, title, result))
    }
}

fn soft<T>(
    source: EnrichmentSource,
    artist: &str,
    title: &str,
    result: Result<T, EnrichmentError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(EnrichmentError::NoMatches) => {
            tracing::debug!(%source, artist, title, "No match");
            None
        }
        Err(e) => {
            tracing::warn!(%source, artist, title, error = %e, "Lookup failed");
            None
        }
    }
}
