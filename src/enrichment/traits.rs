//! Trait definitions for external API clients.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real client implementations, while tests
//! can substitute mock implementations.
//!
//! # Example
//!
//! ```ignore
//! use music_ripper::enrichment::traits::RecordingLookup;
//!
//! async fn album_of<T: RecordingLookup>(client: &T) -> Option<String> {
//!     client.find_recording("Artist", "Title").await.ok()?.album
//! }
//! ```

use async_trait::async_trait;

use super::domain::{EnrichmentError, EnrichmentResult};

/// Canonical metadata registry lookup (MusicBrainz).
#[async_trait]
pub trait RecordingLookup: Send + Sync {
    /// Search by artist + title and return the detailed best hit.
    async fn find_recording(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<EnrichmentResult, EnrichmentError>;
}

/// Lyrics lookup (lyrics.ovh).
#[async_trait]
pub trait LyricsLookup: Send + Sync {
    /// Fetch plain-text lyrics.
    async fn lookup(&self, artist: &str, title: &str) -> Result<String, EnrichmentError>;
}

/// Track-info lookup (Last.fm).
#[async_trait]
pub trait TrackInfoLookup: Send + Sync {
    /// Fetch album, year, genre and duration.
    async fn track_info(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<EnrichmentResult, EnrichmentError>;
}

// Implement traits for real clients

#[async_trait]
impl RecordingLookup for super::musicbrainz::MusicBrainzClient {
    async fn find_recording(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<EnrichmentResult, EnrichmentError> {
        self.find_recording(artist, title).await
    }
}

#[async_trait]
impl LyricsLookup for super::lyrics::LyricsClient {
    async fn lookup(&self, artist: &str, title: &str) -> Result<String, EnrichmentError> {
        self.lookup(artist, title).await
    }
}

#[async_trait]
impl TrackInfoLookup for super::lastfm::LastFmClient {
    async fn track_info(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<EnrichmentResult, EnrichmentError> {
        self.track_info(artist, title).await
    }
}
