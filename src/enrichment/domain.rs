//! Internal domain models for metadata enrichment.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All external API responses get converted into these types via adapters.

use serde::Serialize;

/// Supplementary track fields obtained from an external service.
///
/// Every field is optional: a `None` means "the service had nothing", and
/// the tag writer keeps whatever the file already carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResult {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_ids: Option<ExternalIds>,
}

/// MusicBrainz identifiers for a matched recording.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIds {
    pub artist_id: Option<String>,
    pub track_id: Option<String>,
    pub album_id: Option<String>,
    pub album_artist_id: Option<String>,
}

impl ExternalIds {
    pub fn is_empty(&self) -> bool {
        self.artist_id.is_none()
            && self.track_id.is_none()
            && self.album_id.is_none()
            && self.album_artist_id.is_none()
    }
}

/// Source of enrichment data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentSource {
    MusicBrainz,
    LyricsOvh,
    LastFm,
}

impl std::fmt::Display for EnrichmentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::MusicBrainz => "MusicBrainz",
            Self::LyricsOvh => "lyrics.ovh",
            Self::LastFm => "Last.fm",
        })
    }
}

/// Errors that can occur during enrichment
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No matches found")]
    NoMatches,

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("{0} is not configured")]
    NotConfigured(EnrichmentSource),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_serializes_camel_case() {
        let result = EnrichmentResult {
            artist: Some("Queen".into()),
            duration_seconds: Some(354),
            external_ids: Some(ExternalIds {
                track_id: Some("rec-1".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["artist"], "Queen");
        assert_eq!(json["durationSeconds"], 354);
        assert_eq!(json["externalIds"]["trackId"], "rec-1");
        assert!(json["album"].is_null());
    }

    #[test]
    fn test_external_ids_empty() {
        assert!(ExternalIds::default().is_empty());
        assert!(
            !ExternalIds {
                album_id: Some("x".into()),
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn test_not_configured_message() {
        let err = EnrichmentError::NotConfigured(EnrichmentSource::LastFm);
        assert_eq!(err.to_string(), "Last.fm is not configured");
    }
}
