//! Last.fm API Data Transfer Objects
//!
//! These types match what `track.getInfo` returns with `format=json`.
//! DO NOT use these types outside the lastfm module - convert to domain types.
//!
//! API Reference: https://www.last.fm/api/show/track.getInfo
//!
//! Quirks handled here:
//! - numbers arrive as strings (`"duration": "354000"`)
//! - a single tag may arrive as an object instead of a one-element array
//! - errors come back as `{"error": 6, "message": "Track not found"}`,
//!   sometimes with HTTP 200

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level track.getInfo response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackInfoResponse {
    pub track: Option<Track>,
    /// Last.fm error code if the call failed
    pub error: Option<i64>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub name: Option<String>,
    /// Milliseconds; "0" when unknown
    #[serde(default, deserialize_with = "number_or_string")]
    pub duration: Option<u64>,
    pub artist: Option<TrackArtist>,
    pub album: Option<Album>,
    pub toptags: Option<TopTags>,
    pub wiki: Option<Wiki>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackArtist {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    pub title: Option<String>,
    pub wiki: Option<Wiki>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Wiki {
    /// e.g. "27 Jul 2008, 15:05"
    pub published: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TopTags {
    #[serde(default, deserialize_with = "one_or_many")]
    pub tag: Vec<TagEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagEntry {
    pub name: String,
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<TagEntry>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Many(Vec<TagEntry>),
        One(TagEntry),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Many(tags)) => tags,
        Some(Raw::One(tag)) => vec![tag],
        None => Vec::new(),
    })
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================
