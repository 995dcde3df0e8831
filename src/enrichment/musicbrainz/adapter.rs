//! Adapter layer: Convert MusicBrainz DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if MusicBrainz changes their response format,
//! only this file and dto.rs need to change.

use super::dto;
use crate::enrichment::domain::{EnrichmentResult, ExternalIds};

/// Convert a recording lookup into an enrichment result.
///
/// `artist`/`title` are the values the search was made with; they stand in
/// when the recording carries no credit or title of its own.
pub fn to_enrichment(response: dto::RecordingResponse, artist: &str, title: &str) -> EnrichmentResult {
    let credited = response.artist_credit.first().map(|c| &c.artist);
    let release = response.releases.first();

    let artist_id = credited.map(|a| a.id.clone());
    let external_ids = ExternalIds {
        artist_id: artist_id.clone(),
        track_id: Some(response.id.clone()),
        album_id: release.map(|r| r.id.clone()),
        album_artist_id: artist_id,
    };

    EnrichmentResult {
        artist: Some(
            credited
                .map(|a| a.name.clone())
                .unwrap_or_else(|| artist.to_string()),
        ),
        title: Some(response.title.clone().unwrap_or_else(|| title.to_string())),
        album: release.map(|r| r.title.clone()),
        year: release.and_then(|r| r.date.as_deref()).and_then(parse_year),
        genre: top_tag(&response.tags),
        duration_seconds: response.length.map(|ms| (ms + 500) / 1000),
        external_ids: Some(external_ids),
    }
}

/// Parse the year from a date (YYYY, YYYY-MM, or YYYY-MM-DD)
fn parse_year(date: &str) -> Option<u32> {
    date.split('-').next().and_then(|y| y.trim().parse().ok())
}

/// The most-voted tag; ties go to the one listed first
fn top_tag(tags: &[dto::Tag]) -> Option<String> {
    let mut best: Option<&dto::Tag> = None;
    for tag in tags {
        if best.is_none_or(|b| tag.count > b.count) {
            best = Some(tag);
        }
    }
    best.map(|t| t.name.clone())
}
