//! Adapter layer: Convert Last.fm DTOs to domain models

use chrono::{Datelike, NaiveDateTime};

use super::dto;
use crate::enrichment::domain::EnrichmentResult;

/// Last.fm wiki timestamps, e.g. "27 Jul 2008, 15:55"
const PUBLISHED_FORMAT: &str = "%d %b %Y, %H:%M";

/// Convert a track.getInfo track into an enrichment result.
///
/// `artist`/`title` are the values that were looked up; they stand in when
/// the response omits its own.
pub fn to_enrichment(track: dto::Track, artist: &str, title: &str) -> EnrichmentResult {
    let year = track
        .album
        .as_ref()
        .and_then(|a| a.wiki.as_ref())
        .and_then(|w| w.published.as_deref())
        .or_else(|| track.wiki.as_ref().and_then(|w| w.published.as_deref()))
        .and_then(parse_published_year);

    EnrichmentResult {
        artist: Some(
            track
                .artist
                .and_then(|a| a.name)
                .unwrap_or_else(|| artist.to_string()),
        ),
        title: Some(track.name.unwrap_or_else(|| title.to_string())),
        album: track.album.and_then(|a| a.title),
        year,
        genre: track
            .toptags
            .and_then(|t| t.tag.into_iter().next())
            .map(|t| t.name),
        duration_seconds: track
            .duration
            .filter(|&ms| ms > 0)
            .map(|ms| (ms + 500) / 1000),
        external_ids: None,
    }
}

/// Year from a wiki timestamp; falls back to the first 4-digit number
fn parse_published_year(published: &str) -> Option<u32> {
    if let Ok(date) = NaiveDateTime::parse_from_str(published.trim(), PUBLISHED_FORMAT) {
        return u32::try_from(date.year()).ok();
    }
    published
        .split(|c: char| !c.is_ascii_digit())
        .find(|part| part.len() == 4)
        .and_then(|y| y.parse().ok())
}
