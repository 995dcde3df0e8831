//! Audio file metadata reading and writing.
//!
//! Uses the lofty crate for format-independent metadata access.
//! Supports reading from and writing to MP3, FLAC, OGG, M4A, and WAV files.
//!
//! # Features
//! - Read track metadata (title, artist, album, year, genre, duration)
//! - Fall back to placeholder values when a file cannot be parsed
//! - Merge enrichment results and user edits onto the existing tags
//! - Embed lyrics and MusicBrainz identifiers

mod store;

pub use store::{LoftyTags, TagStore};

#[cfg(test)]
pub use store::mocks;

use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, ItemValue, Tag, TagItem};
use serde::Serialize;
use std::path::Path;

use crate::enrichment::domain::{EnrichmentResult, ExternalIds};
use crate::error::{Error, Result};
use crate::model::title_from_filename;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const UNKNOWN_YEAR: &str = "Unknown Year";
pub const UNKNOWN_GENRE: &str = "Unknown Genre";

/// Lyrics are always stored with this ISO 639-2 language code
const LYRICS_LANGUAGE: [u8; 3] = *b"eng";

/// Track metadata as shown to users.
///
/// Missing fields hold the `UNKNOWN_*` placeholders; a missing title is the
/// file name without its extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub genre: String,
    /// Whole seconds, rounded
    pub duration: u64,
}

impl TrackMetadata {
    /// All-placeholder metadata for a file that could not be parsed
    pub fn fallback(file_name: &str) -> Self {
        Self {
            title: title_from_filename(file_name),
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            year: UNKNOWN_YEAR.to_string(),
            genre: UNKNOWN_GENRE.to_string(),
            duration: 0,
        }
    }
}

/// Fields to merge onto a file's tags.
///
/// `None` keeps whatever the file already has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    pub musicbrainz: Option<ExternalIds>,
}

impl From<&EnrichmentResult> for TagUpdate {
    fn from(result: &EnrichmentResult) -> Self {
        Self {
            title: result.title.clone(),
            artist: result.artist.clone(),
            album: result.album.clone(),
            year: result.year,
            genre: result.genre.clone(),
            musicbrainz: result.external_ids.clone().filter(|ids| !ids.is_empty()),
        }
    }
}

/// Result of a write operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    /// Number of fields that were updated
    pub fields_updated: usize,
}

pub fn read(path: &Path) -> Result<TrackMetadata> {
    let tagged_file = open(path)?;

    // Get the primary tag, or fall back to the first available tag
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let text = |value: Option<std::borrow::Cow<'_, str>>| {
        value
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    Ok(TrackMetadata {
        title: tag
            .and_then(|t| text(t.title()))
            .unwrap_or_else(|| title_from_filename(file_name)),
        artist: tag
            .and_then(|t| text(t.artist()))
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        album: tag
            .and_then(|t| text(t.album()))
            .unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
        year: tag
            .and_then(|t| t.year())
            .filter(|&y| y > 0)
            .map(|y| y.to_string())
            .unwrap_or_else(|| UNKNOWN_YEAR.to_string()),
        genre: tag
            .and_then(|t| text(t.genre()))
            .unwrap_or_else(|| UNKNOWN_GENRE.to_string()),
        duration: tagged_file.properties().duration().as_secs_f64().round() as u64,
    })
}

/// Merge `update` onto the file's existing tags and save.
pub fn write(path: &Path, update: &TagUpdate) -> Result<WriteResult> {
    let mut tagged_file = open(path)?;
    let tag = writable_tag(&mut tagged_file, path)?;

    let mut fields_updated = 0;

    if let Some(ref title) = update.title {
        tag.set_title(title.clone());
        fields_updated += 1;
    }
    if let Some(ref artist) = update.artist {
        tag.set_artist(artist.clone());
        fields_updated += 1;
    }
    if let Some(ref album) = update.album {
        tag.set_album(album.clone());
        fields_updated += 1;
    }
    if let Some(year) = update.year {
        tag.set_year(year);
        fields_updated += 1;
    }
    if let Some(ref genre) = update.genre {
        tag.set_genre(genre.clone());
        fields_updated += 1;
    }

    if let Some(ref ids) = update.musicbrainz {
        let pairs = [
            (ItemKey::MusicBrainzRecordingId, &ids.track_id),
            (ItemKey::MusicBrainzArtistId, &ids.artist_id),
            (ItemKey::MusicBrainzReleaseId, &ids.album_id),
            (ItemKey::MusicBrainzReleaseArtistId, &ids.album_artist_id),
        ];
        for (key, value) in pairs {
            if let Some(value) = value
                && tag.insert_text(key, value.clone())
            {
                fields_updated += 1;
            }
        }
    }

    save(&tagged_file, path)?;
    Ok(WriteResult { fields_updated })
}

/// Embed plain-text lyrics, replacing any existing lyrics.
pub fn write_lyrics(path: &Path, lyrics: &str) -> Result<WriteResult> {
    let mut tagged_file = open(path)?;
    let tag = writable_tag(&mut tagged_file, path)?;

    let mut item = TagItem::new(ItemKey::Lyrics, ItemValue::Text(lyrics.to_string()));
    item.set_lang(LYRICS_LANGUAGE);
    let fields_updated = usize::from(tag.insert(item));

    save(&tagged_file, path)?;
    Ok(WriteResult { fields_updated })
}

fn open(path: &Path) -> Result<TaggedFile> {
    Probe::open(path)
        .map_err(|e| Error::metadata(path, format!("Failed to open file: {}", e)))?
        .guess_file_type()
        .map_err(|e| Error::metadata(path, format!("Failed to probe file: {}", e)))?
        .read()
        .map_err(|e| Error::metadata(path, format!("Failed to read tags: {}", e)))
}

/// The tag that already carries data, or a fresh tag of the format's primary type
fn writable_tag<'a>(tagged_file: &'a mut TaggedFile, path: &Path) -> Result<&'a mut Tag> {
    let tag_type = if tagged_file.primary_tag().is_some() {
        tagged_file.primary_tag_type()
    } else if let Some(first) = tagged_file.first_tag() {
        first.tag_type()
    } else {
        let tag_type = tagged_file.primary_tag_type();
        tracing::debug!(path = %path.display(), ?tag_type, "No tags found, creating one");
        tagged_file.insert_tag(Tag::new(tag_type));
        tag_type
    };

    tagged_file
        .tag_mut(tag_type)
        .ok_or_else(|| Error::metadata(path, "No writable tag"))
}

fn save(tagged_file: &TaggedFile, path: &Path) -> Result<()> {
    tagged_file
        .save_to_path(path, WriteOptions::default())
        .map_err(|e| Error::metadata(path, format!("Failed to write tags: {}", e)))
}
