//! The persistent download directory as a browsable library.
//!
//! Listing, search, manual tag edits and the on-demand Last.fm import all
//! address files by plain name. Names are checked before any filesystem
//! access.

mod paths;

pub use paths::{contains_traversal, is_plain_file_name, resolve_within};

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::enrichment::{EnrichmentError, EnrichmentResult, EnrichmentService};
use crate::error::{Error, Result, ResultExt};
use crate::metadata::{TagStore, TagUpdate, TrackMetadata};
use crate::scanner;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Parse raw query values; anything unparsable or below 1 takes the default.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        let positive = |raw: Option<&str>, default: usize| {
            raw.and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n >= 1)
                .unwrap_or(default)
        };
        Self {
            page: positive(page, DEFAULT_PAGE),
            limit: positive(limit, DEFAULT_LIMIT),
        }
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryFile {
    pub name: String,
    pub metadata: TrackMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_files: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: Page, total_files: usize) -> Self {
        let total_pages = total_files.div_ceil(page.limit);
        Self {
            current_page: page.page,
            total_pages,
            total_files,
            has_next: page.page < total_pages,
            has_prev: page.page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePage {
    pub files: Vec<LibraryFile>,
    pub pagination: Pagination,
}

/// Manual tag edit. Blank strings count as "not given"; `year` may be a
/// number or a numeric string and is ignored otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetadataUpdate {
    #[serde(deserialize_with = "non_blank")]
    pub title: Option<String>,
    #[serde(deserialize_with = "non_blank")]
    pub artist: Option<String>,
    #[serde(deserialize_with = "non_blank")]
    pub album: Option<String>,
    #[serde(deserialize_with = "lenient_year")]
    pub year: Option<u32>,
    #[serde(deserialize_with = "non_blank")]
    pub genre: Option<String>,
}

impl From<&MetadataUpdate> for TagUpdate {
    fn from(update: &MetadataUpdate) -> Self {
        Self {
            title: update.title.clone(),
            artist: update.artist.clone(),
            album: update.album.clone(),
            year: update.year,
            genre: update.genre.clone(),
            musicbrainz: None,
        }
    }
}

fn non_blank<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn lenient_year<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<u32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(n)) => u32::try_from(n).ok().filter(|&y| y > 0),
        Some(Raw::Text(s)) => s.trim().parse::<u32>().ok().filter(|&y| y > 0),
        Some(Raw::Other(_)) | None => None,
    })
}

/// Library operations over the persistent download directory.
#[derive(Clone)]
pub struct Library {
    root: PathBuf,
    tags: Arc<dyn TagStore>,
    enrichment: EnrichmentService,
}

impl Library {
    pub fn new(root: impl Into<PathBuf>, tags: Arc<dyn TagStore>, enrichment: EnrichmentService) -> Self {
        Self {
            root: root.into(),
            tags,
            enrichment,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// One page of the library, sorted by name.
    pub async fn list(&self, page: Page) -> Result<FilePage> {
        let names = self.names().await?;
        let total = names.len();

        let mut files = Vec::new();
        for name in names.into_iter().skip(page.offset()).take(page.limit) {
            let metadata = self.metadata_for(&name).await;
            files.push(LibraryFile { name, metadata });
        }

        Ok(FilePage {
            files,
            pagination: Pagination::new(page, total),
        })
    }

    /// Files whose name, title, artist or album contains `query`, ignoring case.
    ///
    /// A blank query matches everything.
    pub async fn search(&self, query: &str, page: Page) -> Result<FilePage> {
        let needle = query.trim().to_lowercase();

        let mut matches = Vec::new();
        for name in self.names().await? {
            let metadata = self.metadata_for(&name).await;
            let hit = needle.is_empty()
                || [&name, &metadata.title, &metadata.artist, &metadata.album]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle));
            if hit {
                matches.push(LibraryFile { name, metadata });
            }
        }

        let total = matches.len();
        let files = matches
            .into_iter()
            .skip(page.offset())
            .take(page.limit)
            .collect();

        Ok(FilePage {
            files,
            pagination: Pagination::new(page, total),
        })
    }

    /// Apply a manual tag edit to one file.
    pub async fn update_metadata(&self, name: &str, update: &MetadataUpdate) -> Result<()> {
        let path = self.existing_file(name).await?;
        let result = self.tags.write(&path, &TagUpdate::from(update)).await?;
        tracing::info!(file = name, fields = result.fields_updated, "Metadata updated");
        Ok(())
    }

    /// Fetch track info from Last.fm and merge it onto one file's tags.
    pub async fn import_lastfm(&self, name: &str) -> Result<EnrichmentResult> {
        let path = self.existing_file(name).await?;

        if !self.enrichment.is_track_info_configured() {
            return Err(Error::validation("Last.fm API key not configured"));
        }

        let current = self.metadata_for(name).await;
        let found = self
            .enrichment
            .track_info(&current.artist, &current.title)
            .await
            .map_err(|e| match e {
                EnrichmentError::NotConfigured(_) => {
                    Error::validation("Last.fm API key not configured")
                }
                other => Error::Enrichment(other),
            })?
            .ok_or_else(|| Error::NoData("No metadata found on Last.fm".to_string()))?;

        let update = TagUpdate {
            musicbrainz: None,
            ..TagUpdate::from(&found)
        };
        let result = self.tags.write(&path, &update).await?;
        tracing::info!(file = name, fields = result.fields_updated, "Imported Last.fm metadata");

        Ok(found)
    }

    async fn names(&self) -> Result<Vec<String>> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(format!("Failed to create {}", self.root.display()))?;
        scanner::audio_names_sorted(&self.root).await
    }

    async fn metadata_for(&self, name: &str) -> TrackMetadata {
        match self.tags.read(&self.root.join(name)).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(file = name, error = %e, "Could not read tags, using placeholders");
                TrackMetadata::fallback(name)
            }
        }
    }

    /// Validate `name` and make sure it is an existing file in the library.
    async fn existing_file(&self, name: &str) -> Result<PathBuf> {
        if !is_plain_file_name(name) {
            tracing::warn!(file = name, "Rejected file name");
            return Err(Error::PathTraversal);
        }

        let path = self.root.join(name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(Error::not_found(path)),
        }
    }
}
