//! Download-and-enrich pipeline.
//!
//! One request runs as a single sequential chain:
//!
//! `Received → Validated → Downloading → Scanning → Enriching → Finalizing → Completed | Failed`
//!
//! Each request downloads into its own temporary directory under the
//! persistent store. The directory is a [`tempfile::TempDir`], so it is
//! removed however the request ends. Metadata and enrichment problems are
//! logged per file and never fail the request; downloader and filesystem
//! failures do.

mod persist;

pub use persist::store_all;

use std::path::PathBuf;
use std::sync::Arc;

use crate::downloader::{DownloadInvocation, Downloader, build_args};
use crate::enrichment::EnrichmentService;
use crate::error::{Error, Result, ResultExt};
use crate::metadata::{TagStore, TagUpdate, TrackMetadata};
use crate::model::{DownloadRequest, TrackFile};
use crate::scanner;

/// Prefix of per-request working directories
const WORK_DIR_PREFIX: &str = "tmp-";

/// What a completed download produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Stored file names, in processing order
    pub files: Vec<String>,
    /// The persistent directory they were stored in
    pub download_dir: PathBuf,
}

/// Runs download requests end to end.
#[derive(Clone)]
pub struct Pipeline {
    downloader: Arc<dyn Downloader>,
    tags: Arc<dyn TagStore>,
    enrichment: EnrichmentService,
    download_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        downloader: Arc<dyn Downloader>,
        tags: Arc<dyn TagStore>,
        enrichment: EnrichmentService,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            downloader,
            tags,
            enrichment,
            download_dir: download_dir.into(),
        }
    }

    /// Process one download request.
    pub async fn run(&self, request: &DownloadRequest) -> Result<DownloadOutcome> {
        tracing::info!(url = request.trimmed_url(), "Download request received");

        let result = self.execute(request).await;
        match &result {
            Ok(outcome) => tracing::info!(
                count = outcome.files.len(),
                "Download completed"
            ),
            Err(e) => tracing::warn!(error = %e, "Download request failed"),
        }
        result
    }

    async fn execute(&self, request: &DownloadRequest) -> Result<DownloadOutcome> {
        let url = request.trimmed_url();
        if url.is_empty() {
            return Err(Error::validation("URL is required"));
        }
        tracing::debug!("Request validated");

        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .with_context(format!(
                "Failed to create download directory {}",
                self.download_dir.display()
            ))?;

        let work_dir = tempfile::Builder::new()
            .prefix(WORK_DIR_PREFIX)
            .tempdir_in(&self.download_dir)
            .with_context("Failed to create temporary directory")?;

        let invocation = DownloadInvocation {
            args: build_args(request, work_dir.path())?,
            url: url.to_string(),
            work_dir: work_dir.path().to_path_buf(),
        };

        tracing::info!(work_dir = %work_dir.path().display(), "Downloading");
        self.downloader.download(&invocation).await?;

        tracing::debug!("Scanning output");
        let tracks = scanner::scan(work_dir.path()).await?;
        tracing::info!(count = tracks.len(), "Found audio files");

        if request.embed_musicbrainz_metadata || request.download_lyrics {
            for track in &tracks {
                self.enrich(track, request).await;
            }
        }

        tracing::debug!("Finalizing");
        let files = store_all(&tracks, &self.download_dir).await?;

        // `work_dir` drops here on success, or at any `?` above on failure
        Ok(DownloadOutcome {
            files,
            download_dir: self.download_dir.clone(),
        })
    }

    /// Best-effort enrichment for one file; every failure is logged and skipped.
    async fn enrich(&self, track: &TrackFile, request: &DownloadRequest) {
        let metadata = match self.tags.read(&track.path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(file = %track.name, error = %e, "Could not read tags, using placeholders");
                TrackMetadata::fallback(&track.name)
            }
        };
        let (artist, title) = (metadata.artist.as_str(), metadata.title.as_str());
        tracing::debug!(file = %track.name, artist, title, "Enriching");

        if request.embed_musicbrainz_metadata
            && let Some(found) = self.enrichment.registry_metadata(artist, title).await
        {
            match self.tags.write(&track.path, &TagUpdate::from(&found)).await {
                Ok(result) => tracing::debug!(
                    file = %track.name,
                    fields = result.fields_updated,
                    "Embedded MusicBrainz metadata"
                ),
                Err(e) => {
                    tracing::warn!(file = %track.name, error = %e, "Failed to embed MusicBrainz metadata")
                }
            }
        }

        if request.download_lyrics
            && let Some(lyrics) = self.enrichment.lyrics(artist, title).await
        {
            match self.tags.write_lyrics(&track.path, &lyrics).await {
                Ok(_) => tracing::debug!(file = %track.name, "Embedded lyrics"),
                Err(e) => tracing::warn!(file = %track.name, error = %e, "Failed to embed lyrics"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use crate::downloader::mocks::MockDownloader;
    use crate::enrichment::EnrichmentResult;
    use crate::enrichment::traits::mocks::{MockLyrics, MockRegistry};
    use crate::metadata::WriteResult;
    use crate::metadata::mocks::MockTags;
    use crate::test_utils::mock_download_request;
    use tempfile::tempdir;

    struct Harness {
        downloader: Arc<MockDownloader>,
        tags: Arc<MockTags>,
        registry: Arc<MockRegistry>,
        lyrics: Arc<MockLyrics>,
        pipeline: Pipeline,
    }

    fn harness(
        dir: &Path,
        downloader: MockDownloader,
        tags: MockTags,
        registry: MockRegistry,
        lyrics: MockLyrics,
    ) -> Harness {
        let downloader = Arc::new(downloader);
        let tags = Arc::new(tags);
        let registry = Arc::new(registry);
        let lyrics = Arc::new(lyrics);
        let enrichment = EnrichmentService::new(registry.clone(), lyrics.clone(), None);
        let pipeline = Pipeline::new(downloader.clone(), tags.clone(), enrichment, dir);
        Harness {
            downloader,
            tags,
            registry,
            lyrics,
            pipeline,
        }
    }

    fn one_file() -> MockDownloader {
        MockDownloader::dropping(vec![("Artist - Title.flac".into(), b"flac".to_vec())])
    }

    fn leftover_work_dirs(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(WORK_DIR_PREFIX))
            .count()
    }

    #[tokio::test]
    async fn test_plain_download_is_stored_without_enrichment() {
        let dir = tempdir().unwrap();
        let h = harness(
            dir.path(),
            one_file(),
            MockTags::default(),
            MockRegistry::no_matches(),
            MockLyrics::no_matches(),
        );

        let outcome = h.pipeline.run(&mock_download_request()).await.unwrap();

        assert_eq!(outcome.files, vec!["Artist - Title.flac"]);
        assert_eq!(outcome.download_dir, dir.path());
        assert!(dir.path().join("Artist - Title.flac").exists());
        assert_eq!(h.registry.calls.count(), 0);
        assert_eq!(h.lyrics.calls.count(), 0);
        assert_eq!(h.tags.write_count(), 0);
        assert_eq!(leftover_work_dirs(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_invocation_targets_work_dir() {
        let dir = tempdir().unwrap();
        let h = harness(
            dir.path(),
            one_file(),
            MockTags::default(),
            MockRegistry::no_matches(),
            MockLyrics::no_matches(),
        );

        let request = DownloadRequest {
            url: "  https://example.com/track  ".into(),
            ..mock_download_request()
        };
        h.pipeline.run(&request).await.unwrap();

        let call = h.downloader.last_call().unwrap();
        assert_eq!(call.url, "https://example.com/track");
        assert!(call.work_dir.starts_with(dir.path()));
        assert!(call.args.contains(&"flac".to_string()));
    }

    #[tokio::test]
    async fn test_registry_without_hits_skips_tag_write() {
        let dir = tempdir().unwrap();
        let h = harness(
            dir.path(),
            one_file(),
            MockTags::default(),
            MockRegistry::no_matches(),
            MockLyrics::no_matches(),
        );

        let request = DownloadRequest {
            embed_musicbrainz_metadata: true,
            ..mock_download_request()
        };
        let outcome = h.pipeline.run(&request).await.unwrap();

        assert_eq!(outcome.files, vec!["Artist - Title.flac"]);
        assert_eq!(h.registry.calls.count(), 1);
        assert_eq!(h.tags.write_count(), 0);
    }

    #[tokio::test]
    async fn test_registry_hit_is_written_using_tag_values() {
        let dir = tempdir().unwrap();
        let tags = MockTags::with(
            "Artist - Title.flac",
            TrackMetadata {
                title: "Title".into(),
                artist: "Artist".into(),
                ..TrackMetadata::fallback("Artist - Title.flac")
            },
        );
        let found = EnrichmentResult {
            album: Some("Album".into()),
            year: Some(2001),
            ..Default::default()
        };
        let h = harness(
            dir.path(),
            one_file(),
            tags,
            MockRegistry::with_result(found),
            MockLyrics::with_lyrics("words"),
        );

        let request = DownloadRequest {
            embed_musicbrainz_metadata: true,
            download_lyrics: true,
            ..mock_download_request()
        };
        h.pipeline.run(&request).await.unwrap();

        assert_eq!(h.registry.calls.last(), Some(("Artist".into(), "Title".into())));
        let writes = h.tags.writes.lock().unwrap().clone();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1.album.as_deref(), Some("Album"));
        assert_eq!(h.tags.lyrics_count(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_tags_fall_back_to_placeholders() {
        let dir = tempdir().unwrap();
        let h = harness(
            dir.path(),
            one_file(),
            MockTags::default(),
            MockRegistry::no_matches(),
            MockLyrics::no_matches(),
        );

        let request = DownloadRequest {
            download_lyrics: true,
            ..mock_download_request()
        };
        let outcome = h.pipeline.run(&request).await.unwrap();

        assert_eq!(outcome.files.len(), 1);
        assert_eq!(
            h.lyrics.calls.last(),
            Some(("Unknown Artist".into(), "Artist - Title".into()))
        );
        assert_eq!(h.tags.lyrics_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_download_cleans_up_and_persists_nothing() {
        let dir = tempdir().unwrap();
        let mut downloader = MockDownloader::failing("ERROR: Unsupported URL");
        downloader.files = vec![("partial.mp3".into(), b"x".to_vec())];
        let h = harness(
            dir.path(),
            downloader,
            MockTags::default(),
            MockRegistry::no_matches(),
            MockLyrics::no_matches(),
        );

        let err = h.pipeline.run(&mock_download_request()).await.unwrap_err();

        match err {
            Error::DownloadFailed { stderr } => assert_eq!(stderr, "ERROR: Unsupported URL"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dir.path().join("partial.mp3").exists());
        assert_eq!(leftover_work_dirs(dir.path()), 0);
    }

    /// Tag store whose writes delete one file, as if it vanished mid-request
    struct VanishingTags {
        victim: &'static str,
    }

    #[async_trait::async_trait]
    impl TagStore for VanishingTags {
        async fn read(&self, path: &Path) -> Result<TrackMetadata> {
            Err(Error::metadata(path, "no tags"))
        }

        async fn write(&self, path: &Path, _update: &TagUpdate) -> Result<WriteResult> {
            if path.file_name().is_some_and(|n| n == self.victim) {
                std::fs::remove_file(path)?;
            }
            Ok(WriteResult { fields_updated: 1 })
        }

        async fn write_lyrics(&self, _path: &Path, _lyrics: &str) -> Result<WriteResult> {
            Ok(WriteResult { fields_updated: 0 })
        }
    }

    #[tokio::test]
    async fn test_failure_while_storing_persists_nothing() {
        let dir = tempdir().unwrap();
        let downloader = Arc::new(MockDownloader::dropping(vec![
            ("a.mp3".into(), b"a".to_vec()),
            ("b.mp3".into(), b"b".to_vec()),
            ("c.mp3".into(), b"c".to_vec()),
        ]));
        let found = EnrichmentResult {
            album: Some("Album".into()),
            ..Default::default()
        };
        let enrichment = EnrichmentService::new(
            Arc::new(MockRegistry::with_result(found)),
            Arc::new(MockLyrics::no_matches()),
            None,
        );
        let pipeline = Pipeline::new(
            downloader,
            Arc::new(VanishingTags { victim: "b.mp3" }),
            enrichment,
            dir.path(),
        );

        let request = DownloadRequest {
            embed_musicbrainz_metadata: true,
            ..mock_download_request()
        };
        let err = pipeline.run(&request).await.unwrap_err();

        assert!(matches!(err, Error::FileOperation { .. }));
        let left: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name())
            .collect();
        assert!(left.is_empty(), "files left behind: {left:?}");
    }

    #[tokio::test]
    async fn test_empty_url_fails_before_download() {
        let dir = tempdir().unwrap();
        let h = harness(
            dir.path(),
            one_file(),
            MockTags::default(),
            MockRegistry::no_matches(),
            MockLyrics::no_matches(),
        );

        let request = DownloadRequest::new("   ");
        let err = h.pipeline.run(&request).await.unwrap_err();

        assert!(matches!(err, Error::Validation(ref m) if m == "URL is required"));
        assert_eq!(h.downloader.call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_audio_output_is_ignored() {
        let dir = tempdir().unwrap();
        let downloader = MockDownloader::dropping(vec![
            ("cover.jpg".into(), b"jpg".to_vec()),
            ("notes.txt".into(), b"txt".to_vec()),
        ]);
        let h = harness(
            dir.path(),
            downloader,
            MockTags::default(),
            MockRegistry::no_matches(),
            MockLyrics::no_matches(),
        );

        let outcome = h.pipeline.run(&mock_download_request()).await.unwrap();
        assert!(outcome.files.is_empty());
        assert_eq!(leftover_work_dirs(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_repeat_download_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let h = harness(
            dir.path(),
            one_file(),
            MockTags::default(),
            MockRegistry::no_matches(),
            MockLyrics::no_matches(),
        );

        h.pipeline.run(&mock_download_request()).await.unwrap();
        let second = h.pipeline.run(&mock_download_request()).await.unwrap();

        assert_eq!(second.files, vec!["Artist - Title (1).flac"]);
        assert!(dir.path().join("Artist - Title.flac").exists());
    }
}
