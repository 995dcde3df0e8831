//! Async seam over the blocking lofty reader/writer.
//!
//! lofty does synchronous file IO, so the production store moves each
//! call onto tokio's blocking pool. Tests swap in a recording mock.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{TagUpdate, TrackMetadata, WriteResult};
use crate::error::{Error, Result};

/// Tag reader/writer used by the pipeline and the library endpoints.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Parse the file's tags.
    async fn read(&self, path: &Path) -> Result<TrackMetadata>;

    /// Merge `update` onto the existing tags.
    async fn write(&self, path: &Path, update: &TagUpdate) -> Result<WriteResult>;

    /// Embed lyrics.
    async fn write_lyrics(&self, path: &Path, lyrics: &str) -> Result<WriteResult>;
}

/// [`TagStore`] backed by lofty
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTags;

async fn blocking<T, F>(path: &Path, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(PathBuf) -> Result<T> + Send + 'static,
{
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || job(owned))
        .await
        .map_err(|e| Error::metadata(path, format!("Tag task failed: {}", e)))?
}

#[async_trait]
impl TagStore for LoftyTags {
    async fn read(&self, path: &Path) -> Result<TrackMetadata> {
        blocking(path, |p| super::read(&p)).await
    }

    async fn write(&self, path: &Path, update: &TagUpdate) -> Result<WriteResult> {
        let update = update.clone();
        blocking(path, move |p| super::write(&p, &update)).await
    }

    async fn write_lyrics(&self, path: &Path, lyrics: &str) -> Result<WriteResult> {
        let lyrics = lyrics.to_string();
        blocking(path, move |p| super::write_lyrics(&p, &lyrics)).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_silent_wav;

    #[tokio::test]
    async fn test_lofty_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.wav");
        write_silent_wav(&path, 2);

        let store = LoftyTags;
        store
            .write(
                &path,
                &TagUpdate {
                    artist: Some("Band".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let meta = store.read(&path).await.unwrap();
        assert_eq!(meta.artist, "Band");
        assert_eq!(meta.title, "track");
        assert_eq!(meta.duration, 2);
    }

    #[tokio::test]
    async fn test_lofty_store_missing_file() {
        let result = LoftyTags.read(Path::new("/nonexistent/file.mp3")).await;
        assert!(matches!(result, Err(Error::Metadata { .. })));
    }
}
