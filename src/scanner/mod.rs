use std::path::Path;

use crate::error::{ResultExt, Result};
use crate::model::{TrackFile, is_audio_file};

/// Lists the audio files directly inside `dir` (non-recursive).
///
/// Supported extensions: mp3, flac, m4a, wav, aac, ogg, wma (case-insensitive).
/// Order follows the directory listing and is not stable across platforms.
/// An empty directory yields an empty list, not an error.
pub async fn scan(dir: &Path) -> Result<Vec<TrackFile>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(format!("Failed to list {}", dir.display()))?;

    let mut tracks = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(format!("Failed to list {}", dir.display()))?
    {
        let Ok(file_type) = entry.file_type().await else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }
        // Names that are not valid UTF-8 cannot be reported back over JSON.
        let Some(name) = entry.file_name().to_str().map(String::from) else {
            tracing::warn!("Skipping non-UTF-8 file name in {}", dir.display());
            continue;
        };
        if is_audio_file(&name) {
            tracks.push(TrackFile::new(dir, name));
        }
    }

    Ok(tracks)
}

/// Like [`scan`] but returns names only, sorted for stable presentation.
pub async fn audio_names_sorted(dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = scan(dir).await?.into_iter().map(|t| t.name).collect();
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use std::fs::File;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_scan_audio_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        File::create(root.join("song.mp3")).unwrap();
        File::create(root.join("music.flac")).unwrap();
        File::create(root.join("notes.txt")).unwrap(); // Should be ignored
        File::create(root.join("cover.jpg")).unwrap(); // Should be ignored
        File::create(root.join("UPPERCASE.OGG")).unwrap(); // Should be found (case-insensitive)
        File::create(root.join("Artist - Title.webm.part")).unwrap(); // In-progress download

        // Subdirectories are not descended into
        let subdir = root.join("nested.mp3");
        std::fs::create_dir(&subdir).unwrap();
        File::create(subdir.join("track.wav")).unwrap();

        let tracks = scan(root).await.unwrap();
        let names: BTreeSet<String> = tracks.iter().map(|t| t.name.clone()).collect();

        assert_eq!(
            names,
            ["song.mp3", "music.flac", "UPPERCASE.OGG"]
                .into_iter()
                .map(String::from)
                .collect()
        );
        for track in &tracks {
            assert_eq!(track.path, root.join(&track.name));
        }
    }

    #[tokio::test]
    async fn test_empty_directory_is_not_an_error() {
        let dir = tempdir().unwrap();
        assert!(scan(dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_is_file_operation_error() {
        let dir = tempdir().unwrap();
        let err = scan(&dir.path().join("gone")).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::FileOperation { .. }));
    }

    #[tokio::test]
    async fn test_sorted_names() {
        let dir = tempdir().unwrap();
        for name in ["b.mp3", "a.flac", "c.wav"] {
            File::create(dir.path().join(name)).unwrap();
        }
        assert_eq!(
            audio_names_sorted(dir.path()).await.unwrap(),
            vec!["a.flac", "b.mp3", "c.wav"]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_scan_is_complete_and_filtered(
            stems in prop::collection::btree_set("[a-z0-9]{1,8}", 0..12),
            exts in prop::collection::vec(
                prop::sample::select(vec!["mp3", "flac", "m4a", "wav", "aac", "ogg", "wma", "txt", "jpg", "part", "webm"]),
                12,
            ),
        ) {
            let dir = tempdir().unwrap();
            let mut expected = BTreeSet::new();
            for (stem, ext) in stems.iter().zip(exts.iter()) {
                let name = format!("{stem}.{ext}");
                File::create(dir.path().join(&name)).unwrap();
                if crate::model::AUDIO_EXTENSIONS.contains(ext) {
                    expected.insert(name);
                }
            }

            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let tracks = rt.block_on(scan(dir.path())).unwrap();
            let names: Vec<String> = tracks.into_iter().map(|t| t.name).collect();
            let unique: BTreeSet<String> = names.iter().cloned().collect();

            prop_assert_eq!(unique.len(), names.len());
            prop_assert_eq!(unique, expected);
        }
    }
}
