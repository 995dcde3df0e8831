//! Moving finished tracks into the persistent download directory.
//!
//! A name is claimed with create-new semantics before anything is moved, so
//! two requests finishing at the same time never overwrite each other:
//! the loser gets `<stem> (N).<ext>`.
//!
//! A batch is all or nothing: if one file cannot be stored, the ones
//! already stored for that batch are removed again.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result, ResultExt};
use crate::model::TrackFile;

/// Highest `(N)` suffix tried before giving up
const MAX_SUFFIX: u32 = 9_999;

/// Move `src` into `dest_dir` under `name` or the first free numbered variant.
///
/// Returns the stored file name.
pub async fn store_unique(src: &Path, dest_dir: &Path, name: &str) -> Result<String> {
    for n in 0..=MAX_SUFFIX {
        let candidate = numbered(name, n);
        let dest = dest_dir.join(&candidate);

        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&dest)
            .await
        {
            Ok(claimed) => {
                drop(claimed);
                if let Err(e) = move_file(src, &dest).await {
                    // Release the claim so the name is not left as an empty file
                    discard(&dest).await;
                    return Err(e);
                }
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(format!("Failed to create {}", dest.display()));
            }
        }
    }

    Err(Error::FileOperation {
        context: format!("No free file name for {}", name),
        source: std::io::Error::from(ErrorKind::AlreadyExists),
    })
}

/// Store every track in `dest_dir`, returning the stored names in order.
///
/// On failure nothing from this batch remains in `dest_dir`.
pub async fn store_all(tracks: &[TrackFile], dest_dir: &Path) -> Result<Vec<String>> {
    let mut stored: Vec<String> = Vec::with_capacity(tracks.len());

    for track in tracks {
        match store_unique(&track.path, dest_dir, &track.name).await {
            Ok(name) => {
                if name != track.name {
                    tracing::info!(original = %track.name, stored = %name, "Name taken, stored under new name");
                }
                stored.push(name);
            }
            Err(e) => {
                tracing::warn!(
                    file = %track.name,
                    rolled_back = stored.len(),
                    "Storing failed, removing files already stored for this request"
                );
                for name in &stored {
                    discard(&dest_dir.join(name)).await;
                }
                return Err(e);
            }
        }
    }

    Ok(stored)
}

/// Remove a file we created, logging instead of failing.
async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove stored file");
    }
}

/// `name` for 0, otherwise `<stem> (n).<ext>`
pub fn numbered(name: &str, n: u32) -> String {
    if n == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, n, ext),
        _ => format!("{} ({})", name, n),
    }
}

async fn move_file(src: &Path, dest: &Path) -> Result<()> {
    // Rename replaces the claimed placeholder; fall back to copy across devices
    if tokio::fs::rename(src, dest).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(src, dest)
        .await
        .with_context(format!("Failed to copy file to: {}", dest.display()))?;
    Ok(())
}
