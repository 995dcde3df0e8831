//! One-shot download from the terminal.

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::model::DownloadRequest;
use crate::server::AppState;

/// Download, optionally enrich, and store into the library
pub fn cmd_download(rt: &Runtime, config: &Config, request: &DownloadRequest) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;

    println!("Downloading {} as {}...", request.trimmed_url(), request.audio_format);
    if request.embed_musicbrainz_metadata {
        println!("  MusicBrainz tagging enabled");
    }
    if request.download_lyrics {
        println!("  Lyrics enabled");
    }

    match rt.block_on(state.pipeline.run(request)) {
        Ok(outcome) => {
            for file in &outcome.files {
                println!("  ✓ {}", file);
            }
            println!(
                "\nDownloaded {} files to {}",
                outcome.files.len(),
                outcome.download_dir.display()
            );
            Ok(())
        }
        Err(e) => {
            println!("✗ {}", e.summary());
            if let Some(details) = e.details() {
                eprintln!("{}", details.trim_end());
            }
            Err(e.into())
        }
    }
}
