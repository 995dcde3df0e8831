//! yt-dlp argument construction.
//!
//! Flags are emitted in a fixed order so that the raw `customArgs` tokens
//! always come last and can override anything before them.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::DownloadRequest;

/// Output filename template, relative to the per-request working directory.
pub const OUTPUT_TEMPLATE: &str = "%(artist)s - %(title)s.%(ext)s";

/// Default subtitle language when none is given.
const DEFAULT_SUBTITLE_LANGS: &str = "en";

/// Build the downloader flags for a request.
///
/// The URL itself is not part of the result; the invoker appends it after a
/// `--` separator. Fails fast on an empty or whitespace-only URL.
pub fn build_args(request: &DownloadRequest, output_dir: &Path) -> Result<Vec<String>> {
    if request.trimmed_url().is_empty() {
        return Err(Error::validation("URL is required"));
    }

    let mut args = vec![
        "-x".to_string(),
        "--audio-format".to_string(),
        request.audio_format.as_str().to_string(),
        "--audio-quality".to_string(),
        request.audio_quality.level().to_string(),
    ];

    if request.embeds_metadata() {
        args.push("--add-metadata".to_string());
    }

    if request.embeds_thumbnail() {
        args.push("--embed-thumbnail".to_string());
    }

    if request.extract_thumbnail {
        args.push("--write-thumbnail".to_string());
        args.push("--convert-thumbnails".to_string());
        args.push(request.thumbnail_format.as_str().to_string());
    }

    if request.download_subtitles {
        let langs = request.subtitle_langs.trim();
        args.push("--write-sub".to_string());
        args.push("--sub-lang".to_string());
        args.push(if langs.is_empty() {
            DEFAULT_SUBTITLE_LANGS.to_string()
        } else {
            langs.to_string()
        });
    }

    args.push("-o".to_string());
    args.push(output_dir.join(OUTPUT_TEMPLATE).to_string_lossy().into_owned());

    args.push(if request.is_playlist {
        "--yes-playlist".to_string()
    } else {
        "--no-playlist".to_string()
    });

    args.extend(request.custom_args.split_whitespace().map(String::from));

    Ok(args)
}
