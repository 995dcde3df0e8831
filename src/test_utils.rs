//! Test utilities and fixtures for music-ripper tests.
//!
//! This module provides common test helpers and request factories to
//! reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use music_ripper::test_utils::{write_silent_wav, mock_download_request};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let dir = tempfile::tempdir().unwrap();
//!     write_silent_wav(&dir.path().join("a.wav"), 1);
//!     let request = mock_download_request();
//!     // ... test logic
//! }
//! ```

use std::path::Path;

use crate::model::{AudioFormat, DownloadRequest, TransferRequest};

const SAMPLE_RATE: u32 = 8_000;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Writes a valid, untagged PCM WAV file of `seconds` silence.
///
/// Small enough to create per test, real enough for lofty to read and tag.
pub fn write_silent_wav(path: &Path, seconds: u32) {
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = SAMPLE_RATE * u32::from(block_align);
    let data_len = byte_rate * seconds;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&CHANNELS.to_le_bytes());
    bytes.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(bytes.len() + data_len as usize, 0);

    std::fs::write(path, bytes).expect("Failed to write WAV fixture");
}

/// Creates a download request with the settings most tests want.
///
/// Enrichment is off; customize with struct update syntax:
///
/// ```ignore
/// let request = DownloadRequest {
///     download_lyrics: true,
///     ..mock_download_request()
/// };
/// ```
pub fn mock_download_request() -> DownloadRequest {
    DownloadRequest {
        audio_format: AudioFormat::Flac,
        ..DownloadRequest::new("https://example.com/track")
    }
}

/// Creates a transfer request targeting a fake host.
pub fn mock_transfer_request() -> TransferRequest {
    TransferRequest {
        server_user: Some("music".to_string()),
        server_host: Some("nas.local".to_string()),
        server_dir: Some("/srv/music".to_string()),
        server_pass: None,
    }
}

/// Creates placeholder files (not real audio) in `dir`.
pub fn touch_files(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"not really audio").expect("Failed to create test file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_fixture_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        write_silent_wav(&path, 1);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 44 + 16_000);
    }

    #[test]
    fn test_mock_download_request() {
        let request = mock_download_request();
        assert_eq!(request.url, "https://example.com/track");
        assert_eq!(request.audio_format, AudioFormat::Flac);
        assert!(!request.embed_musicbrainz_metadata);
        assert!(!request.download_lyrics);
    }
}
