//! Core request and file models.
//!
//! Defines the inputs accepted by the pipeline ([`DownloadRequest`],
//! [`TransferRequest`]) and the files it produces ([`TrackFile`]).
//! Request bodies use camelCase field names to match the front-end.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Audio container/codec extensions the pipeline recognises.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a", "wav", "aac", "ogg", "wma"];

/// Whether a file name carries one of the supported audio extensions (case-insensitive).
pub fn is_audio_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// File name without its final extension ("Artist - Title.flac" -> "Artist - Title").
pub fn title_from_filename(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string()
}

/// Target audio format passed to `--audio-format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Flac,
    M4a,
    Wav,
    Aac,
    Ogg,
    Wma,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
            Self::M4a => "m4a",
            Self::Wav => "wav",
            Self::Aac => "aac",
            Self::Ogg => "ogg",
            Self::Wma => "wma",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "flac" => Ok(Self::Flac),
            "m4a" => Ok(Self::M4a),
            "wav" => Ok(Self::Wav),
            "aac" => Ok(Self::Aac),
            "ogg" => Ok(Self::Ogg),
            "wma" => Ok(Self::Wma),
            other => Err(format!("unsupported audio format: {}", other)),
        }
    }
}

/// yt-dlp `--audio-quality` level: 0 (best) to 3 (low).
///
/// The front-end sends this as a string ("0"), other clients as a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AudioQuality(u8);

impl AudioQuality {
    pub const MAX: u8 = 3;

    pub fn new(level: u8) -> Option<Self> {
        (level <= Self::MAX).then_some(Self(level))
    }

    pub fn level(&self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for AudioQuality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Text(String),
        }

        let level = match Raw::deserialize(deserializer)? {
            Raw::Num(n) => n,
            Raw::Text(s) if s.trim().is_empty() => 0,
            Raw::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid audio quality {:?}", s)))?,
        };
        u8::try_from(level)
            .ok()
            .and_then(AudioQuality::new)
            .ok_or_else(|| serde::de::Error::custom(format!("audio quality {} out of range 0-3", level)))
    }
}

/// Format for extracted thumbnails (`--convert-thumbnails`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailFormat {
    #[default]
    Jpg,
    Png,
    Webp,
}

impl ThumbnailFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// One download request as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadRequest {
    pub url: String,
    pub is_playlist: bool,
    pub audio_format: AudioFormat,
    pub audio_quality: AudioQuality,
    /// Unset means "embed"
    pub embed_thumbnail: Option<bool>,
    /// Unset means "embed"
    pub embed_metadata: Option<bool>,
    pub extract_thumbnail: bool,
    pub thumbnail_format: ThumbnailFormat,
    pub download_subtitles: bool,
    /// Comma-separated language codes; empty means "en"
    pub subtitle_langs: String,
    /// Raw extra flags, whitespace separated, appended last
    pub custom_args: String,
    #[serde(alias = "embedMusicbrainz")]
    pub embed_musicbrainz_metadata: bool,
    pub download_lyrics: bool,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn embeds_thumbnail(&self) -> bool {
        self.embed_thumbnail.unwrap_or(true)
    }

    pub fn embeds_metadata(&self) -> bool {
        self.embed_metadata.unwrap_or(true)
    }

    /// The URL with surrounding whitespace removed.
    pub fn trimmed_url(&self) -> &str {
        self.url.trim()
    }
}

/// One produced audio file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackFile {
    pub name: String,
    pub path: PathBuf,
}

impl TrackFile {
    pub fn new(dir: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: dir.join(&name),
            name,
        }
    }
}

/// Remote copy request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferRequest {
    pub server_user: Option<String>,
    pub server_host: Option<String>,
    pub server_dir: Option<String>,
    pub server_pass: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file("song.mp3"));
        assert!(is_audio_file("Artist - Title.flac"));
        assert!(is_audio_file("LOUD.OGG"));
        assert!(!is_audio_file("cover.jpg"));
        assert!(!is_audio_file("notes.txt"));
        assert!(!is_audio_file("mp3"));
        assert!(!is_audio_file("track.mp3.part"));
    }

    #[test]
    fn test_title_from_filename() {
        assert_eq!(title_from_filename("Artist - Title.flac"), "Artist - Title");
        assert_eq!(title_from_filename("a.b.mp3"), "a.b");
        assert_eq!(title_from_filename("noext"), "noext");
    }

    #[test]
    fn test_request_defaults() {
        let req: DownloadRequest = serde_json::from_str(r#"{"url": "https://x"}"#).unwrap();
        assert_eq!(req.audio_format, AudioFormat::Mp3);
        assert_eq!(req.audio_quality.level(), 0);
        assert!(req.embeds_thumbnail());
        assert!(req.embeds_metadata());
        assert!(!req.is_playlist);
        assert!(!req.embed_musicbrainz_metadata);
    }

    #[test]
    fn test_request_from_frontend_body() {
        let json = r#"{
            "url": "https://example.com/track",
            "isPlaylist": true,
            "audioFormat": "flac",
            "audioQuality": "2",
            "embedThumbnail": false,
            "embedMetadata": true,
            "extractThumbnail": true,
            "thumbnailFormat": "png",
            "downloadSubtitles": false,
            "subtitleLangs": "en,de",
            "customArgs": "--limit-rate 1M",
            "embedMusicbrainz": true,
            "downloadLyrics": true
        }"#;
        let req: DownloadRequest = serde_json::from_str(json).unwrap();
        assert!(req.is_playlist);
        assert_eq!(req.audio_format, AudioFormat::Flac);
        assert_eq!(req.audio_quality.level(), 2);
        assert!(!req.embeds_thumbnail());
        assert_eq!(req.thumbnail_format, ThumbnailFormat::Png);
        assert!(req.embed_musicbrainz_metadata);
        assert!(req.download_lyrics);
    }

    #[test]
    fn test_quality_accepts_numbers_and_rejects_out_of_range() {
        let req: DownloadRequest =
            serde_json::from_str(r#"{"url": "u", "audioQuality": 3}"#).unwrap();
        assert_eq!(req.audio_quality.level(), 3);

        assert!(serde_json::from_str::<DownloadRequest>(r#"{"audioQuality": 7}"#).is_err());
        assert!(serde_json::from_str::<DownloadRequest>(r#"{"audioQuality": "best"}"#).is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(serde_json::from_str::<DownloadRequest>(r#"{"audioFormat": "opus"}"#).is_err());
        assert_eq!("FLAC".parse::<AudioFormat>(), Ok(AudioFormat::Flac));
    }

    #[test]
    fn test_transfer_request_optional_password() {
        let req: TransferRequest = serde_json::from_str(
            r#"{"serverUser": "pi", "serverHost": "nas.local", "serverDir": "/music"}"#,
        )
        .unwrap();
        assert_eq!(req.server_user.as_deref(), Some("pi"));
        assert!(req.server_pass.is_none());
    }
}
