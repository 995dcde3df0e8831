//! Configuration system using TOML files plus environment overrides.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\music-ripper\config.toml
//! - macOS: ~/Library/Application Support/music-ripper/config.toml
//! - Linux: ~/.config/music-ripper/config.toml
//!
//! The file is optional. After it is read, the deployment environment
//! variables (`PORT`, `MUSICBRAINZ_USER_AGENT`, `LASTFM_API_KEY`,
//! `DOWNLOAD_DIR`, `ALLOWED_ORIGINS`) are layered on top. The resulting
//! [`Config`] is built once in `main` and handed to every component.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// API credentials (keep separate for potential future encryption)
    pub credentials: Credentials,

    /// MusicBrainz registry settings
    pub musicbrainz: MusicBrainzConfig,

    /// Lyrics service settings
    pub lyrics: LyricsConfig,

    /// Last.fm track-info service settings
    pub lastfm: LastFmConfig,

    /// Persistent download store
    pub library: LibraryConfig,

    /// External tools (downloader, secure copy)
    pub tools: ToolsConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub bind_address: String,
    /// Origins allowed for cross-origin requests (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Directory holding the bundled front-end
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
            allowed_origins: Vec::new(),
            public_dir: PathBuf::from("public"),
        }
    }
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Last.fm API key for track.getInfo lookups
    pub lastfm_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicBrainzConfig {
    /// MusicBrainz rejects requests without an identifying User-Agent
    pub user_agent: String,
    pub base_url: String,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!(
                "MusicRipper/",
                env!("CARGO_PKG_VERSION"),
                " ( https://github.com/music-ripper )"
            )
            .to_string(),
            base_url: "https://musicbrainz.org/ws/2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    pub base_url: String,
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.lyrics.ovh/v1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LastFmConfig {
    pub base_url: String,
}

impl Default for LastFmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ws.audioscrobbler.com/2.0/".to_string(),
        }
    }
}

/// Persistent download store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub download_dir: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("./downloads"),
        }
    }
}

/// External tool locations and deadlines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ytdlp_path: PathBuf,
    pub scp_path: PathBuf,
    pub sshpass_path: PathBuf,
    pub download_timeout_secs: u64,
    pub transfer_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: PathBuf::from("yt-dlp"),
            scp_path: PathBuf::from("scp"),
            sshpass_path: PathBuf::from("sshpass"),
            download_timeout_secs: 30 * 60,
            transfer_timeout_secs: 60 * 60,
        }
    }
}

impl ToolsConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }
}

impl Config {
    /// Layer environment overrides on top of this config.
    ///
    /// `lookup` stands in for `std::env::var` so tests can supply a map.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value {:?}", port),
            }
        }
        if let Some(agent) = lookup("MUSICBRAINZ_USER_AGENT").filter(|s| !s.trim().is_empty()) {
            self.musicbrainz.user_agent = agent;
        }
        if let Some(key) = lookup("LASTFM_API_KEY").filter(|s| !s.trim().is_empty()) {
            self.credentials.lastfm_api_key = Some(key);
        }
        if let Some(dir) = lookup("DOWNLOAD_DIR").filter(|s| !s.trim().is_empty()) {
            self.library.download_dir = PathBuf::from(dir);
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        self
    }

    /// The Last.fm key, if one is configured and non-empty.
    pub fn lastfm_api_key(&self) -> Option<&str> {
        self.credentials
            .lastfm_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("music-ripper"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration for this process: file (explicit or default path),
/// then the real process environment.
pub fn load(explicit: Option<&Path>) -> Config {
    let from_file = match explicit.map(Path::to_path_buf).or_else(config_path) {
        Some(path) => load_file(&path),
        None => {
            tracing::warn!("Could not determine config directory, using defaults");
            Config::default()
        }
    };
    from_file.apply_env(|name| std::env::var(name).ok())
}

/// Load configuration from a TOML file
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load_file(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match parse(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Parse a TOML document into a config
pub fn parse(contents: &str) -> Result<Config, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(toml::de::Error),
}

// ============================================================================
// Tests
// ============================================================================
