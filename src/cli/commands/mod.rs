//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `serve`: the HTTP server (also the default with no subcommand)
//! - `download`: one download request run from the terminal
//! - `transfer`: copy the library to a remote host
//! - `library`: listing, searching and tag edits
//! - `tools`: external tool checks

mod download;
mod library;
mod serve;
mod tools;
mod transfer;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::library::MetadataUpdate;
use crate::model::{AudioFormat, AudioQuality, DownloadRequest, TransferRequest};

pub use download::cmd_download;
pub use library::{cmd_import_lastfm, cmd_list, cmd_tag};
pub use serve::cmd_serve;
pub use tools::cmd_check_tools;
pub use transfer::cmd_transfer;

/// Music Ripper CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the OS config directory)
    #[arg(long, global = true, env = "MUSIC_RIPPER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Download audio from a URL into the library
    Download {
        /// Video or playlist URL
        url: String,
        /// Target audio format
        #[arg(short, long, default_value = "mp3")]
        format: AudioFormat,
        /// Audio quality, 0 (best) to 3
        #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
        quality: u8,
        /// Download the whole playlist
        #[arg(long)]
        playlist: bool,
        /// Tag files with MusicBrainz metadata
        #[arg(long)]
        musicbrainz: bool,
        /// Embed lyrics from lyrics.ovh
        #[arg(long)]
        lyrics: bool,
        /// Extra yt-dlp flags, whitespace separated
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        custom_args: String,
    },
    /// Copy every library file to a remote host over scp
    Transfer {
        /// Remote user
        #[arg(short, long)]
        user: String,
        /// Remote host
        #[arg(long)]
        host: String,
        /// Remote directory
        #[arg(short, long)]
        dir: String,
        /// Password (uses sshpass; or set SERVER_PASS env var)
        #[arg(long, env = "SERVER_PASS", hide_env_values = true)]
        password: Option<String>,
    },
    /// List library files with their tags
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Files per page
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        /// Only files whose name, title, artist or album contains this
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Edit tags of one library file
    Tag {
        /// File name inside the download directory
        file: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        album: Option<String>,
        #[arg(long)]
        year: Option<u32>,
        #[arg(long)]
        genre: Option<String>,
    },
    /// Merge Last.fm track info into one library file
    ImportLastfm {
        /// File name inside the download directory
        file: String,
    },
    /// Check that yt-dlp, scp and sshpass are installed
    CheckTools,
}

/// Run the specified CLI command; with none, start the server.
pub fn run_command(cli: &Cli, config: Config) -> anyhow::Result<()> {
    let rt = Runtime::new()?;

    match &cli.command {
        None => cmd_serve(&rt, config, None),
        Some(Commands::Serve { port }) => cmd_serve(&rt, config, *port),
        Some(Commands::Download {
            url,
            format,
            quality,
            playlist,
            musicbrainz,
            lyrics,
            custom_args,
        }) => {
            let request = DownloadRequest {
                is_playlist: *playlist,
                audio_format: *format,
                audio_quality: AudioQuality::new(*quality).unwrap_or_default(),
                custom_args: custom_args.clone(),
                embed_musicbrainz_metadata: *musicbrainz,
                download_lyrics: *lyrics,
                ..DownloadRequest::new(url.clone())
            };
            cmd_download(&rt, &config, &request)
        }
        Some(Commands::Transfer {
            user,
            host,
            dir,
            password,
        }) => {
            let request = TransferRequest {
                server_user: Some(user.clone()),
                server_host: Some(host.clone()),
                server_dir: Some(dir.clone()),
                server_pass: password.clone(),
            };
            cmd_transfer(&rt, &config, &request)
        }
        Some(Commands::List {
            page,
            limit,
            search,
        }) => cmd_list(&rt, &config, *page, *limit, search.as_deref()),
        Some(Commands::Tag {
            file,
            title,
            artist,
            album,
            year,
            genre,
        }) => {
            let update = MetadataUpdate {
                title: title.clone(),
                artist: artist.clone(),
                album: album.clone(),
                year: *year,
                genre: genre.clone(),
            };
            cmd_tag(&rt, &config, file, &update)
        }
        Some(Commands::ImportLastfm { file }) => cmd_import_lastfm(&rt, &config, file),
        Some(Commands::CheckTools) => cmd_check_tools(&rt, &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["music-ripper"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_download_args() {
        let cli = Cli::try_parse_from([
            "music-ripper",
            "download",
            "https://example.com/track",
            "--format",
            "flac",
            "--quality",
            "2",
            "--musicbrainz",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Download {
                url,
                format,
                quality,
                musicbrainz,
                lyrics,
                ..
            }) => {
                assert_eq!(url, "https://example.com/track");
                assert_eq!(format, AudioFormat::Flac);
                assert_eq!(quality, 2);
                assert!(musicbrainz);
                assert!(!lyrics);
            }
            _ => panic!("expected download command"),
        }
    }

    #[test]
    fn test_quality_out_of_range_rejected() {
        let result = Cli::try_parse_from([
            "music-ripper",
            "download",
            "https://example.com/track",
            "--quality",
            "9",
        ]);
        assert!(result.is_err());
    }
}
