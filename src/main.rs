//! Music Ripper - download audio with yt-dlp, tag it, and ship it to a server.
//!
//! Runs as a web server by default (JSON API plus a small front-end), with
//! CLI subcommands for one-shot downloads, transfers and tag edits.

pub mod cli;
pub mod config;
pub mod downloader;
pub mod enrichment;
pub mod error;
pub mod library;
pub mod metadata;
pub mod model;
pub mod pipeline;
pub mod process;
pub mod scanner;
pub mod server;
#[cfg(test)]
pub mod test_utils;
pub mod transfer;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("music_ripper=info".parse()?))
        .init();

    let config = config::load(args.config.as_deref());
    cli::run_command(&args, config)
}
