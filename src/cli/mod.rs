//! Command-line interface for music-ripper.
//!
//! This module provides the `serve` entry point plus one-shot commands for
//! downloading, transferring and inspecting the library without the web UI.

mod commands;

pub use commands::{Cli, Commands, run_command};
