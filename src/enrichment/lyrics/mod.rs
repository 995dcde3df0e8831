//! lyrics.ovh integration
//!
//! Plain-text lyrics looked up by artist and title. No API key required.
//!
//! API: https://lyricsovh.docs.apiary.io

pub mod dto;
mod client;

pub use client::LyricsClient;
