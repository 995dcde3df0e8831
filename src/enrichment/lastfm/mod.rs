//! Last.fm track-info integration
//!
//! Supplies album, year, genre and duration for the on-demand import of a
//! single library file. Gated by an API key.

pub mod dto;
mod adapter;
mod client;

pub use adapter::to_enrichment;
pub use client::LastFmClient;
