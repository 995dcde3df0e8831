//! MusicBrainz API integration
//!
//! The canonical metadata registry: a recording search by artist + title
//! followed by a detail lookup of the first hit.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

pub mod dto;
mod adapter;
mod client;

pub use adapter::to_enrichment;
pub use client::MusicBrainzClient;
