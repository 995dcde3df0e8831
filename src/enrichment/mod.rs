//! Music enrichment module - fetches supplementary metadata from external services.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`musicbrainz/dto.rs`, `lyrics/dto.rs`, `lastfm/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs
//! - **Traits** - Seams for swapping clients with mocks
//! - **Service** - Soft-fail facade used by the download pipeline and the library
//!
//! # Usage
//!
//! ```ignore
//! let service = EnrichmentService::from_config(&config)?;
//!
//! if let Some(found) = service.registry_metadata("Queen", "Bohemian Rhapsody").await {
//!     println!("Album: {:?}", found.album);
//! }
//! ```

pub mod domain;
pub mod lastfm;
pub mod lyrics;
pub mod musicbrainz;
pub mod service;
pub mod traits;

pub use domain::{EnrichmentError, EnrichmentResult, EnrichmentSource, ExternalIds};
pub use service::EnrichmentService;
