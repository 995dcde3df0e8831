//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum, one variant per failure
//!   kind the HTTP surface distinguishes
//! - Module-specific errors (e.g., [`EnrichmentError`]) for detailed handling
//! - [`Error::status`] maps each kind onto an HTTP status code; the axum
//!   `IntoResponse` impl renders `{ error, details }` bodies
//!
//! [`EnrichmentError`]: crate::enrichment::EnrichmentError

use std::path::PathBuf;
use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed required input
    #[error("{0}")]
    Validation(String),

    /// The external downloader exited non-zero
    #[error("Download failed: {stderr}")]
    DownloadFailed { stderr: String },

    /// The secure-copy process exited non-zero
    #[error("Transfer failed: {stderr}")]
    TransferFailed { stderr: String },

    /// Directory creation, copy, or cleanup failure
    #[error("{context}: {source}")]
    FileOperation {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A filename tried to climb out of the download directory
    #[error("Invalid filename")]
    PathTraversal,

    /// A resolved path escaped the directory it must stay in
    #[error("Access denied")]
    AccessDenied,

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// A lookup completed but had nothing for the request
    #[error("{0}")]
    NoData(String),

    /// Metadata reading/writing error
    #[error("Metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Enrichment lookup error (only surfaced by on-demand imports)
    #[error("Enrichment error: {0}")]
    Enrichment(#[from] crate::enrichment::EnrichmentError),

    /// An external tool ran past its deadline and was killed
    #[error("{tool} timed out after {}s", after.as_secs())]
    Timeout { tool: String, after: Duration },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error without further context
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::PathTraversal => StatusCode::BAD_REQUEST,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::NotFound(_) | Self::NoData(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, user-facing summary used as the `error` field of responses.
    pub fn summary(&self) -> String {
        match self {
            Self::Validation(message) | Self::NoData(message) => message.clone(),
            Self::DownloadFailed { .. } => "Download failed".to_string(),
            Self::TransferFailed { .. } => "Transfer failed".to_string(),
            Self::FileOperation { .. } => "Failed to move files".to_string(),
            Self::PathTraversal => "Invalid filename".to_string(),
            Self::AccessDenied => "Access denied".to_string(),
            Self::NotFound(_) => "File not found".to_string(),
            Self::Timeout { tool, .. } => format!("{} timed out", tool),
            _ => "Server error".to_string(),
        }
    }

    /// Extra detail for the `details` field, including external tool stderr verbatim.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Validation(_)
            | Self::PathTraversal
            | Self::AccessDenied
            | Self::NotFound(_)
            | Self::NoData(_) => None,
            Self::DownloadFailed { stderr } | Self::TransferFailed { stderr } => {
                Some(stderr.clone())
            }
            other => Some(other.to_string()),
        }
    }
}

/// JSON error body: `{ "error": ..., "details": ... }`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        let body = ErrorBody {
            error: self.summary(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|source| Error::FileOperation {
            context: ctx.into(),
            source,
        })
    }
}
