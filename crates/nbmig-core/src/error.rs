//! Error types for nbmig Core
//!
//! Only run-level failures live here:
//! - Source listing unreachable on its first page
//! - Destination pre-check failure
//! - Snapshot file read, parse or write failure
//! - Unusable configuration
//!
//! Per-page, per-reference and per-object failures are logged and absorbed
//! where they happen.

use nbmig_client::ClientError;
use std::path::PathBuf;

/// Fatal migration error
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// First page of a source listing could not be fetched
    #[error("failed to fetch {url}: {source}")]
    SourceFetch {
        url: String,
        #[source]
        source: ClientError,
    },

    /// Listing page is not a `{results, next}` object
    #[error("malformed listing page from {url}: {source}")]
    MalformedPage {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Destination connectivity pre-check failed
    #[error("destination pre-check against {url} failed: {source}")]
    DestinationUnreachable {
        url: String,
        #[source]
        source: ClientError,
    },

    /// Snapshot file could not be read
    #[error("failed to read snapshot {}: {source}", .path.display())]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file is not a JSON array of records
    #[error("failed to parse snapshot {}: {source}", .path.display())]
    SnapshotParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot file could not be written
    #[error("failed to write snapshot {}: {source}", .path.display())]
    SnapshotWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Client could not be built
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl MigrateError {
    /// Create configuration error
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
