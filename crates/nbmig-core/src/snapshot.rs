//! Snapshot files
//!
//! A snapshot is a pretty-printed JSON array. Config context snapshots hold
//! raw source listing items, local context snapshots hold
//! [`nbmig_model::LocalContextEntry`] records.

use crate::error::MigrateError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Read every record from a snapshot file
pub async fn read_snapshot<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, MigrateError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| MigrateError::SnapshotRead {
            path: path.to_path_buf(),
            source,
        })?;
    let records: Vec<T> =
        serde_json::from_slice(&bytes).map_err(|source| MigrateError::SnapshotParse {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Write records to a snapshot file, replacing it
pub async fn write_snapshot<T: Serialize>(path: impl AsRef<Path>, records: &[T]) -> Result<(), MigrateError> {
    let path = path.as_ref();
    let write_error = |source| MigrateError::SnapshotWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut bytes = serde_json::to_vec_pretty(records)
        .map_err(|e| write_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    bytes.push(b'\n');
    tokio::fs::write(path, bytes).await.map_err(write_error)?;
    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
