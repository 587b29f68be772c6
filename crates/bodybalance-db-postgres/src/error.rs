//! Error translation for the PostgreSQL storage backend.

use sqlx_core::error::Error as SqlxError;

use bodybalance_storage::StorageError;

/// Translates a sqlx error into the storage-layer taxonomy.
///
/// `RowNotFound` is deliberately absent here: the query sites decide which
/// dimension a missing row maps to, so by the time an error reaches this
/// function it is infrastructure, not domain.
pub fn storage_error(err: SqlxError) -> StorageError {
    match err {
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
            StorageError::connection(err.to_string())
        }
        other => StorageError::internal(other.to_string()),
    }
}
