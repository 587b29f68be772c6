//! Error types for the storage abstraction layer.

use std::fmt;

/// The lookup dimension a not-found error is tagged with.
///
/// Each read is preceded by existence checks for every referenced dimension,
/// and the failing dimension is carried on the error so the serving layer can
/// map it to a precise outward response ("content type 999 not found" vs.
/// "category 7 not found").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    ContentType,
    Category,
    Video,
    Account,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentType => write!(f, "content type"),
            Self::Category => write!(f, "category"),
            Self::Video => write!(f, "video"),
            Self::Account => write!(f, "account"),
        }
    }
}

/// Errors that can occur against the durable primary store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A referenced dimension does not exist, or a read that passed all
    /// existence checks yielded zero rows.
    #[error("{dimension} not found: {detail}")]
    NotFound {
        /// Which dimension was missing.
        dimension: Dimension,
        /// Human-readable detail (ids involved).
        detail: String,
    },

    /// Failed to reach the storage backend.
    #[error("connection error: {message}")]
    Connection { message: String },

    /// Any other backend failure (bad row, query error).
    #[error("internal storage error: {message}")]
    Internal { message: String },
}

impl StorageError {
    /// Creates a new `NotFound` error tagged with the given dimension.
    #[must_use]
    pub fn not_found(dimension: Dimension, detail: impl Into<String>) -> Self {
        Self::NotFound {
            dimension,
            detail: detail.into(),
        }
    }

    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the missing dimension, if this is a not-found error.
    #[must_use]
    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            Self::NotFound { dimension, .. } => Some(*dimension),
            _ => None,
        }
    }
}

/// Errors that can occur against the cache backend.
///
/// A cache miss is *not* an error: [`ContentCache::get`] returns `Ok(None)`
/// for a missing key. These variants are reserved for transport and codec
/// failures, which the orchestration layer absorbs and logs.
///
/// [`ContentCache::get`]: crate::ContentCache::get
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to obtain a connection from the pool.
    #[error("cache connection error: {message}")]
    Connection { message: String },

    /// A command failed after a connection was established.
    #[error("cache transport error: {message}")]
    Transport { message: String },
}

impl CacheError {
    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StorageError::not_found(Dimension::ContentType, "content type '999' not found");
        assert_eq!(
            err.to_string(),
            "content type not found: content type '999' not found"
        );
        assert!(err.is_not_found());
        assert_eq!(err.dimension(), Some(Dimension::ContentType));
    }

    #[test]
    fn test_dimension_only_on_not_found() {
        let err = StorageError::internal("boom");
        assert!(!err.is_not_found());
        assert_eq!(err.dimension(), None);
    }

    #[test]
    fn test_cache_error_display() {
        let err = CacheError::transport("SCAN failed");
        assert!(err.to_string().contains("transport"));
    }
}
