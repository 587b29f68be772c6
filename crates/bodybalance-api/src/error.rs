//! Request-facing error type for the content API.
//!
//! Storage failures collapse into two categories here: `NotFound` keeps its
//! dimension so callers can report what exactly was missing, and everything
//! else becomes an opaque `Server` error. Input problems are rejected up
//! front as `Validation` before any store is touched.

use bodybalance_storage::{Dimension, StorageError};
use thiserror::Error;

/// Error returned by [`ApiService`](crate::ApiService) operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request input was malformed or incomplete.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// The requested entity does not exist in the primary store.
    #[error("{dimension} not found: {detail}")]
    NotFound { dimension: Dimension, detail: String },

    /// The primary store failed in a way the caller cannot act on.
    #[error("internal server error")]
    Server,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Dimension of the missing entity, when this is a `NotFound`.
    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            Self::NotFound { dimension, .. } => Some(*dimension),
            _ => None,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { dimension, detail } => Self::NotFound { dimension, detail },
            StorageError::Connection { .. } | StorageError::Internal { .. } => Self::Server,
        }
    }
}
