//! Storage abstraction layer for the BodyBalance content backend.
//!
//! This crate defines the two contracts the cache-aside orchestration is
//! written against:
//!
//! - [`ContentStorage`]: the durable primary store (one read per entity
//!   family, dimension-tagged not-found errors),
//! - [`ContentCache`]: a TTL-bound byte cache with an explicit tri-state
//!   `get` (found / not-found / transport error) and pattern-based bulk
//!   deletion.
//!
//! It also owns the canonical cache key layout ([`keys`]) and in-memory
//! implementations of both traits ([`MemoryCache`], [`MemoryStorage`]) used
//! by tests and single-node deployments.

mod error;
pub mod keys;
mod memory;
mod traits;

pub use error::{CacheError, Dimension, StorageError};
pub use memory::{MemoryCache, MemoryStorage};
pub use traits::{ContentCache, ContentStorage};

/// Type alias for a shareable primary-store handle.
pub type DynContentStorage = std::sync::Arc<dyn ContentStorage>;

/// Type alias for a shareable cache handle.
pub type DynContentCache = std::sync::Arc<dyn ContentCache>;
