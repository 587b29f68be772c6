//! Trait contracts for the primary store and the cache.
//!
//! Both contracts are explicit so that substitutability (the PostgreSQL and
//! Redis backends in production, the in-memory ones in tests) is enforced by
//! the type system rather than incidental.

use std::time::Duration;

use async_trait::async_trait;

use bodybalance_core::{Account, Category, Feedback, Video};

use crate::error::{CacheError, StorageError};

/// The durable source of truth for all content entities.
///
/// Every read is preceded by existence checks for the dimensions it
/// references, each check yielding a [`StorageError::NotFound`] tagged with
/// the missing dimension. A read that passes all checks but returns zero rows
/// is itself a not-found condition, tagged with the dimension of the entity
/// being listed (so "category exists but has no videos" is distinguishable
/// from "category does not exist").
#[async_trait]
pub trait ContentStorage: Send + Sync {
    /// Resolves an account to its content type.
    ///
    /// # Errors
    ///
    /// `NotFound(Account)` if no such username exists.
    async fn get_account(&self, username: &str) -> Result<Account, StorageError>;

    /// Returns all categories of a content type, most recently created first.
    ///
    /// # Errors
    ///
    /// `NotFound(ContentType)` if the content type does not exist,
    /// `NotFound(Category)` if it exists but has no categories.
    async fn get_categories(&self, type_id: i64) -> Result<Vec<Category>, StorageError>;

    /// Returns a single video by id.
    ///
    /// # Errors
    ///
    /// `NotFound(Video)` if no such video exists.
    async fn get_video(&self, video_id: i64) -> Result<Video, StorageError>;

    /// Returns all videos of a category within a content type, most recently
    /// created first.
    ///
    /// # Errors
    ///
    /// `NotFound(ContentType)` / `NotFound(Category)` if a dimension is
    /// missing, `NotFound(Video)` if both exist but the combination has no
    /// videos.
    async fn get_videos_by_category_and_type(
        &self,
        type_id: i64,
        category_id: i64,
    ) -> Result<Vec<Video>, StorageError>;

    /// Persists user feedback. Pure write-through; never cached.
    async fn add_feedback(&self, feedback: &Feedback) -> Result<(), StorageError>;

    /// Verifies the backend is reachable (health checks).
    async fn ping(&self) -> Result<(), StorageError>;
}

/// A TTL-bound byte cache keyed by the layout in [`crate::keys`].
///
/// The `get` contract is tri-state: `Ok(Some(bytes))` on a hit, `Ok(None)` on
/// a normal miss, `Err` only for transport or infrastructure failure. Callers
/// must never treat a miss as a fault, and the orchestration layer never puts
/// the cache on the correctness-critical path.
#[async_trait]
pub trait ContentCache: Send + Sync {
    /// Looks up a key. `Ok(None)` is the normal-miss outcome.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores a value with the given TTL. Best-effort; callers must not block
    /// the read path on the result.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Deletes every key matching a glob-style pattern, scanning the keyspace
    /// in bounded batches rather than one blocking pass. Returns the number
    /// of keys deleted; zero matches is success. Deletions already performed
    /// are not undone if a later batch fails.
    async fn delete_matching(&self, pattern: &str) -> Result<u64, CacheError>;

    /// Verifies the backend is reachable (health checks).
    async fn ping(&self) -> Result<(), CacheError>;
}
