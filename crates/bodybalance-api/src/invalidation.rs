//! Bulk cache invalidation, scoped by key family.

use bodybalance_storage::{CacheError, DynContentCache, keys::pattern};
use tracing::{info, instrument};

/// Deletes cached entries by glob pattern, one key family at a time.
///
/// Deletion is best effort: keys written concurrently with a sweep may
/// survive it, and a partial sweep reports the keys it did remove.
#[derive(Clone)]
pub struct CacheInvalidator {
    cache: DynContentCache,
}

impl CacheInvalidator {
    pub fn new(cache: DynContentCache) -> Self {
        Self { cache }
    }

    /// Remove every entry matching `pattern`, returning how many were
    /// deleted.
    #[instrument(skip(self))]
    pub async fn invalidate_matching(&self, pattern: &str) -> Result<u64, CacheError> {
        let deleted = self.cache.delete_matching(pattern).await?;
        info!(pattern = %pattern, deleted, "cache entries invalidated");
        Ok(deleted)
    }

    /// Drop the entire cache.
    pub async fn invalidate_all(&self) -> Result<u64, CacheError> {
        self.invalidate_matching(pattern::ALL).await
    }

    /// Drop cached accounts.
    pub async fn invalidate_accounts(&self) -> Result<u64, CacheError> {
        self.invalidate_matching(pattern::ACCOUNTS).await
    }

    /// Drop cached per-type category lists.
    pub async fn invalidate_categories(&self) -> Result<u64, CacheError> {
        self.invalidate_matching(pattern::CATEGORIES).await
    }

    /// Drop cached per-type-and-category video lists.
    pub async fn invalidate_video_lists(&self) -> Result<u64, CacheError> {
        self.invalidate_matching(pattern::VIDEO_LISTS).await
    }

    /// Drop everything video related: single videos and video lists.
    ///
    /// The two families live under distinct prefixes (`video:` and
    /// `videos:`), so this runs two sweeps and sums the counts.
    pub async fn invalidate_videos(&self) -> Result<u64, CacheError> {
        let singles = self.invalidate_matching(pattern::VIDEOS).await?;
        let lists = self.invalidate_matching(pattern::VIDEO_LISTS).await?;
        Ok(singles + lists)
    }
}
