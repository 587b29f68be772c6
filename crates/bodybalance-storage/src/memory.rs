//! In-memory implementations of the storage contracts.
//!
//! [`MemoryCache`] mirrors the Redis backend for single-node deployments and
//! tests: per-entry TTL, glob-pattern bulk deletion. [`MemoryStorage`] models
//! the relational backend closely enough to exercise the existence-check
//! semantics without a database.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use bodybalance_core::{Account, Category, Feedback, Video};

use crate::error::{CacheError, Dimension, StorageError};
use crate::traits::{ContentCache, ContentStorage};

/// A cached entry with its own TTL.
#[derive(Debug, Clone)]
struct CachedEntry {
    data: Vec<u8>,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedEntry {
    fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// In-process cache backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, CachedEntry>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (possibly expired) entries. For tests and stats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ContentCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.data.clone()));
            }
            drop(entry);
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.entries.insert(
            key.to_string(),
            CachedEntry {
                data: value,
                cached_at: Instant::now(),
                ttl,
            },
        );
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> Result<u64, CacheError> {
        let matching: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| glob_match(pattern, entry.key()))
            .map(|entry| entry.key().clone())
            .collect();

        let mut deleted = 0u64;
        for key in matching {
            if self.entries.remove(&key).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Glob matcher compatible with the Redis `MATCH` subset the invalidation
/// patterns use: `*` matches any run of characters, `?` a single character,
/// everything else matches literally.
fn glob_match(pattern: &str, key: &str) -> bool {
    fn inner(p: &[u8], k: &[u8]) -> bool {
        match (p.first(), k.first()) {
            (None, None) => true,
            (Some(b'*'), _) => inner(&p[1..], k) || (!k.is_empty() && inner(p, &k[1..])),
            (Some(b'?'), Some(_)) => inner(&p[1..], &k[1..]),
            (Some(a), Some(b)) if a == b => inner(&p[1..], &k[1..]),
            _ => false,
        }
    }
    inner(pattern.as_bytes(), key.as_bytes())
}

/// In-memory primary store mirroring the relational row sets.
///
/// Reads reproduce the backend semantics exactly: dimension existence checks
/// first, then the row lookup, with zero rows reported as not-found on the
/// listed entity's dimension. Lists keep most-recently-added-first order.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    content_types: DashMap<i64, String>,
    accounts: DashMap<String, i64>,
    categories_by_type: DashMap<i64, Vec<Category>>,
    videos: DashMap<i64, Video>,
    video_lists: DashMap<(i64, i64), Vec<Video>>,
    feedback: Mutex<Vec<Feedback>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_content_type(&self, id: i64, name: impl Into<String>) {
        self.content_types.insert(id, name.into());
    }

    pub fn add_account(&self, username: impl Into<String>, type_id: i64) {
        self.accounts.insert(username.into(), type_id);
    }

    /// Registers a category under a content type. Later additions sort first,
    /// matching the most-recently-created-first order of the backend.
    pub fn add_category(&self, type_id: i64, category: Category) {
        self.categories_by_type
            .entry(type_id)
            .or_default()
            .insert(0, category);
    }

    pub fn add_video(&self, video: Video) {
        self.videos.insert(video.id, video);
    }

    /// Registers a video in the (type, category) list. Later additions sort
    /// first.
    pub fn add_video_to_list(&self, type_id: i64, category_id: i64, video: Video) {
        self.video_lists
            .entry((type_id, category_id))
            .or_default()
            .insert(0, video);
    }

    /// Feedback recorded so far, for assertions in tests.
    #[must_use]
    pub fn feedback(&self) -> Vec<Feedback> {
        self.feedback.lock().expect("feedback lock poisoned").clone()
    }

    fn check_content_type(&self, type_id: i64) -> Result<(), StorageError> {
        if self.content_types.contains_key(&type_id) {
            Ok(())
        } else {
            Err(StorageError::not_found(
                Dimension::ContentType,
                format!("content type '{type_id}' not found"),
            ))
        }
    }

    fn check_category(&self, category_id: i64) -> Result<(), StorageError> {
        let exists = self
            .categories_by_type
            .iter()
            .any(|entry| entry.value().iter().any(|c| c.id == category_id));
        if exists {
            Ok(())
        } else {
            Err(StorageError::not_found(
                Dimension::Category,
                format!("category '{category_id}' not found"),
            ))
        }
    }
}

#[async_trait]
impl ContentStorage for MemoryStorage {
    async fn get_account(&self, username: &str) -> Result<Account, StorageError> {
        let type_id = self.accounts.get(username).map(|entry| *entry.value());
        // A dangling content type reads like a missing account, the same way
        // the SQL join yields zero rows.
        let account = type_id.and_then(|id| {
            self.content_types.get(&id).map(|name| Account {
                username: username.to_string(),
                type_id: id,
                type_name: name.clone(),
            })
        });
        account.ok_or_else(|| {
            StorageError::not_found(
                Dimension::Account,
                format!("account '{username}' not found"),
            )
        })
    }

    async fn get_categories(&self, type_id: i64) -> Result<Vec<Category>, StorageError> {
        self.check_content_type(type_id)?;

        let categories = self
            .categories_by_type
            .get(&type_id)
            .map(|entry| entry.clone())
            .unwrap_or_default();

        if categories.is_empty() {
            return Err(StorageError::not_found(
                Dimension::Category,
                format!("no categories found for content type '{type_id}'"),
            ));
        }
        Ok(categories)
    }

    async fn get_video(&self, video_id: i64) -> Result<Video, StorageError> {
        self.videos
            .get(&video_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| {
                StorageError::not_found(
                    Dimension::Video,
                    format!("video with id '{video_id}' not found"),
                )
            })
    }

    async fn get_videos_by_category_and_type(
        &self,
        type_id: i64,
        category_id: i64,
    ) -> Result<Vec<Video>, StorageError> {
        self.check_content_type(type_id)?;
        self.check_category(category_id)?;

        let videos = self
            .video_lists
            .get(&(type_id, category_id))
            .map(|entry| entry.clone())
            .unwrap_or_default();

        if videos.is_empty() {
            return Err(StorageError::not_found(
                Dimension::Video,
                format!("no videos found for content type '{type_id}' and category '{category_id}'"),
            ));
        }
        Ok(videos)
    }

    async fn add_feedback(&self, feedback: &Feedback) -> Result<(), StorageError> {
        self.feedback
            .lock()
            .map_err(|_| StorageError::internal("feedback lock poisoned"))?
            .push(feedback.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
