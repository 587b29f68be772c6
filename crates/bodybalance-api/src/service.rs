//! Cache-aside read orchestration.
//!
//! Every read follows the same shape: try the cache, fall back to the
//! primary store, and on a primary hit hand the value back immediately while
//! a detached task repopulates the cache in the background. Cache failures
//! of any kind degrade to a primary read and are never surfaced to the
//! caller; only primary-store failures are.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};

use bodybalance_core::{Account, Category, DataSource, Feedback, Video};
use bodybalance_storage::{DynContentCache, DynContentStorage, StorageError, keys};

use crate::config::ApiConfig;
use crate::error::ApiError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.+-]+@[\w-]+(\.[\w-]+)+$").unwrap());

// Telegram handles: @ followed by 5-32 word characters.
static TELEGRAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^@\w{5,32}$").unwrap());

/// Read façade over the primary store with a read-through cache in front.
///
/// Cheap to clone; both backends are shared handles.
#[derive(Clone)]
pub struct ApiService {
    config: ApiConfig,
    db: DynContentStorage,
    cache: DynContentCache,
}

impl ApiService {
    pub fn new(config: ApiConfig, db: DynContentStorage, cache: DynContentCache) -> Self {
        Self { config, db, cache }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Look up an account by username, with the content type it is
    /// assigned to resolved inline.
    #[instrument(skip(self))]
    pub async fn get_account(&self, username: &str) -> Result<(Account, DataSource), ApiError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::validation("username cannot be empty"));
        }
        self.read_through(keys::account(username), self.db.get_account(username))
            .await
    }

    /// Categories available for a content type, most recent first.
    #[instrument(skip(self))]
    pub async fn get_categories(
        &self,
        type_id: &str,
    ) -> Result<(Vec<Category>, DataSource), ApiError> {
        let type_id = parse_id(type_id, "type id")?;
        self.read_through(keys::categories(type_id), self.db.get_categories(type_id))
            .await
    }

    /// A single video by id.
    #[instrument(skip(self))]
    pub async fn get_video(&self, video_id: &str) -> Result<(Video, DataSource), ApiError> {
        let video_id = parse_id(video_id, "video id")?;
        self.read_through(keys::video(video_id), self.db.get_video(video_id))
            .await
    }

    /// Videos in one category of one content type, most recent first.
    #[instrument(skip(self))]
    pub async fn get_videos_by_category_and_type(
        &self,
        type_id: &str,
        category_id: &str,
    ) -> Result<(Vec<Video>, DataSource), ApiError> {
        let type_id = parse_id(type_id, "type id")?;
        let category_id = parse_id(category_id, "category id")?;
        self.read_through(
            keys::videos(type_id, category_id),
            self.db.get_videos_by_category_and_type(type_id, category_id),
        )
        .await
    }

    /// Validate and persist user feedback. Never touches the cache.
    #[instrument(skip_all)]
    pub async fn add_feedback(&self, feedback: &Feedback) -> Result<(), ApiError> {
        validate_feedback(feedback)?;
        self.db.add_feedback(feedback).await.map_err(|err| {
            error!(error = %err, "failed to store feedback");
            ApiError::from(err)
        })
    }

    /// The shared read path: cache first, primary on miss, detached
    /// repopulation on a primary hit.
    async fn read_through<T, F>(&self, key: String, load: F) -> Result<(T, DataSource), ApiError>
    where
        T: Serialize + DeserializeOwned + Clone + Send + 'static,
        F: Future<Output = Result<T, StorageError>> + Send,
    {
        if self.config.cache_enabled {
            match self.cache.get(&key).await {
                Ok(Some(bytes)) => match serde_json::from_slice::<T>(&bytes) {
                    Ok(value) => {
                        debug!(key = %key, "cache hit");
                        return Ok((value, DataSource::Cache));
                    }
                    Err(err) => {
                        // A stale or corrupt entry is treated as a miss; the
                        // population below overwrites it.
                        warn!(key = %key, error = %err, "cached entry did not decode, reading primary");
                    }
                },
                Ok(None) => debug!(key = %key, "cache miss"),
                Err(err) => warn!(key = %key, error = %err, "cache read failed, reading primary"),
            }
        }

        let value = load.await.map_err(|err| {
            if err.is_not_found() {
                debug!(key = %key, error = %err, "entity not found in primary store");
            } else {
                error!(key = %key, error = %err, "primary store read failed");
            }
            ApiError::from(err)
        })?;

        if self.config.cache_enabled {
            self.spawn_population(key, &value);
        }
        Ok((value, DataSource::Primary))
    }

    /// Hands the value to a detached task that serializes and writes it. The
    /// task has its own timeout so a finished request never waits on it, and
    /// a failure only costs the next reader a cache miss.
    fn spawn_population<T>(&self, key: String, value: &T)
    where
        T: Serialize + Clone + Send + 'static,
    {
        let value = value.clone();
        let cache = Arc::clone(&self.cache);
        let ttl = self.config.cache_ttl;
        let timeout = self.config.populate_timeout;
        tokio::spawn(async move {
            let bytes = match serde_json::to_vec(&value) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(key = %key, error = %err, "failed to encode value for cache");
                    return;
                }
            };
            match tokio::time::timeout(timeout, cache.set(&key, bytes, ttl)).await {
                Ok(Ok(())) => debug!(key = %key, "cache populated"),
                Ok(Err(err)) => warn!(key = %key, error = %err, "cache population failed"),
                Err(_) => warn!(key = %key, timeout_ms = timeout.as_millis() as u64, "cache population timed out"),
            }
        });
    }
}

fn parse_id(raw: &str, field: &str) -> Result<i64, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::validation(format!("{field} cannot be empty")));
    }
    raw.parse::<i64>()
        .map_err(|_| ApiError::validation(format!("{field} must be an integer, got '{raw}'")))
}

fn validate_feedback(feedback: &Feedback) -> Result<(), ApiError> {
    if feedback.message.trim().is_empty() {
        return Err(ApiError::validation("feedback message cannot be empty"));
    }

    let email = feedback.email.trim();
    let telegram = feedback.telegram.trim();
    if email.is_empty() && telegram.is_empty() {
        return Err(ApiError::validation(
            "feedback requires an email or a telegram handle",
        ));
    }
    if !email.is_empty() && !EMAIL_RE.is_match(email) {
        return Err(ApiError::validation(format!("invalid email '{email}'")));
    }
    if !telegram.is_empty() && !TELEGRAM_RE.is_match(telegram) {
        return Err(ApiError::validation(format!(
            "invalid telegram handle '{telegram}'"
        )));
    }
    Ok(())
}
