//! Canonical cache key layout.
//!
//! One fixed template per entity family. The formats are stable and must be
//! reproduced exactly: cache content written by earlier deployments is keyed
//! this way, and the invalidation patterns below rely on the prefixes being
//! disjoint (`video:` never matches `videos:*`).

/// Key for a single account: `account:<username>`.
#[must_use]
pub fn account(username: &str) -> String {
    format!("account:{username}")
}

/// Key for the category list of a content type: `categories:<typeID>`.
#[must_use]
pub fn categories(type_id: i64) -> String {
    format!("categories:{type_id}")
}

/// Key for a single video: `video:<videoID>`.
#[must_use]
pub fn video(video_id: i64) -> String {
    format!("video:{video_id}")
}

/// Key for a video list: `videos:<typeID>:<categoryID>`.
#[must_use]
pub fn videos(type_id: i64, category_id: i64) -> String {
    format!("videos:{type_id}:{category_id}")
}

/// Match patterns for scoped bulk invalidation.
pub mod pattern {
    /// Every key in the cache.
    pub const ALL: &str = "*";
    /// All account keys.
    pub const ACCOUNTS: &str = "account:*";
    /// All category-list keys.
    pub const CATEGORIES: &str = "categories:*";
    /// All single-video keys.
    pub const VIDEOS: &str = "video:*";
    /// All video-list keys.
    pub const VIDEO_LISTS: &str = "videos:*";
}
