//! Serializable content entities.
//!
//! The serde shapes here are the wire format of the public API and, by the
//! cache-snapshot invariant, also the exact JSON stored in the cache. Field
//! names are stable; renaming one is a breaking change for both clients and
//! any cache content already in Redis.

use serde::{Deserialize, Serialize};

/// A content type dimension (e.g. "fitness", "rehabilitation").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentType {
    pub id: i64,
    pub name: String,
}

/// A user account resolved to its content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub type_id: i64,
    pub type_name: String,
}

/// A video category within a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub img_url: String,
}

/// A single video with its resolved category name and media URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub img_url: String,
}

/// User feedback submitted through the public API. Write-only; never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telegram: String,
    pub message: String,
}
