//! Tuning knobs for the cache-aside orchestrator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Behaviour of the read-through cache layer.
///
/// Values are fixed at construction. Toggling the cache at runtime requires
/// rebuilding the service with a new config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// When false every read goes straight to the primary store and the
    /// cache is never written.
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    /// Expiry applied to every cached entry.
    #[serde(default = "default_cache_ttl", with = "duration_secs")]
    pub cache_ttl: Duration,

    /// Upper bound on a single detached population attempt.
    #[serde(default = "default_populate_timeout", with = "duration_millis")]
    pub populate_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cache_enabled: default_cache_enabled(),
            cache_ttl: default_cache_ttl(),
            populate_timeout: default_populate_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_populate_timeout(mut self, timeout: Duration) -> Self {
        self.populate_timeout = timeout;
        self
    }
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(3600)
}

fn default_populate_timeout() -> Duration {
    Duration::from_millis(5000)
}

mod duration_secs {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod duration_millis {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
