//! Redis cache backend for the BodyBalance content backend.
//!
//! Implements the `ContentCache` trait from `bodybalance-storage` on top of a
//! deadpool-redis pool. Bulk invalidation walks the keyspace with cursor-based
//! `SCAN` batches so deleting a large key family never stalls the cache.

mod config;
mod store;

pub use config::RedisCacheConfig;
pub use store::RedisCache;
