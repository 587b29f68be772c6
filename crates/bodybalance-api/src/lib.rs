//! BodyBalance content API: cache-aside reads over the primary store.
//!
//! [`ApiService`] is the single entry point for reads and feedback writes.
//! It validates raw request input, serves reads through a TTL cache when
//! one is configured, and tags every answer with the [`DataSource`] it came
//! from. [`CacheInvalidator`] is the matching administrative surface for
//! dropping cached entries by key family.
//!
//! [`DataSource`]: bodybalance_core::DataSource

mod config;
mod error;
mod invalidation;
mod service;

pub use config::ApiConfig;
pub use error::ApiError;
pub use invalidation::CacheInvalidator;
pub use service::ApiService;
