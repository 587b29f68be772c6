//! HTTP glue for the BodyBalance content backend.
//!
//! Wires the cache-aside API service to an axum router: configuration
//! loading, tracing setup, Prometheus metrics, request-id middleware, and the
//! `/v1` content endpoints.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use server::{AppState, BodybalanceServer, ServerBuilder, build_app};
