//! Router assembly and the server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use bodybalance_api::{ApiConfig, ApiService, CacheInvalidator};
use bodybalance_cache_redis::{RedisCache, RedisCacheConfig};
use bodybalance_db_postgres::{PostgresConfig, PostgresStorage};
use bodybalance_storage::{DynContentCache, DynContentStorage, MemoryCache};

use crate::{config::AppConfig, handlers, metrics, middleware as app_middleware};

/// Shared handles threaded through every handler.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiService,
    /// Present only when a cache backend is configured.
    pub invalidator: Option<CacheInvalidator>,
    pub db: DynContentStorage,
    pub cache: Option<DynContentCache>,
}

impl AppState {
    /// Wire up the state from explicit backends. The cache handle being
    /// `None` turns the read path into plain primary-store reads.
    pub fn new(config: ApiConfig, db: DynContentStorage, cache: Option<DynContentCache>) -> Self {
        let (api_cache, invalidator, config) = match cache.clone() {
            Some(cache) => (
                Arc::clone(&cache),
                Some(CacheInvalidator::new(cache)),
                config,
            ),
            // Placeholder backend; never read or written with the cache
            // disabled.
            None => (
                Arc::new(MemoryCache::new()) as DynContentCache,
                None,
                config.with_cache_enabled(false),
            ),
        };
        Self {
            api: ApiService::new(config, Arc::clone(&db), api_cache),
            invalidator,
            db,
            cache,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::metrics_endpoint))
        // Content API
        .route("/v1/login", get(handlers::login))
        .route("/v1/category", get(handlers::categories))
        .route("/v1/video", get(handlers::video))
        .route("/v1/video_categories", get(handlers::videos_by_category))
        .route("/v1/feedback", post(handlers::feedback))
        // Administration
        .route("/admin/cache/invalidate", post(handlers::invalidate_cache))
        // Middleware stack (order: request id -> metrics -> cors/compression/trace)
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(middleware::from_fn(track_metrics))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let req_id = req
                    .extensions()
                    .get::<axum::http::HeaderValue>()
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                tracing::info_span!(
                    "http.request",
                    http.method = %req.method(),
                    http.target = %req.uri(),
                    request_id = %req_id
                )
            }),
        )
        .with_state(state)
}

async fn track_metrics(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let res = next.run(req).await;
    metrics::record_http_request(&method, &path, res.status().as_u16(), start.elapsed());
    res
}

pub struct BodybalanceServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Connect the configured backends and assemble the router.
    pub async fn build(self) -> anyhow::Result<BodybalanceServer> {
        let cfg = self.config;

        let pg = &cfg.storage.postgres;
        let storage = PostgresStorage::new(
            PostgresConfig::new(&pg.url)
                .with_pool_size(pg.pool_size)
                .with_connect_timeout_ms(pg.connect_timeout_ms)
                .with_idle_timeout_ms(pg.idle_timeout_ms)
                .with_media_base_url(&pg.media_base_url),
        )
        .await?;
        let db: DynContentStorage = Arc::new(storage);

        let cache: Option<DynContentCache> = if cfg.redis.enabled {
            let redis = RedisCache::connect(
                &RedisCacheConfig::new(&cfg.redis.url)
                    .with_pool_size(cfg.redis.pool_size)
                    .with_timeout_ms(cfg.redis.timeout_ms),
            )
            .await?;
            Some(Arc::new(redis))
        } else {
            tracing::info!("redis disabled, serving all reads from PostgreSQL");
            None
        };

        let api_config = ApiConfig::default()
            .with_cache_enabled(cfg.redis.enabled)
            .with_cache_ttl(cfg.cache_ttl())
            .with_populate_timeout(cfg.populate_timeout());

        let state = AppState::new(api_config, db, cache);
        Ok(BodybalanceServer {
            addr: cfg.addr(),
            app: build_app(state),
        })
    }
}

impl BodybalanceServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
