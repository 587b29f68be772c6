//! HTTP handlers for the content API.
//!
//! Successful reads carry an `X-Data-Source` header naming the tier that
//! served them. Errors map to a JSON body with a stable shape:
//! validation → 400, not found → 404, everything else → 500.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use bodybalance_api::ApiError;
use bodybalance_core::{DataSource, Feedback};

use crate::metrics;
use crate::server::AppState;

/// Response header naming the tier a read was served from.
pub const DATA_SOURCE_HEADER: &str = "x-data-source";

#[derive(Deserialize)]
pub struct LoginParams {
    #[serde(default)]
    username: String,
}

#[derive(Deserialize)]
pub struct CategoryParams {
    #[serde(rename = "type", default)]
    content_type: String,
}

#[derive(Deserialize)]
pub struct VideoParams {
    #[serde(default)]
    video_id: String,
}

#[derive(Deserialize)]
pub struct VideoListParams {
    #[serde(rename = "type", default)]
    content_type: String,
    #[serde(default)]
    category: String,
}

#[derive(Deserialize)]
pub struct InvalidateParams {
    #[serde(default)]
    scope: String,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "BodyBalance Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn login(State(state): State<AppState>, Query(params): Query<LoginParams>) -> Response {
    match state.api.get_account(&params.username).await {
        Ok((account, source)) => {
            metrics::record_content_read("login", source);
            tagged(account, source)
        }
        Err(err) => error_response(err),
    }
}

pub async fn categories(
    State(state): State<AppState>,
    Query(params): Query<CategoryParams>,
) -> Response {
    match state.api.get_categories(&params.content_type).await {
        Ok((categories, source)) => {
            metrics::record_content_read("categories", source);
            tagged(categories, source)
        }
        Err(err) => error_response(err),
    }
}

pub async fn video(State(state): State<AppState>, Query(params): Query<VideoParams>) -> Response {
    match state.api.get_video(&params.video_id).await {
        Ok((video, source)) => {
            metrics::record_content_read("video", source);
            tagged(video, source)
        }
        Err(err) => error_response(err),
    }
}

pub async fn videos_by_category(
    State(state): State<AppState>,
    Query(params): Query<VideoListParams>,
) -> Response {
    match state
        .api
        .get_videos_by_category_and_type(&params.content_type, &params.category)
        .await
    {
        Ok((videos, source)) => {
            metrics::record_content_read("videos_by_category", source);
            tagged(videos, source)
        }
        Err(err) => error_response(err),
    }
}

pub async fn feedback(State(state): State<AppState>, Json(payload): Json<Feedback>) -> Response {
    match state.api.add_feedback(&payload).await {
        Ok(()) => (StatusCode::CREATED, Json(json!({"status": "created"}))).into_response(),
        Err(err) => error_response(err),
    }
}

/// Administrative bulk invalidation, scoped by key family.
pub async fn invalidate_cache(
    State(state): State<AppState>,
    Query(params): Query<InvalidateParams>,
) -> Response {
    let Some(ref invalidator) = state.invalidator else {
        // No cache backend configured; nothing to invalidate.
        return (
            StatusCode::OK,
            Json(json!({"scope": params.scope, "deleted": 0})),
        )
            .into_response();
    };

    let result = match params.scope.as_str() {
        "all" => invalidator.invalidate_all().await,
        "accounts" => invalidator.invalidate_accounts().await,
        "categories" => invalidator.invalidate_categories().await,
        "videos" => invalidator.invalidate_videos().await,
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("unknown scope '{other}', expected all|accounts|categories|videos"),
                })),
            )
                .into_response();
        }
    };

    match result {
        Ok(deleted) => {
            metrics::record_cache_invalidation(&params.scope, deleted);
            (
                StatusCode::OK,
                Json(json!({"scope": params.scope, "deleted": deleted})),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, scope = %params.scope, "cache invalidation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "cache invalidation failed"})),
            )
                .into_response()
        }
    }
}

/// Liveness plus dependency reachability.
pub async fn healthz(State(state): State<AppState>) -> Response {
    let database = match state.db.ping().await {
        Ok(()) => "up",
        Err(err) => {
            tracing::warn!(error = %err, "database health check failed");
            "down"
        }
    };
    let cache = match &state.cache {
        None => "disabled",
        Some(cache) => match cache.ping().await {
            Ok(()) => "up",
            Err(err) => {
                tracing::warn!(error = %err, "cache health check failed");
                "down"
            }
        },
    };

    // The cache is optional by design; only the database gates readiness.
    let status = if database == "up" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = json!({
        "status": if status == StatusCode::OK { "ok" } else { "degraded" },
        "database": database,
        "cache": cache,
    });
    (status, Json(body)).into_response()
}

pub async fn metrics_endpoint() -> Response {
    match metrics::render_metrics() {
        Some(body) => (StatusCode::OK, body).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics not initialized\n".to_string(),
        )
            .into_response(),
    }
}

fn tagged<T: serde::Serialize>(value: T, source: DataSource) -> Response {
    (
        StatusCode::OK,
        [(DATA_SOURCE_HEADER, source.as_str())],
        Json(value),
    )
        .into_response()
}

fn error_response(err: ApiError) -> Response {
    let status = match &err {
        ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
        ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
        ApiError::Server => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let mut body = json!({"error": err.to_string()});
    if let Some(dimension) = err.dimension() {
        body["dimension"] = json!(dimension.to_string());
    }
    (status, Json(body)).into_response()
}
