//! HTTP surface tests against an ephemeral server backed by the in-memory
//! implementations.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::task::JoinHandle;

use bodybalance_api::ApiConfig;
use bodybalance_core::{Category, Video};
use bodybalance_server::{AppState, build_app};
use bodybalance_storage::{DynContentCache, MemoryCache, MemoryStorage};

fn seeded_storage() -> MemoryStorage {
    let storage = MemoryStorage::new();
    storage.add_content_type(1, "fitness");
    storage.add_account("alice", 1);
    storage.add_category(
        1,
        Category {
            id: 7,
            name: "Strength".to_string(),
            img_url: "https://media.example.com/images/strength.jpg".to_string(),
        },
    );
    let video = Video {
        id: 42,
        url: "https://media.example.com/videos/squat.mp4".to_string(),
        name: "Squat".to_string(),
        description: "Back squat fundamentals".to_string(),
        category: "Strength".to_string(),
        img_url: "https://media.example.com/images/squat.jpg".to_string(),
    };
    storage.add_video(video.clone());
    storage.add_video_to_list(1, 7, video);
    storage
}

fn memory_state(cache: Option<DynContentCache>) -> AppState {
    AppState::new(ApiConfig::default(), Arc::new(seeded_storage()), cache)
}

async fn start_server(state: AppState) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>)
{
    let app = build_app(state);

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

#[tokio::test]
async fn content_endpoints_tag_their_data_source() {
    let cache = Arc::new(MemoryCache::new());
    let state = memory_state(Some(cache.clone() as _));
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();

    // Cold read comes from the primary store.
    let resp = client
        .get(format!("{base}/v1/video?video_id=42"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("x-data-source").unwrap(),
        "primary"
    );
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], 42);
    assert_eq!(body["name"], "Squat");

    // Population is detached; poll until the cached copy shows up.
    let mut warm_source = String::new();
    for _ in 0..200 {
        let resp = client
            .get(format!("{base}/v1/video?video_id=42"))
            .send()
            .await
            .unwrap();
        warm_source = resp
            .headers()
            .get("x-data-source")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        if warm_source == "cache" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(warm_source, "cache");

    // The other read endpoints answer too.
    let resp = client
        .get(format!("{base}/v1/login?username=alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["type_name"], "fitness");

    let resp = client
        .get(format!("{base}/v1/category?type=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body[0]["name"], "Strength");

    let resp = client
        .get(format!("{base}/v1/video_categories?type=1&category=7"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body[0]["id"], 42);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let state = memory_state(Some(Arc::new(MemoryCache::new()) as _));
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();

    // Missing query parameter fails validation.
    let resp = client.get(format!("{base}/v1/login")).send().await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("username"));

    // Non-numeric id fails validation.
    let resp = client
        .get(format!("{base}/v1/video?video_id=abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Unknown content type is a dimension-tagged 404.
    let resp = client
        .get(format!("{base}/v1/category?type=999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["dimension"], "content type");

    // Unknown account.
    let resp = client
        .get(format!("{base}/v1/login?username=bob"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["dimension"], "account");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn feedback_endpoint_validates_and_stores() {
    let state = memory_state(Some(Arc::new(MemoryCache::new()) as _));
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/v1/feedback"))
        .json(&json!({
            "name": "Anna",
            "email": "anna@example.com",
            "message": "More mobility videos please",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // No contact details at all.
    let resp = client
        .post(format!("{base}/v1/feedback"))
        .json(&json!({"message": "anonymous"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn admin_invalidation_sweeps_key_families() {
    let cache = Arc::new(MemoryCache::new());
    let state = memory_state(Some(cache.clone() as _));
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();

    // Warm the cache through the API, then sweep it.
    client
        .get(format!("{base}/v1/video?video_id=42"))
        .send()
        .await
        .unwrap();
    for _ in 0..200 {
        if !cache.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(!cache.is_empty());

    let resp = client
        .post(format!("{base}/admin/cache/invalidate?scope=videos"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["scope"], "videos");
    assert_eq!(body["deleted"], 1);
    assert!(cache.is_empty());

    // Unknown scope is rejected.
    let resp = client
        .post(format!("{base}/admin/cache/invalidate?scope=everything"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn health_reports_cache_state() {
    // With a cache backend.
    let state = memory_state(Some(Arc::new(MemoryCache::new()) as _));
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
    assert_eq!(body["cache"], "up");

    let _ = shutdown_tx.send(());
    let _ = handle.await;

    // Without one, reads still work and health says so.
    let state = memory_state(None);
    let (base, shutdown_tx, handle) = start_server(state).await;

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["cache"], "disabled");

    let resp = client
        .get(format!("{base}/v1/video?video_id=42"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("x-data-source").unwrap(), "primary");

    // Invalidation is a no-op without a backend.
    let resp = client
        .post(format!("{base}/admin/cache/invalidate?scope=all"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["deleted"], 0);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn root_reports_service_info() {
    let state = memory_state(None);
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    // Every response carries a request id.
    assert!(resp.headers().get("x-request-id").is_some());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "BodyBalance Server");
    assert_eq!(body["status"], "ok");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
