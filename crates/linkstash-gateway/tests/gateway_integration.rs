//! Request-level tests for the gateway: authentication, rate limiting, the
//! bookmarklet add/delete flow, and the proxy download endpoint.

use axum::body::{to_bytes, Body};
use axum::extract::connect_info::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use linkstash_cache::{FileCacheConfig, FileSnapshotCache};
use linkstash_core::{Blacklist, Clock, Notifier};
use linkstash_gateway::app::App;
use linkstash_gateway::state::AppState;
use linkstash_guard::{IntrusionLog, RateLimitConfig, RateLimiter};
use linkstash_store::{FavoritesStore, LocalLock, StoreConfig};
use linkstash_test_infra::{CapturingNotifier, ManualClock};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const SECRET: &str = "open-sesame";

struct Options {
    max_requests: u32,
    page_size: usize,
    blacklist: Blacklist,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_requests: 50,
            page_size: 25,
            blacklist: Blacklist::default(),
        }
    }
}

struct Harness {
    router: Router,
    notifier: CapturingNotifier,
    intrusion_log: Arc<IntrusionLog>,
    _dir: TempDir,
}

async fn harness(options: Options) -> Harness {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().to_path_buf();
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::fixed());

    let cache = Arc::new(
        FileSnapshotCache::new(
            FileCacheConfig::builder()
                .dir(data_dir.join("cache"))
                .ttl(Duration::from_secs(60))
                .build(),
        )
        .await
        .unwrap(),
    );

    let store = Arc::new(
        FavoritesStore::new(
            StoreConfig::builder()
                .path(data_dir.join("favorites.json"))
                .build(),
            Arc::new(LocalLock::new(Duration::from_secs(1))),
            Arc::clone(&cache),
            Arc::clone(&clock),
        )
        .await
        .unwrap(),
    );

    let limiter = Arc::new(
        RateLimiter::new(
            RateLimitConfig::builder()
                .dir(data_dir.join("guard"))
                .max_requests(options.max_requests)
                .build(),
            Arc::clone(&clock),
        )
        .await
        .unwrap(),
    );
    let proxy_limiter = Arc::new(
        RateLimiter::new(
            RateLimitConfig::builder()
                .dir(data_dir.join("guard").join("proxy"))
                .max_requests(10)
                .window_secs(120)
                .build(),
            Arc::clone(&clock),
        )
        .await
        .unwrap(),
    );

    let intrusion_log = Arc::new(
        IntrusionLog::new(data_dir.join("intruder.json"), Arc::clone(&clock))
            .await
            .unwrap(),
    );

    let notifier = CapturingNotifier::new();
    let state = AppState {
        store,
        cache,
        limiter,
        proxy_limiter,
        intrusion_log: Arc::clone(&intrusion_log),
        blacklist: Arc::new(options.blacklist),
        notifier: Arc::new(notifier.clone()) as Arc<dyn Notifier>,
        secret: Arc::from(SECRET),
        page_size: options.page_size,
        data_dir,
    };

    Harness {
        router: App::router(state),
        notifier,
        intrusion_log,
        _dir: dir,
    }
}

async fn get(router: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .extension(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))))
        .body(Body::empty())
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_unauthenticated() {
    let h = harness(Options::default()).await;
    let response = get(&h.router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn wrong_secret_is_rejected_and_logged() {
    let h = harness(Options::default()).await;

    let response = get(&h.router, "/?secret=wrong&title=Sneak&url=https%3A%2F%2Fx.example").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let missing = get(&h.router, "/").await;
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);

    let entries = h.intrusion_log.entries().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].used_secret, "wrong");
    assert_eq!(entries[0].submitted_title, "Sneak");
    assert_eq!(entries[0].submitted_url, "https://x.example");
    assert_eq!(entries[1].used_secret, "");
}

#[tokio::test]
async fn add_list_delete_flow() {
    let h = harness(Options::default()).await;

    let added = get(
        &h.router,
        "/?secret=open-sesame&url=https%3A%2F%2Fexample.com%2Fpage&title=Example",
    )
    .await;
    assert_eq!(added.status(), StatusCode::OK);
    let body = json_body(added).await;
    assert_eq!(body["message"], "the url has been added");
    assert_eq!(body["total"], 1);

    let duplicate = get(
        &h.router,
        "/?secret=open-sesame&url=https%3A%2F%2Fexample.com%2Fpage&title=Again",
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let listing = json_body(get(&h.router, "/?secret=open-sesame").await).await;
    assert_eq!(listing["links"][0]["url"], "https://example.com/page");
    assert_eq!(listing["links"][0]["title"], "Example");

    let deleted = json_body(
        get(
            &h.router,
            "/?secret=open-sesame&delete=https%3A%2F%2Fexample.com%2Fpage",
        )
        .await,
    )
    .await;
    assert_eq!(deleted["message"], "the url has been deleted");
    assert_eq!(deleted["total"], 0);

    // Deleting again is a no-op, not an error.
    let again = json_body(
        get(
            &h.router,
            "/?secret=open-sesame&delete=https%3A%2F%2Fexample.com%2Fpage",
        )
        .await,
    )
    .await;
    assert_eq!(again["message"], "nothing matched the url to delete");
}

#[tokio::test]
async fn blacklisted_and_invalid_adds_are_rejected() {
    let h = harness(Options {
        blacklist: Blacklist::new(["google.com"]),
        ..Options::default()
    })
    .await;

    let blacklisted = get(
        &h.router,
        "/?secret=open-sesame&url=https%3A%2F%2FMAPS.Google.com%2Fx&title=Maps",
    )
    .await;
    assert_eq!(blacklisted.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let invalid = get(
        &h.router,
        "/?secret=open-sesame&url=not-a-valid-url&title=Broken",
    )
    .await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn manual_backup_notifies_with_the_snapshot() {
    let h = harness(Options::default()).await;

    get(
        &h.router,
        "/?secret=open-sesame&url=https%3A%2F%2Fexample.com&title=Example",
    )
    .await;
    let response = get(&h.router, "/?secret=open-sesame&backup=true").await;
    assert_eq!(response.status(), StatusCode::OK);

    let calls = h.notifier.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, linkstash_core::BackupReason::Manual);
    assert_eq!(calls[0].0.len(), 1);
}

#[tokio::test]
async fn listing_rate_limit_returns_429_with_retry_after() {
    let h = harness(Options {
        max_requests: 2,
        ..Options::default()
    })
    .await;

    assert_eq!(get(&h.router, "/?secret=open-sesame").await.status(), StatusCode::OK);
    assert_eq!(get(&h.router, "/?secret=open-sesame").await.status(), StatusCode::OK);

    let limited = get(&h.router, "/?secret=open-sesame").await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.headers().get("retry-after").unwrap(), "60");
}

#[tokio::test]
async fn pagination_clamps_through_the_query_interface() {
    let h = harness(Options {
        page_size: 2,
        ..Options::default()
    })
    .await;

    for i in 0..3 {
        get(
            &h.router,
            &format!(
                "/?secret=open-sesame&url=https%3A%2F%2Fexample{}.com&title=Title{}",
                i, i
            ),
        )
        .await;
    }

    let last = json_body(get(&h.router, "/?secret=open-sesame&page=100").await).await;
    assert_eq!(last["page"], 2);
    assert_eq!(last["total_pages"], 2);
    assert_eq!(last["total"], 3);

    let first = json_body(get(&h.router, "/?secret=open-sesame&page=0").await).await;
    assert_eq!(first["page"], 1);
    assert_eq!(first["links"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn search_filters_the_listing() {
    let h = harness(Options::default()).await;

    get(
        &h.router,
        "/?secret=open-sesame&url=https%3A%2F%2Frust-lang.org&title=Rust",
    )
    .await;
    get(
        &h.router,
        "/?secret=open-sesame&url=https%3A%2F%2Fexample.com&title=News",
    )
    .await;

    let found = json_body(get(&h.router, "/?secret=open-sesame&search=rust").await).await;
    assert_eq!(found["total"], 1);
    assert_eq!(found["links"][0]["title"], "Rust");
}

#[tokio::test]
async fn proxy_downloads_allowlisted_files_only() {
    let h = harness(Options::default()).await;

    get(
        &h.router,
        "/?secret=open-sesame&url=https%3A%2F%2Fexample.com&title=Example",
    )
    .await;

    let download = get(&h.router, "/files/favorites.json?secret=open-sesame").await;
    assert_eq!(download.status(), StatusCode::OK);
    let disposition = download
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("attachment"));
    let bytes = to_bytes(download.into_body(), usize::MAX).await.unwrap();
    let favorites: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(favorites.as_array().unwrap().len(), 1);

    let unknown = get(&h.router, "/files/secrets.txt?secret=open-sesame").await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let unauthorized = get(&h.router, "/files/favorites.json?secret=wrong").await;
    assert_eq!(unauthorized.status(), StatusCode::FORBIDDEN);
    assert!(!h.intrusion_log.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn sort_order_flips_the_listing() {
    let h = harness(Options::default()).await;

    get(
        &h.router,
        "/?secret=open-sesame&url=https%3A%2F%2Ffirst.com&title=First",
    )
    .await;
    get(
        &h.router,
        "/?secret=open-sesame&url=https%3A%2F%2Fsecond.com&title=Second",
    )
    .await;

    let newest_first = json_body(get(&h.router, "/?secret=open-sesame").await).await;
    assert_eq!(newest_first["links"][0]["url"], "https://second.com");

    let oldest_first = json_body(get(&h.router, "/?secret=open-sesame&sort=asc").await).await;
    assert_eq!(oldest_first["links"][0]["url"], "https://first.com");
}
