use anyhow::Context;
use clap::Parser;
use linkstash_cache::{FileCacheConfig, FileSnapshotCache};
use linkstash_core::{Blacklist, Clock, Notifier, SystemClock};
use linkstash_gateway::app::App;
use linkstash_gateway::cli::Cli;
use linkstash_gateway::notify::FileExportNotifier;
use linkstash_gateway::state::AppState;
use linkstash_guard::{IntrusionLog, RateLimitConfig, RateLimiter};
use linkstash_store::{FavoritesStore, FileLock, StoreConfig};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let cache = Arc::new(
        FileSnapshotCache::new(
            FileCacheConfig::builder()
                .dir(cli.data_dir.join("cache"))
                .ttl(Duration::from_secs(cli.cache_ttl_secs))
                .build(),
        )
        .await
        .context("initialize snapshot cache")?,
    );

    let lock = Arc::new(FileLock::new(
        cli.data_dir.join("favorites.lock"),
        Duration::from_secs(cli.lock_timeout_secs),
    ));

    let store = Arc::new(
        FavoritesStore::new(
            StoreConfig::builder()
                .path(cli.data_dir.join("favorites.json"))
                .max_title_length(cli.max_title_length)
                .retention_days(cli.retention_days)
                .grace_days(cli.grace_days)
                .build(),
            lock,
            Arc::clone(&cache),
            Arc::clone(&clock),
        )
        .await
        .context("open favorites store")?,
    );

    let guard_dir = cli.data_dir.join("guard");
    let limiter = Arc::new(
        RateLimiter::new(
            RateLimitConfig::builder()
                .dir(guard_dir.clone())
                .max_requests(cli.max_requests_per_minute)
                .window_secs(60)
                .build(),
            Arc::clone(&clock),
        )
        .await
        .context("initialize rate limiter")?,
    );
    let proxy_limiter = Arc::new(
        RateLimiter::new(
            RateLimitConfig::builder()
                .dir(guard_dir.join("proxy"))
                .max_requests(cli.proxy_max_requests)
                .window_secs(120)
                .build(),
            Arc::clone(&clock),
        )
        .await
        .context("initialize proxy rate limiter")?,
    );

    let intrusion_log = Arc::new(
        IntrusionLog::new(cli.data_dir.join("intruder.json"), Arc::clone(&clock))
            .await
            .context("open intrusion log")?,
    );

    let blacklist_path = cli.data_dir.join("blacklist.txt");
    let blacklist = match tokio::fs::read_to_string(&blacklist_path).await {
        Ok(text) => Blacklist::parse(&text),
        Err(e) if e.kind() == ErrorKind::NotFound => Blacklist::default(),
        Err(e) => {
            return Err(e).context(format!("read blacklist {}", blacklist_path.display()));
        }
    };

    let notifier: Arc<dyn Notifier> =
        Arc::new(FileExportNotifier::new(cli.data_dir.join("backups")).await?);

    let state = AppState {
        store,
        cache,
        limiter,
        proxy_limiter,
        intrusion_log,
        blacklist: Arc::new(blacklist),
        notifier,
        secret: Arc::from(cli.secret.as_str()),
        page_size: cli.max_links_per_page,
        data_dir: cli.data_dir.clone(),
    };

    info!(
        listen_addr = %cli.listen_addr,
        data_dir = %cli.data_dir.display(),
        "starting linkstash gateway"
    );

    let listener = tokio::net::TcpListener::bind(cli.listen_addr)
        .await
        .context("bind listen address")?;
    axum::serve(
        listener,
        App::router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("serve")?;

    Ok(())
}
