use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "LINKSTASH_LISTEN_ADDR";
pub const SECRET_ENV: &str = "LINKSTASH_SECRET";
pub const DATA_DIR_ENV: &str = "LINKSTASH_DATA_DIR";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8087";
pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Parser)]
#[command(name = "linkstash-gateway")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Shared secret protecting every endpoint.
    #[arg(long, env = SECRET_ENV)]
    pub secret: String,

    /// Directory holding the favorites file, guard state, cache, and
    /// backups.
    #[arg(long, env = DATA_DIR_ENV, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Links shown per listing page.
    #[arg(long, default_value_t = 25)]
    pub max_links_per_page: usize,

    /// Maximum title length after sanitization.
    #[arg(long, default_value_t = 200)]
    pub max_title_length: usize,

    /// Days a favorite is kept before the sweep marks it for deletion.
    #[arg(long, default_value_t = 365)]
    pub retention_days: i64,

    /// Grace days between marking and purging.
    #[arg(long, default_value_t = 7)]
    pub grace_days: i64,

    /// Requests allowed per client per minute on the listing endpoint.
    #[arg(long, default_value_t = 50)]
    pub max_requests_per_minute: u32,

    /// Downloads allowed per client within the proxy's 120-second window.
    #[arg(long, default_value_t = 10)]
    pub proxy_max_requests: u32,

    /// Snapshot cache freshness window in seconds.
    #[arg(long, default_value_t = 300)]
    pub cache_ttl_secs: u64,

    /// Bounded wait for the store lock in seconds.
    #[arg(long, default_value_t = 5)]
    pub lock_timeout_secs: u64,
}
