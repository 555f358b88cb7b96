// src/config/mod.rs
//! Runtime configuration: paths, feed URL and bind address from env (with `.env`
//! support via `dotenvy` in the binary), plus the vocabulary file loader.

pub mod vocabulary;

use std::net::SocketAddr;
use std::path::PathBuf;

// --- env defaults & names ---
pub const DEFAULT_FEED_URL: &str =
    "https://weworkremotely.com/categories/remote-programming-jobs.rss";
pub const DEFAULT_RAW_PATH: &str = "data/raw/jobs_raw.csv";
pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

pub const ENV_FEED_URL: &str = "PULSE_FEED_URL";
pub const ENV_RAW_PATH: &str = "PULSE_RAW_PATH";
pub const ENV_PROCESSED_DIR: &str = "PULSE_PROCESSED_DIR";
pub const ENV_BIND_ADDR: &str = "PULSE_BIND_ADDR";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub feed_url: String,
    /// Raw postings table written by ingest, read by process.
    pub raw_path: PathBuf,
    /// Holds the enriched table and the dated snapshots.
    pub processed_dir: PathBuf,
    pub bind_addr: SocketAddr,
}

impl PipelineConfig {
    /// Read every setting from env, falling back to the defaults above.
    pub fn from_env() -> anyhow::Result<Self> {
        let feed_url = env_or(ENV_FEED_URL, DEFAULT_FEED_URL);
        let raw_path = PathBuf::from(env_or(ENV_RAW_PATH, DEFAULT_RAW_PATH));
        let processed_dir = PathBuf::from(env_or(ENV_PROCESSED_DIR, DEFAULT_PROCESSED_DIR));
        let bind_raw = env_or(ENV_BIND_ADDR, DEFAULT_BIND_ADDR);
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("{ENV_BIND_ADDR}=`{bind_raw}` is not a socket address: {e}"))?;

        Ok(Self {
            feed_url,
            raw_path,
            processed_dir,
            bind_addr,
        })
    }

    /// All artifacts under one root; handy for tests.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            raw_path: root.join("raw").join("jobs_raw.csv"),
            processed_dir: root.join("processed"),
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8080))),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
