// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod posting;
pub mod storage;
pub mod vocabulary;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate, TrendReport};
pub use crate::api::create_router;
pub use crate::posting::{EnrichedPosting, Posting, TrendRow};
pub use crate::vocabulary::Vocabulary;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_JSON: &str = "PULSE_LOG_JSON";

/// Install the global tracing subscriber.
/// `RUST_LOG` overrides the default filter; `PULSE_LOG_JSON=1` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("tech_talent_pulse=info,ingest=info,pipeline=info,dashboard=info,warn")
    });

    let json = std::env::var(ENV_LOG_JSON)
        .ok()
        .is_some_and(|v| v == "1");

    // try_init: a second call (tests, embedding) keeps the first subscriber.
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        let _ = registry.with(fmt::layer().json()).try_init();
    } else {
        let _ = registry.with(fmt::layer().compact()).try_init();
    }
}
