//! Tech Talent Pulse — Binary Entrypoint
//!
//! Usage: `tech-talent-pulse [run|ingest|process|serve]` (default: `run`).
//! - `run`     fetch the feed, then enrich + snapshot
//! - `ingest`  fetch the feed into the raw table only
//! - `process` enrich the existing raw table and write today's snapshot
//! - `serve`   read-only dashboard API over the processed artifacts
//!
//! Settings come from env (and `.env`); see `config`.

use std::process::ExitCode;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tech_talent_pulse::{
    api::{self, AppState},
    config::{vocabulary::load_vocabulary_default, PipelineConfig},
    dashboard::DashboardCache,
    ingest::{providers::wwr_rss::WwrRssProvider, types::PostingSource},
    metrics::Metrics,
    pipeline,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Ingest,
    Process,
    Serve,
}

impl Command {
    fn parse(arg: Option<&str>) -> Option<Self> {
        match arg.unwrap_or("run") {
            "run" => Some(Self::Run),
            "ingest" => Some(Self::Ingest),
            "process" => Some(Self::Process),
            "serve" => Some(Self::Serve),
            _ => None,
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn providers(cfg: &PipelineConfig) -> Result<Vec<Box<dyn PostingSource>>> {
    Ok(vec![Box::new(WwrRssProvider::from_url(cfg.feed_url.clone())?)])
}

async fn serve(cfg: &PipelineConfig) -> Result<()> {
    let metrics = Metrics::init()?;
    let state = AppState::new(DashboardCache::new(cfg.processed_dir.clone()));
    let app = api::create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, dir = %cfg.processed_dir.display(), "dashboard api listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn execute(cmd: Command) -> Result<()> {
    let cfg = PipelineConfig::from_env()?;
    match cmd {
        Command::Run => {
            let vocabulary = load_vocabulary_default()?;
            let report = pipeline::run(&cfg, &providers(&cfg)?, &vocabulary, today()).await?;
            tracing::info!(
                postings = report.postings,
                skills = report.distinct_skills,
                snapshot = %report.snapshot_path.display(),
                "pipeline finished"
            );
        }
        Command::Ingest => {
            pipeline::ingest(&cfg, &providers(&cfg)?, today()).await?;
        }
        Command::Process => {
            let vocabulary = load_vocabulary_default()?;
            pipeline::process(&cfg, &vocabulary, today())?;
        }
        Command::Serve => serve(&cfg).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    tech_talent_pulse::init_tracing();

    let arg = std::env::args().nth(1);
    let Some(cmd) = Command::parse(arg.as_deref()) else {
        eprintln!("usage: tech-talent-pulse [run|ingest|process|serve]");
        return ExitCode::from(2);
    };

    match execute(cmd).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let msg = format!("{e:#}");
            tracing::error!(error = %msg, command = ?cmd, "run aborted");
            ExitCode::FAILURE
        }
    }
}
