// src/pipeline.rs
//! Batch orchestration: ingest → raw table, then raw table → enriched table +
//! dated trend snapshot. Everything runs sequentially, once per invocation.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::path::PathBuf;

use crate::aggregate::aggregate;
use crate::config::PipelineConfig;
use crate::ingest::{self, types::PostingSource};
use crate::posting::TrendRow;
use crate::storage::{self, DATE_FORMAT};
use crate::vocabulary::Vocabulary;

/// How many ranked skills the run summary logs.
pub const SUMMARY_TOP_N: usize = 5;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_runs_total", "Completed processing runs.");
        describe_counter!(
            "pipeline_postings_total",
            "Postings enriched across all runs."
        );
        describe_counter!(
            "pipeline_skill_matches_total",
            "Posting/skill matches across all runs."
        );
        describe_gauge!(
            "pipeline_last_run_ts",
            "Unix ts when the processing step last finished."
        );
    });
}

/// Summary of one processing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub date: NaiveDate,
    pub postings: usize,
    pub distinct_skills: usize,
    pub enriched_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub top: Vec<TrendRow>,
}

/// Fetch postings from every provider and overwrite the raw table.
/// Zero postings is a valid outcome and writes a header-only table; if every
/// provider failed the previous raw table is left untouched.
pub async fn ingest(
    cfg: &PipelineConfig,
    providers: &[Box<dyn PostingSource>],
    date: NaiveDate,
) -> Result<usize> {
    let scraped_date = date.format(DATE_FORMAT).to_string();
    let postings = ingest::run_once(providers, &scraped_date)
        .await
        .context("ingest failed; raw table left unchanged")?;

    if postings.is_empty() {
        tracing::warn!(target: "ingest", "no jobs extracted");
    }

    storage::write_postings(&cfg.raw_path, &postings)?;
    tracing::info!(
        target: "ingest",
        postings = postings.len(),
        path = %cfg.raw_path.display(),
        "raw table written"
    );
    Ok(postings.len())
}

/// Read the raw table, aggregate, and persist the enriched table plus the
/// snapshot for `date`. Nothing is written if the raw table cannot be read.
pub fn process(cfg: &PipelineConfig, vocabulary: &Vocabulary, date: NaiveDate) -> Result<RunReport> {
    ensure_metrics_described();

    let postings = storage::read_postings(&cfg.raw_path).with_context(|| {
        format!(
            "raw postings unavailable at {} (run ingest first)",
            cfg.raw_path.display()
        )
    })?;
    tracing::info!(target: "pipeline", postings = postings.len(), "loaded raw postings");

    let report = aggregate(vocabulary, postings, date);
    let written = storage::write_report(&cfg.processed_dir, &report)?;

    let matches: usize = report.enriched.iter().map(|e| e.skills_found.len()).sum();
    counter!("pipeline_runs_total").increment(1);
    counter!("pipeline_postings_total").increment(report.enriched.len() as u64);
    counter!("pipeline_skill_matches_total").increment(matches as u64);
    gauge!("pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

    let top = report.top(SUMMARY_TOP_N).to_vec();
    for (rank, row) in top.iter().enumerate() {
        tracing::info!(target: "pipeline", rank = rank + 1, skill = %row.skill, count = row.count, "top skill");
    }
    tracing::info!(
        target: "pipeline",
        enriched = %written.enriched.display(),
        snapshot = %written.snapshot.display(),
        "run persisted"
    );

    Ok(RunReport {
        date,
        postings: report.enriched.len(),
        distinct_skills: report.snapshot.len(),
        enriched_path: written.enriched,
        snapshot_path: written.snapshot,
        top,
    })
}

/// `ingest` followed by `process`.
pub async fn run(
    cfg: &PipelineConfig,
    providers: &[Box<dyn PostingSource>],
    vocabulary: &Vocabulary,
    date: NaiveDate,
) -> Result<RunReport> {
    ingest(cfg, providers, date).await?;
    process(cfg, vocabulary, date)
}
