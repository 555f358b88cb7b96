// src/storage.rs
//! Flat CSV artifacts.
//!
//! - raw table: `jobs_raw.csv`, overwritten by every ingest
//! - enriched table: `<processed>/jobs_enriched.csv`, overwritten by every run
//! - trend snapshots: `<processed>/skills_trend_YYYY-MM-DD.csv`, one per date
//!
//! Files are rendered fully in memory, then written to a `.tmp` sibling and
//! renamed, so a failed run never leaves a truncated artifact behind.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::TrendReport;
use crate::posting::{split_skills, EnrichedPosting, Posting, TrendRow};

pub const ENRICHED_FILE: &str = "jobs_enriched.csv";
pub const SNAPSHOT_PREFIX: &str = "skills_trend_";
pub const SNAPSHOT_EXT: &str = ".csv";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// CSV row layout shared by the raw and enriched tables.
#[derive(Debug, Serialize, Deserialize)]
struct PostingRow {
    title: String,
    company: String,
    url: String,
    published_date: String,
    #[serde(default)]
    description: String,
    scraped_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    skills_found: Option<String>,
}

impl PostingRow {
    fn from_posting(p: &Posting, skills: Option<String>) -> Self {
        Self {
            title: p.title.clone(),
            company: p.company.clone(),
            url: p.url.clone(),
            published_date: p.published_date.clone(),
            description: p.description.clone().unwrap_or_default(),
            scraped_date: p.scraped_date.clone(),
            skills_found: skills,
        }
    }

    fn into_posting(self) -> (Posting, Option<String>) {
        let description = Some(self.description).filter(|d| !d.is_empty());
        let posting = Posting {
            title: self.title,
            company: self.company,
            url: self.url,
            published_date: self.published_date,
            description,
            scraped_date: self.scraped_date,
        };
        (posting, self.skills_found)
    }
}

pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("{SNAPSHOT_PREFIX}{}{SNAPSHOT_EXT}", date.format(DATE_FORMAT))
}

pub fn snapshot_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(snapshot_file_name(date))
}

pub fn enriched_path(dir: &Path) -> PathBuf {
    dir.join(ENRICHED_FILE)
}

/* ----------------------------
Rendering (pure)
---------------------------- */

pub fn render_postings(postings: &[Posting]) -> Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    // Header is written explicitly so an empty table still has its columns.
    w.write_record([
        "title",
        "company",
        "url",
        "published_date",
        "description",
        "scraped_date",
    ])?;
    for p in postings {
        let row = PostingRow::from_posting(p, None);
        w.write_record([
            &row.title,
            &row.company,
            &row.url,
            &row.published_date,
            &row.description,
            &row.scraped_date,
        ])?;
    }
    w.into_inner().map_err(|e| anyhow!("flushing raw csv: {}", e))
}

pub fn render_enriched(enriched: &[EnrichedPosting]) -> Result<Vec<u8>> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    w.write_record([
        "title",
        "company",
        "url",
        "published_date",
        "description",
        "scraped_date",
        "skills_found",
    ])?;
    for e in enriched {
        w.serialize(PostingRow::from_posting(&e.posting, Some(e.skills_cell())))?;
    }
    w.into_inner()
        .map_err(|e| anyhow!("flushing enriched csv: {}", e))
}

pub fn render_snapshot(rows: &[TrendRow]) -> Result<Vec<u8>> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    w.write_record(["skill", "count", "date"])?;
    for r in rows {
        w.serialize(r)?;
    }
    w.into_inner()
        .map_err(|e| anyhow!("flushing snapshot csv: {}", e))
}

/* ----------------------------
Reading
---------------------------- */

/// Read the raw postings table. Any unreadable or malformed record is fatal.
pub fn read_postings(path: &Path) -> Result<Vec<Posting>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("opening raw postings {}", path.display()))?;
    let mut out = Vec::new();
    for (i, rec) in rdr.deserialize::<PostingRow>().enumerate() {
        let row = rec.with_context(|| format!("{}: bad record #{}", path.display(), i + 1))?;
        out.push(row.into_posting().0);
    }
    Ok(out)
}

pub fn read_enriched(path: &Path) -> Result<Vec<EnrichedPosting>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("opening enriched postings {}", path.display()))?;
    let mut out = Vec::new();
    for (i, rec) in rdr.deserialize::<PostingRow>().enumerate() {
        let row = rec.with_context(|| format!("{}: bad record #{}", path.display(), i + 1))?;
        let (posting, skills) = row.into_posting();
        out.push(EnrichedPosting {
            posting,
            skills_found: skills.as_deref().map(split_skills).unwrap_or_default(),
        });
    }
    Ok(out)
}

pub fn read_snapshot(path: &Path) -> Result<Vec<TrendRow>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("opening snapshot {}", path.display()))?;
    rdr.deserialize::<TrendRow>()
        .map(|r| r.with_context(|| format!("{}: bad snapshot row", path.display())))
        .collect()
}

/// Latest snapshot in `dir`: the lexicographically greatest
/// `skills_trend_*.csv` name. A missing directory counts as "no snapshot".
pub fn latest_snapshot(dir: &Path) -> Result<Option<(NaiveDate, PathBuf)>> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("listing {}", dir.display())),
    };

    let mut best: Option<(String, NaiveDate)> = None;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(date) = snapshot_date_from_name(&name) else {
            continue;
        };
        if best.as_ref().map_or(true, |(b, _)| name > *b) {
            best = Some((name, date));
        }
    }
    Ok(best.map(|(name, date)| (date, dir.join(name))))
}

fn snapshot_date_from_name(name: &str) -> Option<NaiveDate> {
    let stem = name
        .strip_prefix(SNAPSHOT_PREFIX)?
        .strip_suffix(SNAPSHOT_EXT)?;
    NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()
}

/* ----------------------------
Writing
---------------------------- */

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Write `bytes` to the `.tmp` sibling of `path`, creating parent directories.
fn stage(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let tmp = tmp_sibling(path);
    fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
    Ok(tmp)
}

fn commit(tmp: &Path, path: &Path) -> Result<()> {
    fs::rename(tmp, path).with_context(|| format!("renaming into {}", path.display()))
}

/// Write via a temporary sibling + rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = stage(path, bytes)?;
    commit(&tmp, path)
}

pub fn write_postings(path: &Path, postings: &[Posting]) -> Result<()> {
    write_atomic(path, &render_postings(postings)?)
}

/// Paths written by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub enriched: PathBuf,
    pub snapshot: PathBuf,
}

/// Persist both outputs of a run. Both files are staged as `.tmp` siblings
/// before either is renamed into place; a failed staging step removes what it
/// left behind and touches neither published artifact.
pub fn write_report(dir: &Path, report: &TrendReport) -> Result<WrittenArtifacts> {
    let enriched_bytes = render_enriched(&report.enriched)?;
    let snapshot_bytes = render_snapshot(&report.snapshot)?;

    let enriched = enriched_path(dir);
    let snapshot = snapshot_path(dir, report.date);

    let enriched_tmp = stage(&enriched, &enriched_bytes)?;
    let snapshot_tmp = match stage(&snapshot, &snapshot_bytes) {
        Ok(tmp) => tmp,
        Err(e) => {
            let _ = fs::remove_file(&enriched_tmp);
            return Err(e);
        }
    };

    commit(&snapshot_tmp, &snapshot)?;
    commit(&enriched_tmp, &enriched)?;

    Ok(WrittenArtifacts { enriched, snapshot })
}
