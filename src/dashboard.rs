// src/dashboard.rs
//! # Dashboard data layer
//! Read-only view over the persisted artifacts: the enriched job table and
//! the most recent trend snapshot. Loaded lazily into [`DashboardCache`] and
//! dropped again on an explicit [`DashboardCache::invalidate`].

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::posting::{EnrichedPosting, TrendRow};
use crate::storage;

pub const NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_TOP_N: usize = 15;
pub const NO_TREND_DATA: &str = "No trend data available.";

/// Everything the presentation layer needs, loaded from one processed dir.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub jobs: Vec<EnrichedPosting>,
    pub trends: Vec<TrendRow>,
    /// Date of the snapshot in `trends`; `None` when no snapshot exists.
    pub data_date: Option<NaiveDate>,
}

/// Row shown in the job list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobView {
    pub title: String,
    pub company: String,
    pub published_date: String,
    pub url: String,
    pub skills_found: Vec<String>,
}

/// Headline numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_jobs: usize,
    pub latest_update: String,
    pub top_skill: String,
    pub message: String,
}

impl DashboardData {
    /// The enriched table is required; a missing snapshot only yields an
    /// empty trend list.
    pub fn load(dir: &Path) -> Result<Self> {
        let jobs_path = storage::enriched_path(dir);
        if !jobs_path.exists() {
            return Err(anyhow!(
                "job data not found at {}; run the pipeline first",
                jobs_path.display()
            ));
        }
        let jobs = storage::read_enriched(&jobs_path)?;

        let (trends, data_date) = match storage::latest_snapshot(dir)? {
            Some((date, path)) => (storage::read_snapshot(&path)?, Some(date)),
            None => {
                tracing::warn!(target: "dashboard", dir = %dir.display(), "no trend data found");
                (Vec::new(), None)
            }
        };

        tracing::info!(
            target: "dashboard",
            jobs = jobs.len(),
            trends = trends.len(),
            date = ?data_date,
            "dashboard data loaded"
        );
        Ok(Self {
            jobs,
            trends,
            data_date,
        })
    }

    pub fn latest_update(&self) -> String {
        self.data_date
            .map(|d| d.format(storage::DATE_FORMAT).to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Top skill, title-cased for display.
    pub fn top_skill(&self) -> String {
        self.trends
            .first()
            .map(|r| title_case(&r.skill))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn summary(&self) -> Summary {
        let top_skill = self.top_skill();
        let message = if self.trends.is_empty() {
            NO_TREND_DATA.to_string()
        } else {
            format!("The data suggests that {top_skill} is currently the dominant skill in the remote market.")
        };
        Summary {
            total_jobs: self.jobs.len(),
            latest_update: self.latest_update(),
            top_skill,
            message,
        }
    }

    pub fn top_skills(&self, n: usize) -> &[TrendRow] {
        &self.trends[..self.trends.len().min(n)]
    }

    /// Case-insensitive substring filter over title and the skills column.
    /// A blank query returns every job.
    pub fn filter_jobs(&self, query: &str) -> Vec<JobView> {
        let q = query.trim().to_lowercase();
        self.jobs
            .iter()
            .filter(|j| {
                q.is_empty()
                    || j.posting.title.to_lowercase().contains(&q)
                    || j.skills_cell().to_lowercase().contains(&q)
            })
            .map(JobView::from)
            .collect()
    }
}

impl From<&EnrichedPosting> for JobView {
    fn from(e: &EnrichedPosting) -> Self {
        Self {
            title: e.posting.title.clone(),
            company: e.posting.company.clone(),
            published_date: e.posting.published_date.clone(),
            url: e.posting.url.clone(),
            skills_found: e.skills_found.clone(),
        }
    }
}

/// Uppercase the first letter of every whitespace-separated word.
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(f) => f.to_uppercase().chain(cs).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/* ----------------------------
Lazily loaded, explicitly invalidated cache
---------------------------- */

/// Holds at most one loaded [`DashboardData`]; loads on first use and keeps
/// serving it until [`invalidate`](Self::invalidate) is called.
#[derive(Debug, Clone)]
pub struct DashboardCache {
    dir: PathBuf,
    inner: Arc<RwLock<Option<Arc<DashboardData>>>>,
}

impl DashboardCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            inner: Arc::new(RwLock::new(None)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().map(|g| g.is_some()).unwrap_or(false)
    }

    /// Return the cached data, loading it on first use. Load errors are not
    /// cached; the next call retries.
    pub fn get_or_load(&self) -> Result<Arc<DashboardData>> {
        if let Ok(guard) = self.inner.read() {
            if let Some(d) = guard.as_ref() {
                return Ok(d.clone());
            }
        }

        let mut guard = self
            .inner
            .write()
            .map_err(|_| anyhow!("dashboard cache lock poisoned"))?;
        // Another caller may have loaded while we waited for the write lock.
        if let Some(d) = guard.as_ref() {
            return Ok(d.clone());
        }
        let data = Arc::new(DashboardData::load(&self.dir)?);
        *guard = Some(data.clone());
        Ok(data)
    }

    /// Drop the cached data; the next `get_or_load` reads from disk again.
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
        tracing::info!(target: "dashboard", "cache invalidated");
    }
}
