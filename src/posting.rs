// src/posting.rs
//! Records flowing through the pipeline: raw postings, enriched postings,
//! and trend snapshot rows.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Separator used when `skills_found` is flattened into a single CSV cell.
pub const SKILLS_DELIMITER: &str = ";";

/// One job listing as supplied by the ingestion side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub title: String,
    pub company: String,
    pub url: String,
    /// Source-provided, kept verbatim.
    pub published_date: String,
    /// Free text; anything that is not a non-empty string is kept as `None`.
    #[serde(default, deserialize_with = "text_or_none")]
    pub description: Option<String>,
    pub scraped_date: String,
}

/// A posting plus the skills detected in its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedPosting {
    pub posting: Posting,
    pub skills_found: Vec<String>,
}

impl EnrichedPosting {
    /// `skills_found` flattened for the CSV column, e.g. `python;aws`.
    pub fn skills_cell(&self) -> String {
        join_skills(&self.skills_found)
    }
}

/// One row of a trend snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendRow {
    pub skill: String,
    pub count: u64,
    pub date: NaiveDate,
}

pub fn join_skills(skills: &[String]) -> String {
    skills.join(SKILLS_DELIMITER)
}

pub fn split_skills(cell: &str) -> Vec<String> {
    cell.split(SKILLS_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts any value for a free-text field and keeps only non-empty strings.
/// Numbers, booleans, nulls and nested values degrade to `None`.
fn text_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Text(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}
