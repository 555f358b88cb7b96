// src/ingest/types.rs
use anyhow::Result;

use crate::posting::Posting;

/// Anything that can hand the pipeline a batch of raw postings.
#[async_trait::async_trait]
pub trait PostingSource: Send + Sync {
    /// `scraped_date` is stamped onto every posting produced by this call.
    async fn fetch_postings(&self, scraped_date: &str) -> Result<Vec<Posting>>;
    fn name(&self) -> &'static str;
}
