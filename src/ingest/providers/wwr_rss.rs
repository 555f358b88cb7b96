// src/ingest/providers/wwr_rss.rs
//! WeWorkRemotely category RSS feed. The `<description>` of each item carries
//! the full HTML job description, so no per-job page fetch is needed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::types::PostingSource;
use crate::ingest::{normalize_text, split_company_title, NOT_AVAILABLE};
use crate::posting::Posting;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

pub struct WwrRssProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
    },
}

impl WwrRssProvider {
    pub fn from_fixture(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("building feed http client")?;
        Ok(Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        })
    }

    fn parse_items_from_str(s: &str, scraped_date: &str) -> Result<Vec<Posting>> {
        let t0 = std::time::Instant::now();
        let rss: Rss = from_str(s).context("parsing wwr rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let raw_title = it
                .title
                .as_deref()
                .map(str::trim)
                .unwrap_or(NOT_AVAILABLE);
            let (company, title) = split_company_title(raw_title);
            let description = normalize_text(it.description.as_deref().unwrap_or_default());

            tracing::debug!(target: "ingest", %title, %company, "parsed item");

            out.push(Posting {
                title,
                company,
                url: it.link.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                published_date: it.pub_date.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                description: Some(description),
                scraped_date: scraped_date.to_string(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_postings_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl PostingSource for WwrRssProvider {
    async fn fetch_postings(&self, scraped_date: &str) -> Result<Vec<Posting>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s, scraped_date),
            Mode::Http { url, client } => {
                let body = client
                    .get(url.as_str())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .with_context(|| format!("wwr http get {url}"))?
                    .text()
                    .await
                    .context("wwr http .text()")?;
                Self::parse_items_from_str(&body, scraped_date)
            }
        }
    }

    fn name(&self) -> &'static str {
        "WeWorkRemotely"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>We Work Remotely: Remote Programming Jobs</title>
    <item>
      <title>Acme: Senior Rust Engineer</title>
      <link>https://weworkremotely.com/remote-jobs/acme-senior-rust-engineer</link>
      <pubDate>Mon, 13 Oct 2025 10:00:00 +0000</pubDate>
      <description>&lt;p&gt;We use &lt;b&gt;Docker&lt;/b&gt; and AWS&lt;/p&gt;</description>
    </item>
    <item>
      <title>Untitled role</title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_and_splits_company() {
        let out = WwrRssProvider::parse_items_from_str(XML, "2025-10-13").unwrap();
        assert_eq!(out.len(), 2);

        assert_eq!(out[0].company, "Acme");
        assert_eq!(out[0].title, "Senior Rust Engineer");
        assert_eq!(out[0].description.as_deref(), Some("We use Docker and AWS"));
        assert_eq!(out[0].scraped_date, "2025-10-13");

        assert_eq!(out[1].company, "N/A");
        assert_eq!(out[1].url, "N/A");
        assert_eq!(out[1].published_date, "N/A");
        assert_eq!(out[1].description.as_deref(), Some(""));
    }

    #[test]
    fn garbage_xml_is_an_error() {
        assert!(WwrRssProvider::parse_items_from_str("<html>nope", "2025-10-13").is_err());
    }
}
