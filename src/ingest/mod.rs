// src/ingest/mod.rs
pub mod providers;
pub mod types;

use anyhow::{bail, Result};

use crate::ingest::types::PostingSource;
use crate::posting::Posting;
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// Placeholder for feed fields that are missing on an item.
pub const NOT_AVAILABLE: &str = "N/A";

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_postings_total", "Total postings parsed from providers.");
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!("ingest_parse_ms", "Provider parse time in milliseconds.");
    });
}

/// Turn an HTML description into plain text: decode entities, strip tags
/// (replaced by a space so adjacent blocks don't glue together), normalize
/// typographic quotes and collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();

    // Entity-encoded markup (`&lt;p&gt;`) is decoded before tags are stripped.
    let mut out = html_escape::decode_html_entities(s).to_string();

    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // “ ” ‘ ’ « » → ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Split a feed title of the form `"Company: Role"` into `(company, title)`.
/// Titles without a colon get `N/A` as company.
pub fn split_company_title(raw: &str) -> (String, String) {
    match raw.split_once(':') {
        Some((company, title)) => (company.trim().to_string(), title.trim().to_string()),
        None => (NOT_AVAILABLE.to_string(), raw.to_string()),
    }
}

/// Run every provider once and concatenate their postings in provider order.
/// A failing provider is logged and counted. Errors only when every provider
/// failed; an empty `Ok` means the feeds had no jobs.
pub async fn run_once(
    providers: &[Box<dyn PostingSource>],
    scraped_date: &str,
) -> Result<Vec<Posting>> {
    ensure_metrics_described();

    let mut out = Vec::new();
    let mut failed = Vec::new();
    for p in providers {
        match p.fetch_postings(scraped_date).await {
            Ok(mut v) => {
                tracing::info!(target: "ingest", provider = p.name(), postings = v.len(), "provider ok");
                out.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = p.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
                failed.push(format!("{}: {e:#}", p.name()));
            }
        }
    }

    if !providers.is_empty() && failed.len() == providers.len() {
        bail!("all providers failed ({})", failed.join("; "));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_strips_tags_and_entities() {
        let s = "<p>We use&nbsp;<strong>Rust</strong></p><p>and&nbsp;Node.js</p>";
        assert_eq!(normalize_text(s), "We use Rust and Node.js");
    }

    #[test]
    fn normalize_text_handles_encoded_markup() {
        let s = "&lt;li&gt;Python&lt;/li&gt;&lt;li&gt;AWS&lt;/li&gt;";
        assert_eq!(normalize_text(s), "Python AWS");
    }

    #[test]
    fn normalize_text_keeps_sentence_punctuation() {
        assert_eq!(normalize_text("  CI/CD, c++.  "), "CI/CD, c++.");
    }

    #[test]
    fn company_title_split_on_first_colon() {
        assert_eq!(
            split_company_title("Acme Corp: Senior Engineer: Platform"),
            ("Acme Corp".to_string(), "Senior Engineer: Platform".to_string())
        );
        assert_eq!(
            split_company_title("Just a title"),
            ("N/A".to_string(), "Just a title".to_string())
        );
    }

    struct Down;

    #[async_trait::async_trait]
    impl PostingSource for Down {
        async fn fetch_postings(&self, _scraped_date: &str) -> Result<Vec<Posting>> {
            bail!("HTTP 503")
        }
        fn name(&self) -> &'static str {
            "Down"
        }
    }

    #[tokio::test]
    async fn run_once_fails_when_every_provider_fails() {
        let providers: Vec<Box<dyn PostingSource>> = vec![Box::new(Down), Box::new(Down)];
        let err = run_once(&providers, "2025-10-13").await.unwrap_err();
        assert!(format!("{err:#}").contains("HTTP 503"), "{err:#}");
    }

    #[tokio::test]
    async fn run_once_without_providers_is_empty() {
        assert!(run_once(&[], "2025-10-13").await.unwrap().is_empty());
    }
}
