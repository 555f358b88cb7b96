// src/aggregate.rs
//! # Aggregator
//! Pure batch transform: postings → (enriched postings, ranked trend snapshot).
//! No I/O, suitable for unit tests; persistence lives in `storage`.
//!
//! Ranking policy: count descending; equal counts keep the order in which the
//! terms were first encountered while flattening (posting order, then
//! vocabulary order inside a posting).

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::posting::{EnrichedPosting, Posting, TrendRow};
use crate::vocabulary::Vocabulary;

/// Output of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendReport {
    pub date: NaiveDate,
    pub enriched: Vec<EnrichedPosting>,
    pub snapshot: Vec<TrendRow>,
}

impl TrendReport {
    pub fn is_empty(&self) -> bool {
        self.enriched.is_empty()
    }

    /// Highest-ranked rows, at most `n`.
    pub fn top(&self, n: usize) -> &[TrendRow] {
        &self.snapshot[..self.snapshot.len().min(n)]
    }
}

/// Step 1: attach `skills_found` to every posting, preserving input order.
pub fn enrich(vocabulary: &Vocabulary, postings: Vec<Posting>) -> Vec<EnrichedPosting> {
    postings
        .into_iter()
        .map(|posting| {
            let skills_found = vocabulary.find_skills(posting.description.as_deref());
            EnrichedPosting {
                posting,
                skills_found,
            }
        })
        .collect()
}

/// Steps 2–3: flatten all `skills_found` lists and count occurrences.
/// Returned pairs are in first-encountered order.
pub fn count_skills(enriched: &[EnrichedPosting]) -> Vec<(String, u64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();

    for skill in enriched.iter().flat_map(|e| e.skills_found.iter()) {
        match index.get(skill.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(skill.as_str(), counts.len());
                counts.push((skill.clone(), 1));
            }
        }
    }
    counts
}

/// Steps 4–5: stable sort by count descending and stamp every row with `date`.
pub fn rank(mut counts: Vec<(String, u64)>, date: NaiveDate) -> Vec<TrendRow> {
    // `sort_by` is stable: ties stay in first-encountered order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(skill, count)| TrendRow { skill, count, date })
        .collect()
}

/// Full run over one batch of postings. Empty input gives an empty report.
pub fn aggregate(vocabulary: &Vocabulary, postings: Vec<Posting>, date: NaiveDate) -> TrendReport {
    let enriched = enrich(vocabulary, postings);
    let snapshot = rank(count_skills(&enriched), date);

    tracing::debug!(
        target: "pipeline",
        postings = enriched.len(),
        distinct_skills = snapshot.len(),
        %date,
        "aggregation done"
    );

    TrendReport {
        date,
        enriched,
        snapshot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(description: Option<&str>) -> Posting {
        Posting {
            title: "Engineer".into(),
            company: "Acme".into(),
            url: "https://example.test/job".into(),
            published_date: "Mon, 13 Oct 2025 10:00:00 +0000".into(),
            description: description.map(str::to_string),
            scraped_date: "2025-10-13".into(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 13).unwrap()
    }

    #[test]
    fn reference_scenario_three_postings() {
        let postings = vec![
            posting(Some(
                "Looking for a Python developer with AWS and Docker experience",
            )),
            posting(Some("Senior Java engineer, Spring Boot, SQL")),
            posting(Some("Good communicator, go-getter")),
        ];
        let report = aggregate(&Vocabulary::canonical(), postings, day());

        let found: Vec<Vec<String>> = report
            .enriched
            .iter()
            .map(|e| e.skills_found.clone())
            .collect();
        // Skills come back in vocabulary order, where "sql" precedes "spring boot".
        assert_eq!(
            found,
            vec![
                vec!["python", "aws", "docker"],
                vec!["java", "sql", "spring boot"],
                vec![],
            ]
        );

        let skills: Vec<&str> = report.snapshot.iter().map(|r| r.skill.as_str()).collect();
        assert_eq!(
            skills,
            vec!["python", "aws", "docker", "java", "sql", "spring boot"]
        );
        assert!(report.snapshot.iter().all(|r| r.count == 1 && r.date == day()));
    }

    #[test]
    fn counts_are_per_posting_and_ranked_descending() {
        let postings = vec![
            posting(Some("docker")),
            posting(Some("python python python")),
            posting(Some("python and docker")),
            posting(Some("Python, Redis")),
        ];
        let report = aggregate(&Vocabulary::canonical(), postings, day());

        let rows: Vec<(&str, u64)> = report
            .snapshot
            .iter()
            .map(|r| (r.skill.as_str(), r.count))
            .collect();
        assert_eq!(rows, vec![("python", 3), ("docker", 2), ("redis", 1)]);
        assert!(report
            .snapshot
            .windows(2)
            .all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        // "sql" is seen before "aws" even though it comes later in the vocabulary.
        let postings = vec![posting(Some("sql")), posting(Some("aws"))];
        let report = aggregate(&Vocabulary::canonical(), postings, day());
        let skills: Vec<&str> = report.snapshot.iter().map(|r| r.skill.as_str()).collect();
        assert_eq!(skills, vec!["sql", "aws"]);
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = aggregate(&Vocabulary::canonical(), Vec::new(), day());
        assert!(report.is_empty());
        assert!(report.snapshot.is_empty());
    }

    #[test]
    fn missing_descriptions_degrade_to_no_skills() {
        let postings = vec![posting(None), posting(Some(""))];
        let report = aggregate(&Vocabulary::canonical(), postings, day());
        assert_eq!(report.enriched.len(), 2);
        assert!(report.enriched.iter().all(|e| e.skills_found.is_empty()));
        assert!(report.snapshot.is_empty());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let make = || {
            vec![
                posting(Some("react vue angular")),
                posting(Some("vue react")),
                posting(Some("angular")),
            ]
        };
        let a = aggregate(&Vocabulary::canonical(), make(), day());
        let b = aggregate(&Vocabulary::canonical(), make(), day());
        assert_eq!(a, b);
    }

    #[test]
    fn top_is_clamped_to_snapshot_length() {
        let report = aggregate(&Vocabulary::canonical(), vec![posting(Some("git"))], day());
        assert_eq!(report.top(15).len(), 1);
        assert_eq!(report.top(0).len(), 0);
    }
}
