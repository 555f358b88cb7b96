// src/vocabulary.rs
//! Skill vocabulary and whole-word matcher.
//!
//! The vocabulary is a fixed, ordered list of lowercase technology terms.
//! Matching is case-insensitive and boundary-aware: a term only counts when
//! the characters around it are non-word characters (or the text edges), and
//! punctuation inside a term (`node.js`, `ci/cd`, `c++`) is matched literally.

use regex::Regex;
use std::collections::HashSet;

/// Canonical term list used when no vocabulary file is configured.
pub const DEFAULT_TERMS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "react",
    "angular",
    "vue",
    "aws",
    "azure",
    "gcp",
    "docker",
    "kubernetes",
    "linux",
    "sql",
    "postgresql",
    "mysql",
    "mongodb",
    "redis",
    "django",
    "flask",
    "fastapi",
    "spring boot",
    "node.js",
    "machine learning",
    "ai",
    "pytorch",
    "tensorflow",
    "pandas",
    "numpy",
    "git",
    "ci/cd",
    "jenkins",
    "terraform",
    "agile",
    "scrum",
];

#[derive(Debug)]
struct CompiledTerm {
    term: String,
    re: Regex,
}

/// Fixed set of skill terms with one compiled boundary pattern per term.
///
/// Order is insertion order of the source list; it drives the order of
/// `skills_found` and the fallback order of ranking ties.
#[derive(Debug)]
pub struct Vocabulary {
    terms: Vec<CompiledTerm>,
}

impl Vocabulary {
    /// Build from any list of terms. Terms are trimmed and lowercased;
    /// empties are dropped and later duplicates are ignored.
    pub fn new<I, S>(terms: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut compiled = Vec::new();
        for raw in terms {
            let term = raw.as_ref().trim().to_lowercase();
            if term.is_empty() {
                continue;
            }
            if !seen.insert(term.clone()) {
                tracing::warn!(target: "vocabulary", %term, "duplicate term ignored");
                continue;
            }
            let re = boundary_regex(&term)
                .map_err(|e| anyhow::anyhow!("term `{}` regex error: {}", term, e))?;
            compiled.push(CompiledTerm { term, re });
        }
        Ok(Self { terms: compiled })
    }

    /// The built-in technology list.
    pub fn canonical() -> Self {
        Self::new(DEFAULT_TERMS).expect("canonical vocabulary compiles")
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.term.as_str())
    }

    /// Terms found in `text`, in vocabulary order, each at most once.
    ///
    /// A missing description (`None`) yields an empty list.
    pub fn find_skills(&self, text: Option<&str>) -> Vec<String> {
        let Some(text) = text else {
            return Vec::new();
        };
        if text.is_empty() {
            return Vec::new();
        }

        let lowered = text.to_lowercase();
        self.terms
            .iter()
            .filter(|t| t.re.is_match(&lowered))
            .map(|t| t.term.clone())
            .collect()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::canonical()
    }
}

/// `(?:^|\W)` + literal term + `(?:\W|$)`.
///
/// `\b` is not enough for terms that start or end in punctuation (`c++`),
/// so the boundary is expressed as "non-word char or edge" on both sides.
fn boundary_regex(term: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?:^|\W){}(?:\W|$)", regex::escape(term)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::canonical()
    }

    #[test]
    fn canonical_list_has_no_duplicates() {
        let v = vocab();
        assert_eq!(v.len(), DEFAULT_TERMS.len());
        assert_eq!(v.terms().next(), Some("python"));
    }

    #[test]
    fn matches_are_case_insensitive_and_in_vocabulary_order() {
        let found = vocab().find_skills(Some("Docker, then AWS, then PYTHON"));
        assert_eq!(found, vec!["python", "aws", "docker"]);
    }

    #[test]
    fn substring_only_occurrence_is_rejected() {
        let v = vocab();
        assert!(v.find_skills(Some("a reactive mindset")).is_empty());
        assert!(v.find_skills(Some("javascripting")).is_empty());
        assert_eq!(v.find_skills(Some("react.")), vec!["react"]);
    }

    #[test]
    fn punctuated_terms_match_literally() {
        let v = vocab();
        assert_eq!(v.find_skills(Some("node.js backend")), vec!["node.js"]);
        assert!(v.find_skills(Some("nodejs backend")).is_empty());
        assert_eq!(v.find_skills(Some("own the CI/CD setup")), vec!["ci/cd"]);
    }

    #[test]
    fn trailing_punctuation_terms_need_edges() {
        let v = Vocabulary::new(["c++"]).unwrap();
        assert_eq!(v.find_skills(Some("modern c++ (17)")), vec!["c++"]);
        assert_eq!(v.find_skills(Some("c++")), vec!["c++"]);
        assert!(v.find_skills(Some("c++x")).is_empty());
    }

    #[test]
    fn repeated_term_is_reported_once() {
        let found = vocab().find_skills(Some("sql sql SQL"));
        assert_eq!(found, vec!["sql"]);
    }

    #[test]
    fn absent_or_empty_text_yields_nothing() {
        let v = vocab();
        assert!(v.find_skills(None).is_empty());
        assert!(v.find_skills(Some("")).is_empty());
    }

    #[test]
    fn new_normalizes_and_dedups_preserving_order() {
        let v = Vocabulary::new([" Rust ", "", "go", "RUST", "ci/cd"]).unwrap();
        assert_eq!(v.terms().collect::<Vec<_>>(), vec!["rust", "go", "ci/cd"]);
    }
}
