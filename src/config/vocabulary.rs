// src/config/vocabulary.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::vocabulary::Vocabulary;

pub const ENV_VOCABULARY_PATH: &str = "PULSE_VOCABULARY_PATH";

/// Load a vocabulary from an explicit path. Supports TOML or JSON formats.
pub fn load_vocabulary_from(path: &Path) -> Result<Vocabulary> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading vocabulary from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let terms = parse_terms(&content, ext.as_str())
        .with_context(|| format!("parsing vocabulary {}", path.display()))?;
    Vocabulary::new(terms)
}

/// Load the vocabulary using env var + fallbacks:
/// 1) $PULSE_VOCABULARY_PATH
/// 2) config/vocabulary.toml
/// 3) config/vocabulary.json
/// 4) built-in canonical list
pub fn load_vocabulary_default() -> Result<Vocabulary> {
    if let Ok(p) = std::env::var(ENV_VOCABULARY_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_vocabulary_from(&pb);
        } else {
            return Err(anyhow!("{ENV_VOCABULARY_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/vocabulary.toml");
    if toml_p.exists() {
        return load_vocabulary_from(&toml_p);
    }
    let json_p = PathBuf::from("config/vocabulary.json");
    if json_p.exists() {
        return load_vocabulary_from(&json_p);
    }
    Ok(Vocabulary::canonical())
}

fn parse_terms(s: &str, hint_ext: &str) -> Result<Vec<String>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("terms");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported vocabulary format"))
}

fn parse_toml(s: &str) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct TomlVocabulary {
        terms: Vec<String>,
    }
    let v: TomlVocabulary = toml::from_str(s)?;
    Ok(v.terms)
}

fn parse_json(s: &str) -> Result<Vec<String>> {
    let v: Vec<String> = serde_json::from_str(s)?;
    Ok(v)
}
