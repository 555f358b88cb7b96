// src/ingest/providers/mod.rs
pub mod wwr_rss;
