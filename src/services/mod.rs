//! Core services for discovery, reading, enrichment, writing and orchestration

pub mod discover;
pub mod enrich;
pub mod import;
pub mod progress;
pub mod reader;
pub mod run_token;
pub mod sink;
