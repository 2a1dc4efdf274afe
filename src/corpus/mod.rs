//! Corpus layer for the APS graph builder.
//!
//! This module owns everything up to the point where works are ready for
//! graph extraction:
//! - Author identity assignment (`AuthorRegistry`)
//! - The per-work record store with date sorting and dense reindexing
//!   (`WorkStore`)
//! - Directory-driven ingestion of the raw JSON metadata tree
//! - Citation backfill from the edge-list CSV
//!
//! The registry and the store are populated once during ingestion and are
//! read-only afterwards; neither is safe for concurrent mutation.

pub mod citations;
pub mod ingestion;
pub mod registry;
pub mod store;

#[cfg(test)]
pub mod tests;

use std::path::PathBuf;
use thiserror::Error;

/// Fatal corpus-level failure. Everything else during ingestion and
/// backfill is recovered per-file or per-row and counted.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
