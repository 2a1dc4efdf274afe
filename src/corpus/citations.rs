//! Citation backfill from the edge-list CSV.
//!
//! The CSV carries one `source_id,target_id` row per citation after a
//! header row; the header is skipped unconditionally. Column order is
//! fixed as `source,target` — confirm against a sample of the actual
//! dataset before trusting a new corpus drop, since historical exports
//! flipped it.

use crate::corpus::store::WorkStore;
use crate::corpus::CorpusError;
use crate::logger;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// How often to log row progress during the (large) CSV read.
const PROGRESS_EVERY_ROWS: u64 = 100_000;

/// Counters accumulated while backfilling citations.
#[derive(Debug, Default)]
pub struct CitationReport {
    /// Data rows processed (header excluded).
    pub rows: u64,
    /// Rows where both endpoints resolved and a citation was recorded.
    pub linked: u64,
    /// Rows that could not be parsed at all.
    pub skipped_rows: u64,
    /// Source id -> offending row count for rows with an unresolved
    /// endpoint.
    pub not_listed: HashMap<String, u64>,
}

/// Streams citation edges into the store.
///
/// For each row, if both external ids are known the target's internal
/// index is appended to the source work's citation list. A row with an
/// unknown endpoint increments the not-listed counter for its source id;
/// a row that does not parse is counted and skipped. Nothing here is
/// fatal.
///
/// The store must already be date-sorted: citation lists hold post-sort
/// indices.
pub fn backfill<R: Read>(reader: R, store: &mut WorkStore) -> CitationReport {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut report = CitationReport::default();
    logger::info("loading citations");
    for result in csv_reader.records() {
        report.rows += 1;
        if report.rows % PROGRESS_EVERY_ROWS == 0 {
            logger::info(&format!("citation row # {}", report.rows));
        }

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                report.skipped_rows += 1;
                logger::debug(&format!("skipping citation row {}: {}", report.rows, e));
                continue;
            }
        };

        let (source, target) = match (record.get(0), record.get(1)) {
            (Some(source), Some(target)) => (source, target),
            _ => {
                report.skipped_rows += 1;
                logger::debug(&format!("short citation row {}", report.rows));
                continue;
            }
        };

        match (store.lookup(source), store.lookup(target)) {
            (Some(source_idx), Some(target_idx)) => {
                store.append_citation(source_idx, target_idx);
                report.linked += 1;
            }
            _ => {
                logger::debug(&format!("not listed: {}", source));
                *report.not_listed.entry(source.to_string()).or_insert(0) += 1;
            }
        }
    }

    logger::info(&format!(
        "citations done: {} rows, {} linked, {} distinct not-listed sources",
        report.rows,
        report.linked,
        report.not_listed.len()
    ));
    report
}

/// Opens the citation CSV and backfills the store from it.
///
/// A missing or unreadable file is the one fatal case.
pub fn backfill_csv(path: &Path, store: &mut WorkStore) -> Result<CitationReport, CorpusError> {
    let file = File::open(path).map_err(|e| CorpusError::Unavailable {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(backfill(BufReader::new(file), store))
}
