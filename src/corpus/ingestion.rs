//! Directory-driven ingestion of raw work metadata.
//!
//! The corpus is laid out as `works_dir/publisher/edition/work.json`. Every
//! work file is parsed independently; a malformed file never aborts the
//! run. Each recovered failure is recorded in the `IngestReport` so the
//! final summary shows exactly what was dropped and why. Only an
//! unreadable corpus root is fatal.

use crate::corpus::registry::AuthorRegistry;
use crate::corpus::store::{Work, WorkStore};
use crate::corpus::CorpusError;
use crate::logger;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Per-file ingestion failure. All variants are recovered: the work is
/// dropped and recorded, and the surrounding scan continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    /// Unparseable JSON, missing `id`, or missing/unparseable `date`.
    #[error("malformed work record: {0}")]
    MalformedRecord(String),
    /// No author list, or no entry in it carried a usable name. The
    /// payload is the number of entries the source listed.
    #[error("work has no parseable authors ({0} listed)")]
    NoAuthors(usize),
    /// The configured `authors_limit` ceiling was exceeded.
    #[error("authors limit exceeded: {0} authors")]
    AuthorsLimitExceeded(usize),
}

/// Reason tag persisted in `ignored_works.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    MalformedRecord,
    NoAuthors,
    AuthorsLimitExceeded,
}

/// One dropped work, kept for operator inspection.
#[derive(Debug, Clone, Serialize)]
pub struct IgnoredWork {
    pub path: String,
    pub reason: IgnoreReason,
    pub authors_count: usize,
}

/// Counters accumulated over a whole corpus scan.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Publisher directories scanned.
    pub publishers: usize,
    /// Work files seen, including ones later dropped.
    pub works_seen: usize,
    /// Works successfully added to the store.
    pub works_retrieved: usize,
    /// Author entries skipped inside otherwise-valid works.
    pub anomalous_authors: usize,
    /// Works dropped, with reasons.
    pub ignored: Vec<IgnoredWork>,
}

/// A successfully parsed work plus its per-author anomaly count.
#[derive(Debug)]
pub struct ParsedWork {
    pub work: Work,
    pub skipped_authors: usize,
}

/// Parses the leading `YYYY-MM-DD` of an ISO-like date string.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Extracts a `Work` from one raw JSON record.
///
/// Author entries that are not objects or carry no `name` field are
/// skipped and counted without failing the work; the author-id counter is
/// not advanced for them. The returned author list preserves source
/// order and may contain duplicate ids.
pub fn parse_work(
    file_id: &str,
    raw: &Value,
    registry: &mut AuthorRegistry,
    authors_limit: Option<usize>,
) -> Result<ParsedWork, IngestError> {
    let record = raw
        .as_object()
        .ok_or_else(|| IngestError::MalformedRecord("not a JSON object".to_string()))?;

    let external_id = record
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| IngestError::MalformedRecord("missing id".to_string()))?;

    let raw_date = record
        .get("date")
        .and_then(Value::as_str)
        .ok_or_else(|| IngestError::MalformedRecord("missing date".to_string()))?;
    let publication_date = parse_date(raw_date)
        .ok_or_else(|| IngestError::MalformedRecord(format!("unparseable date: {}", raw_date)))?;

    // An absent author list signals zero authors for this work.
    let listed = match record.get("authors") {
        None => return Err(IngestError::NoAuthors(0)),
        Some(value) => value
            .as_array()
            .ok_or_else(|| IngestError::MalformedRecord("authors is not a list".to_string()))?,
    };

    if let Some(limit) = authors_limit {
        if listed.len() > limit {
            return Err(IngestError::AuthorsLimitExceeded(listed.len()));
        }
    }

    let mut authors = Vec::with_capacity(listed.len());
    let mut skipped_authors = 0;
    for entry in listed {
        // `Value::get` returns None for non-object entries as well as for
        // objects without a `name`, which covers both anomaly shapes.
        match entry.get("name").and_then(Value::as_str) {
            Some(name) => authors.push(registry.resolve(name)),
            None => {
                skipped_authors += 1;
                logger::debug(&format!(
                    "author entry without a name in {}: {}",
                    file_id, entry
                ));
            }
        }
    }

    if authors.is_empty() {
        return Err(IngestError::NoAuthors(listed.len()));
    }

    Ok(ParsedWork {
        work: Work::new(external_id.to_string(), publication_date, authors),
        skipped_authors,
    })
}

fn ignore_entry(path: String, error: &IngestError) -> IgnoredWork {
    let (reason, authors_count) = match error {
        IngestError::MalformedRecord(_) => (IgnoreReason::MalformedRecord, 0),
        IngestError::NoAuthors(listed) => (IgnoreReason::NoAuthors, *listed),
        IngestError::AuthorsLimitExceeded(listed) => (IgnoreReason::AuthorsLimitExceeded, *listed),
    };
    IgnoredWork {
        path,
        reason,
        authors_count,
    }
}

/// Reads and ingests a single work file, recovering every failure into
/// the report.
fn ingest_file(
    path: &Path,
    registry: &mut AuthorRegistry,
    store: &mut WorkStore,
    authors_limit: Option<usize>,
    report: &mut IngestReport,
) {
    let display = path.to_string_lossy().into_owned();

    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            logger::debug(&format!("unreadable work file {}: {}", display, e));
            report.ignored.push(IgnoredWork {
                path: display,
                reason: IgnoreReason::MalformedRecord,
                authors_count: 0,
            });
            return;
        }
    };

    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            logger::debug(&format!("invalid JSON in {}: {}", display, e));
            report.ignored.push(IgnoredWork {
                path: display,
                reason: IgnoreReason::MalformedRecord,
                authors_count: 0,
            });
            return;
        }
    };

    match parse_work(&display, &value, registry, authors_limit) {
        Ok(parsed) => {
            report.anomalous_authors += parsed.skipped_authors;
            report.works_retrieved += 1;
            store.insert(parsed.work);
        }
        Err(e) => {
            logger::debug(&format!("ignoring {}: {}", display, e));
            report.ignored.push(ignore_entry(display, &e));
        }
    }
}

/// Returns directory entries sorted by file name.
///
/// `read_dir` order is platform-dependent; sorting keeps author-id
/// assignment reproducible across runs of the same corpus.
fn sorted_entries(dir: &Path) -> std::io::Result<Vec<fs::DirEntry>> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

/// Walks the whole `publisher/edition/work.json` tree and ingests every
/// work file into the store.
///
/// A missing or unreadable corpus root aborts with
/// `CorpusError::Unavailable`; an unreadable subdirectory is logged and
/// skipped.
pub fn load_works(
    works_dir: &Path,
    registry: &mut AuthorRegistry,
    store: &mut WorkStore,
    authors_limit: Option<usize>,
) -> Result<IngestReport, CorpusError> {
    let publishers = sorted_entries(works_dir).map_err(|e| CorpusError::Unavailable {
        path: works_dir.to_path_buf(),
        source: e,
    })?;

    let mut report = IngestReport::default();
    for publisher in publishers {
        let publisher_path = publisher.path();
        if !publisher_path.is_dir() {
            continue;
        }
        report.publishers += 1;
        logger::info(&format!(
            "publisher # {}: {}",
            report.publishers,
            publisher.file_name().to_string_lossy()
        ));

        let editions = match sorted_entries(&publisher_path) {
            Ok(entries) => entries,
            Err(e) => {
                logger::error(&format!(
                    "unreadable publisher directory {}: {}",
                    publisher_path.display(),
                    e
                ));
                continue;
            }
        };

        for edition in editions {
            let edition_path = edition.path();
            if !edition_path.is_dir() {
                continue;
            }
            let files = match sorted_entries(&edition_path) {
                Ok(entries) => entries,
                Err(e) => {
                    logger::error(&format!(
                        "unreadable edition directory {}: {}",
                        edition_path.display(),
                        e
                    ));
                    continue;
                }
            };

            for file in files {
                let file_path = file.path();
                if !file_path.is_file() {
                    continue;
                }
                report.works_seen += 1;
                ingest_file(&file_path, registry, store, authors_limit, &mut report);
            }
        }
    }

    logger::info(&format!(
        "corpus scan done: {} publishers, {} works seen, {} retrieved, {} ignored",
        report.publishers,
        report.works_seen,
        report.works_retrieved,
        report.ignored.len()
    ));
    Ok(report)
}
