//! Build orchestration: corpus -> per-period graph files.
//!
//! `run_build` drives the strict single-threaded sequence: ingest the
//! metadata tree, sort and reindex, backfill citations, bucket by time,
//! accumulate and write one graph file per bucket and graph kind, then
//! finalize each file with the merge-and-sum pass. Every recovered
//! anomaly ends up in a diagnostics artifact so a completed run is never
//! silently lossy. `run_year_merge` combines month-resolution outputs of
//! an earlier build into yearly files.

use crate::config::Config;
use crate::corpus::citations::{backfill_csv, CitationReport};
use crate::corpus::ingestion::load_works;
use crate::corpus::registry::AuthorRegistry;
use crate::corpus::store::{Work, WorkStore};
use crate::corpus::CorpusError;
use crate::graph::bucketer::{group_by_time, TimeResolution};
use crate::graph::edges::{citation_edges, coauthorship_edges, EdgeMap};
use crate::graph::writer::{
    merge_sorted_files, read_manifest, write_manifest, BucketFile, GraphFileError,
};
use crate::logger;
use crate::utilities::{dump_json, ensure_dir};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Fatal pipeline failure. Everything below this level is recovered and
/// counted.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    GraphFile(#[from] GraphFileError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Which graph to extract from a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Coauthorship,
    Citation,
}

impl GraphKind {
    /// Output subdirectory for this kind.
    pub fn dir_name(&self) -> &'static str {
        match self {
            GraphKind::Coauthorship => "coauthorship_graphs",
            GraphKind::Citation => "citation_graphs",
        }
    }

    /// Graph file name prefix.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            GraphKind::Coauthorship => "coauthorship",
            GraphKind::Citation => "citation",
        }
    }

    /// Edge updates of one work, plus the count of skipped cited entries
    /// (always 0 for co-authorship).
    fn accumulate(&self, work: &Work, store: &WorkStore) -> (EdgeMap, usize) {
        match self {
            GraphKind::Coauthorship => (coauthorship_edges(&work.authors), 0),
            GraphKind::Citation => citation_edges(work, store),
        }
    }
}

impl FromStr for GraphKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coauthorship" => Ok(GraphKind::Coauthorship),
            "citation" => Ok(GraphKind::Citation),
            other => Err(format!("unknown graph kind: {}", other)),
        }
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_prefix())
    }
}

/// Counts of everything a run saw, recovered, and produced. Persisted as
/// `ingestion_summary.json`.
#[derive(Debug, Default, Serialize)]
pub struct BuildSummary {
    pub publishers: usize,
    pub works_seen: usize,
    pub works_retrieved: usize,
    pub ignored_works: usize,
    pub anomalous_authors: usize,
    pub distinct_authors: usize,
    pub citation_rows: u64,
    pub citations_linked: u64,
    pub citation_rows_skipped: u64,
    pub not_listed_sources: usize,
    pub dangling_citations: u64,
    pub buckets: usize,
}

/// What a build produced, per graph kind, in bucket order.
#[derive(Debug)]
pub struct BuildReport {
    pub summary: BuildSummary,
    pub graph_files: Vec<(GraphKind, Vec<PathBuf>)>,
}

/// Accumulates and writes one bucket's graph file.
///
/// `flush_every` bounds peak memory: a non-zero value flushes the partial
/// edge map to the (append-mode) bucket file every N works. The terminal
/// merge-and-sum pass then collapses any repeated keys.
fn build_bucket_file(
    kind: GraphKind,
    work_indices: &[usize],
    store: &WorkStore,
    path: PathBuf,
    flush_every: usize,
    dangling: &mut u64,
) -> Result<PathBuf, GraphFileError> {
    let mut bucket_file = BucketFile::create(path);
    let mut edges = EdgeMap::new();
    let mut since_flush = 0;

    for &work_idx in work_indices {
        let work = match store.get(work_idx) {
            Some(work) => work,
            None => continue,
        };
        let (update, skipped) = kind.accumulate(work, store);
        *dangling += skipped as u64;
        edges.merge(update);

        since_flush += 1;
        if flush_every > 0 && since_flush >= flush_every {
            bucket_file.flush(&edges)?;
            edges = EdgeMap::new();
            since_flush = 0;
        }
    }

    // final flush, even when empty, so the file exists with its header
    bucket_file.flush(&edges)?;
    bucket_file.finalize()
}

/// Runs the full build: ingest, sort, backfill, bucket, accumulate,
/// write, finalize, manifest, diagnostics.
pub fn run_build(
    config: &Config,
    kinds: &[GraphKind],
    resolution: TimeResolution,
) -> Result<BuildReport, BuildError> {
    let output_dir = Path::new(&config.output.dir);
    ensure_dir(output_dir)?;

    let mut registry = AuthorRegistry::new();
    let mut store = WorkStore::new();
    let ingest_report = load_works(
        Path::new(&config.corpus.works_dir),
        &mut registry,
        &mut store,
        config.ingestion.authors_limit,
    )?;

    store.sort_by_date();

    if config.ingestion.dump_registries {
        dump_json(registry.as_map(), &output_dir.join("authors.json"))?;
        dump_json(&store.works(), &output_dir.join("works.json"))?;
        logger::info("registry dumps written");
    }

    // The citation CSV is only read when a citation graph was requested.
    let citation_report = if kinds.contains(&GraphKind::Citation) {
        backfill_csv(Path::new(&config.corpus.citation_csv), &mut store)?
    } else {
        CitationReport::default()
    };

    let buckets = group_by_time(store.works(), resolution);
    logger::info(&format!(
        "{} works in {} {} buckets",
        store.len(),
        buckets.len(),
        resolution
    ));

    let mut dangling = 0u64;
    let mut graph_files = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let kind_dir = output_dir.join(kind.dir_name());
        ensure_dir(&kind_dir)?;

        let mut files = Vec::with_capacity(buckets.len());
        for bucket in &buckets {
            let label = bucket.label(resolution);
            let path = kind_dir.join(format!("{}_{}.csv", kind.file_prefix(), label));
            let path = build_bucket_file(
                kind,
                &bucket.works,
                &store,
                path,
                config.ingestion.flush_every,
                &mut dangling,
            )?;
            logger::debug(&format!("{} graph written for {}", kind, label));
            files.push(path);
        }

        write_manifest(&files, &kind_dir.join("files.json"))?;
        logger::info(&format!("{} {} graph files written", files.len(), kind));
        graph_files.push((kind, files));
    }

    let summary = BuildSummary {
        publishers: ingest_report.publishers,
        works_seen: ingest_report.works_seen,
        works_retrieved: ingest_report.works_retrieved,
        ignored_works: ingest_report.ignored.len(),
        anomalous_authors: ingest_report.anomalous_authors,
        distinct_authors: registry.len(),
        citation_rows: citation_report.rows,
        citations_linked: citation_report.linked,
        citation_rows_skipped: citation_report.skipped_rows,
        not_listed_sources: citation_report.not_listed.len(),
        dangling_citations: dangling,
        buckets: buckets.len(),
    };

    dump_json(&ingest_report.ignored, &output_dir.join("ignored_works.json"))?;
    dump_json(
        &citation_report.not_listed,
        &output_dir.join("not_listed_citations.json"),
    )?;
    dump_json(&summary, &output_dir.join("ingestion_summary.json"))?;
    logger::info(&format!(
        "build done: {} retrieved, {} ignored, {} citations linked, {} dangling",
        summary.works_retrieved, summary.ignored_works, summary.citations_linked, dangling
    ));

    Ok(BuildReport {
        summary,
        graph_files,
    })
}

/// Year prefix of a month-resolution file name
/// (`citation_2001-06.csv` -> `2001`). Files already at year resolution
/// yield `None`.
fn year_of(path: &Path, prefix: &str) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let label = stem.strip_prefix(prefix)?.strip_prefix('_')?;
    let (year, _month) = label.split_once('-')?;
    Some(year.to_string())
}

/// Combines the month-resolution files of an earlier build into one file
/// per year using the streaming k-way merge. Returns the yearly files in
/// chronological order and records them in `files_yearly.json`.
pub fn run_year_merge(config: &Config, kinds: &[GraphKind]) -> Result<Vec<PathBuf>, BuildError> {
    let output_dir = Path::new(&config.output.dir);
    let mut merged = Vec::new();

    for &kind in kinds {
        let kind_dir = output_dir.join(kind.dir_name());
        let manifest = read_manifest(&kind_dir.join("files.json"))?;

        let mut by_year: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for path in manifest {
            if let Some(year) = year_of(&path, kind.file_prefix()) {
                by_year.entry(year).or_default().push(path);
            }
        }

        let mut yearly = Vec::with_capacity(by_year.len());
        for (year, inputs) in by_year {
            let out = kind_dir.join(format!("{}_{}.csv", kind.file_prefix(), year));
            logger::info(&format!(
                "merging {} {} files into {}",
                inputs.len(),
                kind,
                out.display()
            ));
            merge_sorted_files(&inputs, &out)?;
            yearly.push(out);
        }

        write_manifest(&yearly, &kind_dir.join("files_yearly.json"))?;
        merged.extend(yearly);
    }

    Ok(merged)
}
