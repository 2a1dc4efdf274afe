//! Integration tests for the complete build pipeline.
//!
//! These exercise `run_build` and `run_year_merge` end-to-end over a
//! synthetic corpus tree: ingestion, citation backfill, bucketing,
//! accumulation, bucket-file finalization, manifests, and diagnostics
//! artifacts.

use crate::config::Config;
use crate::graph::bucketer::TimeResolution;
use crate::graph::writer::read_rows;
use crate::pipeline::{run_build, run_year_merge, GraphKind};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_work(dir: &Path, name: &str, body: &serde_json::Value) {
    fs::write(dir.join(name), serde_json::to_string(body).unwrap()).unwrap();
}

/// Lays out a small two-publisher corpus with one editorial and a
/// citation CSV containing unresolvable rows.
fn fixture_corpus(root: &Path) -> Config {
    let works_dir = root.join("metadata");
    let pra = works_dir.join("PRA/1");
    let prb = works_dir.join("PRB/2");
    fs::create_dir_all(&pra).unwrap();
    fs::create_dir_all(&prb).unwrap();

    write_work(
        &pra,
        "a.json",
        &serde_json::json!({
            "id": "10.0/a", "date": "2001-01-10",
            "authors": [{"name": "X"}]
        }),
    );
    write_work(
        &pra,
        "b.json",
        &serde_json::json!({
            "id": "10.0/b", "date": "2001-03-01",
            "authors": [{"name": "X"}, {"name": "Y"}, {"name": "Z"}]
        }),
    );
    write_work(
        &prb,
        "c.json",
        &serde_json::json!({
            "id": "10.0/c", "date": "2002-02-01",
            "authors": [{"name": "Y"}, {"name": "W"}]
        }),
    );
    // editorial: no authors field, must be ignored and recorded
    write_work(
        &prb,
        "d.json",
        &serde_json::json!({"id": "10.0/d", "date": "2002-03-01"}),
    );

    let citation_csv = root.join("citations.csv");
    fs::write(
        &citation_csv,
        "source,target\n10.0/c,10.0/a\n10.0/c,10.0/b\n10.0/c,10.0/ghost\n10.0/ghost,10.0/a\n",
    )
    .unwrap();

    let mut config = Config::default();
    config.corpus.works_dir = works_dir.to_string_lossy().into_owned();
    config.corpus.citation_csv = citation_csv.to_string_lossy().into_owned();
    config.output.dir = root.join("output").to_string_lossy().into_owned();
    config
}

/// Full yearly build over both graph kinds.
///
/// Author ids (name-sorted file walk): X=0, Y=1, Z=2, W=3.
/// Sorted work indices: a=0 (2001-01), b=1 (2001-03), c=2 (2002-02).
#[test]
fn test_full_build_year_resolution() {
    let temp_dir = TempDir::new().unwrap();
    let config = fixture_corpus(temp_dir.path());

    let report = run_build(
        &config,
        &[GraphKind::Coauthorship, GraphKind::Citation],
        TimeResolution::Year,
    )
    .unwrap();

    // ingestion counters
    assert_eq!(report.summary.publishers, 2);
    assert_eq!(report.summary.works_seen, 4);
    assert_eq!(report.summary.works_retrieved, 3);
    assert_eq!(report.summary.ignored_works, 1);
    assert_eq!(report.summary.distinct_authors, 4);
    assert_eq!(report.summary.buckets, 2);

    // citation counters: 4 data rows, 2 linked, 2 distinct offenders
    assert_eq!(report.summary.citation_rows, 4);
    assert_eq!(report.summary.citations_linked, 2);
    assert_eq!(report.summary.not_listed_sources, 2);
    assert_eq!(report.summary.dangling_citations, 0);

    let output_dir = Path::new(&config.output.dir);

    // co-authorship 2001: solo self-loop for X plus the 3-clique of b
    let co_2001 = output_dir.join("coauthorship_graphs/coauthorship_2001.csv");
    let rows = read_rows(&co_2001).unwrap();
    let as_tuples: Vec<_> = rows
        .iter()
        .map(|r| (r.author_i, r.author_j, r.weight))
        .collect();
    assert_eq!(
        as_tuples,
        vec![(0, 0, 0.0), (0, 1, 0.5), (0, 2, 0.5), (1, 2, 0.5)]
    );

    // co-authorship 2002: the pair Y,W with weight 1
    let co_2002 = output_dir.join("coauthorship_graphs/coauthorship_2002.csv");
    let rows = read_rows(&co_2002).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!((rows[0].author_i, rows[0].author_j), (1, 3));
    assert_eq!(rows[0].weight, 1.0);

    // citation 2001: nothing cited yet, header-only file
    let ci_2001 = output_dir.join("citation_graphs/citation_2001.csv");
    assert!(read_rows(&ci_2001).unwrap().is_empty());

    // citation 2002: c (authors 1,3) cites a (1 author) and b (3 authors)
    let ci_2002 = output_dir.join("citation_graphs/citation_2002.csv");
    let rows = read_rows(&ci_2002).unwrap();
    assert_eq!(rows.len(), 6);
    let weight_of = |i: u32, j: u32| {
        rows.iter()
            .find(|r| r.author_i == i && r.author_j == j)
            .map(|r| r.weight)
            .unwrap()
    };
    assert!((weight_of(1, 0) - 4.0 / 3.0).abs() < 1e-9);
    assert!((weight_of(3, 0) - 4.0 / 3.0).abs() < 1e-9);
    assert!((weight_of(1, 1) - 1.0 / 3.0).abs() < 1e-9);
    assert!((weight_of(3, 2) - 1.0 / 3.0).abs() < 1e-9);

    // manifests list the bucket files in chronological order
    let manifest: Vec<String> = serde_json::from_str(
        &fs::read_to_string(output_dir.join("coauthorship_graphs/files.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest.len(), 2);
    assert!(manifest[0].ends_with("coauthorship_2001.csv"));
    assert!(manifest[1].ends_with("coauthorship_2002.csv"));

    // diagnostics artifacts exist and carry the recovered anomalies
    let ignored: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(output_dir.join("ignored_works.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(ignored.as_array().unwrap().len(), 1);
    assert_eq!(ignored[0]["reason"], "no_authors");

    let not_listed: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(output_dir.join("not_listed_citations.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(not_listed["10.0/c"], 1);
    assert_eq!(not_listed["10.0/ghost"], 1);

    assert!(output_dir.join("ingestion_summary.json").exists());
}

/// Incremental flushing produces the same final files as a single flush:
/// the merge-and-sum pass collapses the appended duplicates.
#[test]
fn test_flush_every_equivalent_to_single_flush() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = fixture_corpus(temp_dir.path());

    let single_out = temp_dir.path().join("out_single");
    config.output.dir = single_out.to_string_lossy().into_owned();
    run_build(&config, &[GraphKind::Coauthorship], TimeResolution::Year).unwrap();

    let flushed_out = temp_dir.path().join("out_flushed");
    config.output.dir = flushed_out.to_string_lossy().into_owned();
    config.ingestion.flush_every = 1;
    run_build(&config, &[GraphKind::Coauthorship], TimeResolution::Year).unwrap();

    for name in ["coauthorship_2001.csv", "coauthorship_2002.csv"] {
        let a = fs::read(single_out.join("coauthorship_graphs").join(name)).unwrap();
        let b = fs::read(flushed_out.join("coauthorship_graphs").join(name)).unwrap();
        assert_eq!(a, b, "{} differs between flush modes", name);
    }
}

/// A month-resolution build followed by the year merge matches the
/// yearly build's totals.
#[test]
fn test_month_build_then_year_merge() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let works_dir = root.join("metadata");
    let edition = works_dir.join("PRA/1");
    fs::create_dir_all(&edition).unwrap();

    // same pair publishing in January and February 2001
    write_work(
        &edition,
        "jan.json",
        &serde_json::json!({
            "id": "jan", "date": "2001-01-05",
            "authors": [{"name": "A"}, {"name": "B"}]
        }),
    );
    write_work(
        &edition,
        "feb.json",
        &serde_json::json!({
            "id": "feb", "date": "2001-02-05",
            "authors": [{"name": "A"}, {"name": "B"}]
        }),
    );

    let mut config = Config::default();
    config.corpus.works_dir = works_dir.to_string_lossy().into_owned();
    config.output.dir = root.join("output").to_string_lossy().into_owned();

    let report = run_build(&config, &[GraphKind::Coauthorship], TimeResolution::Month).unwrap();
    assert_eq!(report.summary.buckets, 2);

    let merged = run_year_merge(&config, &[GraphKind::Coauthorship]).unwrap();
    assert_eq!(merged.len(), 1);
    assert!(merged[0].ends_with("coauthorship_2001.csv"));

    // two month files each carried (A,B,1.0); the year file sums them
    let rows = read_rows(&merged[0]).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!((rows[0].author_i, rows[0].author_j), (0, 1));
    assert_eq!(rows[0].weight, 2.0);

    let yearly_manifest = root.join("output/coauthorship_graphs/files_yearly.json");
    assert!(yearly_manifest.exists());
}

/// A missing corpus root aborts the run instead of producing an empty
/// build.
#[test]
fn test_missing_corpus_root_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.corpus.works_dir = temp_dir
        .path()
        .join("does_not_exist")
        .to_string_lossy()
        .into_owned();
    config.output.dir = temp_dir.path().join("output").to_string_lossy().into_owned();

    let result = run_build(&config, &[GraphKind::Coauthorship], TimeResolution::Year);
    assert!(result.is_err());
}
