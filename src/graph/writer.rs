//! Graph file serialization and merging.
//!
//! Graph files are comma-delimited with a single header row
//! (`author_i,author_j,weight`) and one `(v_i, v_j, weight)` row per
//! edge. A bucket file goes through a fixed lifecycle: created, appended
//! to one or more times (possibly leaving repeated unmerged keys), then
//! finalized by the merge-and-sum pass, after which it is immutable.
//! Finalized files from finer periods can later be combined into a
//! coarser-period file by a streaming k-way merge that never loads a
//! whole input.

use crate::graph::edges::{EdgeKey, EdgeMap};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column names of the graph file header.
const HEADER: [&str; 3] = ["author_i", "author_j", "weight"];

#[derive(Debug, Error)]
pub enum GraphFileError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// One serialized edge row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRow {
    pub author_i: u32,
    pub author_j: u32,
    pub weight: f64,
}

impl GraphRow {
    fn key(&self) -> EdgeKey {
        (self.author_i, self.author_j)
    }
}

/// Serializes an edge mapping to `path`.
///
/// With `append = false` the file is truncated and a header written.
/// With `append = true` rows are added to the existing file; the header
/// is written only when the destination is still empty, so repeated
/// appends yield exactly one header.
pub fn write_graph(edges: &EdgeMap, path: &Path, append: bool) -> Result<(), GraphFileError> {
    let already_has_data = append
        && path
            .metadata()
            .map(|metadata| metadata.len() > 0)
            .unwrap_or(false);

    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    let file = options.open(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    if !already_has_data {
        writer.write_record(HEADER)?;
    }
    for (&(author_i, author_j), &weight) in edges.iter() {
        writer.serialize(GraphRow {
            author_i,
            author_j,
            weight,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads all data rows of a graph file (header excluded).
pub fn read_rows(path: &Path) -> Result<Vec<GraphRow>, GraphFileError> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));
    let mut rows = Vec::new();
    for row in reader.deserialize::<GraphRow>() {
        rows.push(row?);
    }
    Ok(rows)
}

fn write_rows(rows: &[GraphRow], path: &Path) -> Result<(), GraphFileError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(File::create(path)?));
    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Merge-and-sum pass over one bucket file.
///
/// Sorts all data rows numerically by `(v_i, v_j)`, sums the weights of
/// duplicate keys left behind by incremental appends, and atomically
/// replaces the file with one row per distinct key under a single
/// header. Idempotent: running it on its own output is byte-identical.
pub fn merge_graph_file(path: &Path) -> Result<(), GraphFileError> {
    let mut rows = read_rows(path)?;
    rows.sort_by_key(GraphRow::key);

    let mut merged: Vec<GraphRow> = Vec::with_capacity(rows.len());
    for row in rows {
        match merged.last_mut() {
            Some(last) if last.key() == row.key() => last.weight += row.weight,
            _ => merged.push(row),
        }
    }

    let tmp = path.with_extension("csv.tmp");
    write_rows(&merged, &tmp)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

type RowStream = csv::DeserializeRecordsIntoIter<BufReader<File>, GraphRow>;

fn advance(
    streams: &mut [RowStream],
    heads: &mut [Option<GraphRow>],
    heap: &mut BinaryHeap<Reverse<(EdgeKey, usize)>>,
    idx: usize,
) -> Result<(), GraphFileError> {
    if let Some(row) = streams[idx].next() {
        let row = row?;
        heap.push(Reverse((row.key(), idx)));
        heads[idx] = Some(row);
    }
    Ok(())
}

/// Streaming k-way merge of already-sorted, already-merged graph files.
///
/// Inputs are read lazily through open handles; no input is ever fully
/// resident. Rows come out sorted by key with the weights of keys shared
/// across inputs summed, under a single header. Precondition: each input
/// is sorted by `(v_i, v_j)` with distinct keys, i.e. finalized by
/// `merge_graph_file`.
pub fn merge_sorted_files(inputs: &[PathBuf], output: &Path) -> Result<(), GraphFileError> {
    let mut streams: Vec<RowStream> = Vec::with_capacity(inputs.len());
    for path in inputs {
        let file = File::open(path)?;
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(file));
        streams.push(reader.into_deserialize());
    }

    let mut heads: Vec<Option<GraphRow>> = (0..streams.len()).map(|_| None).collect();
    let mut heap: BinaryHeap<Reverse<(EdgeKey, usize)>> = BinaryHeap::new();
    for idx in 0..streams.len() {
        advance(&mut streams, &mut heads, &mut heap, idx)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(File::create(output)?));
    writer.write_record(HEADER)?;

    while let Some(Reverse((key, idx))) = heap.pop() {
        let mut row = match heads[idx].take() {
            Some(row) => row,
            None => continue,
        };
        advance(&mut streams, &mut heads, &mut heap, idx)?;

        // absorb the same key from every other stream
        while let Some(&Reverse((next_key, next_idx))) = heap.peek() {
            if next_key != key {
                break;
            }
            heap.pop();
            if let Some(other) = heads[next_idx].take() {
                row.weight += other.weight;
            }
            advance(&mut streams, &mut heads, &mut heap, next_idx)?;
        }

        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Per-bucket graph file lifecycle.
///
/// Created, flushed one or more times (append after the first), then
/// finalized by the merge-and-sum pass. Once finalized the file is
/// treated as immutable.
#[derive(Debug)]
pub struct BucketFile {
    path: PathBuf,
    flushes: usize,
}

impl BucketFile {
    pub fn create(path: PathBuf) -> Self {
        Self { path, flushes: 0 }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the current edge mapping to the bucket file. The first
    /// flush truncates any stale file left over from an earlier run.
    pub fn flush(&mut self, edges: &EdgeMap) -> Result<(), GraphFileError> {
        write_graph(edges, &self.path, self.flushes > 0)?;
        self.flushes += 1;
        Ok(())
    }

    /// Runs the merge-and-sum pass and closes the bucket, returning the
    /// final path.
    pub fn finalize(self) -> Result<PathBuf, GraphFileError> {
        merge_graph_file(&self.path)?;
        Ok(self.path)
    }
}

/// Writes the ordered list of produced graph files as `files.json`.
pub fn write_manifest(files: &[PathBuf], path: &Path) -> std::io::Result<()> {
    let entries: Vec<String> = files
        .iter()
        .map(|f| f.to_string_lossy().into_owned())
        .collect();
    crate::utilities::dump_json(&entries, path)
}

/// Reads a `files.json` manifest back.
pub fn read_manifest(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let content = fs::read_to_string(path)?;
    let entries: Vec<String> = serde_json::from_str(&content)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(entries.into_iter().map(PathBuf::from).collect())
}
