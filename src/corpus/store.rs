//! Per-work record store.
//!
//! Works are appended during ingestion, then sorted by publication date
//! and reindexed once, after which the store is read-only. The dense
//! post-sort indices are what the time bucketer and the citation lists
//! refer to, so `sort_by_date` must run before `append_citation`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single published work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    /// External identifier from the source metadata (a DOI-like string).
    pub external_id: String,
    /// Publication date parsed from the metadata `date` field.
    pub publication_date: NaiveDate,
    /// Author ids in source order; duplicates are kept if the source
    /// lists an author twice.
    pub authors: Vec<u32>,
    /// Internal indices of works this work cites, filled by backfill.
    pub cited_works: Vec<usize>,
}

impl Work {
    pub fn new(external_id: String, publication_date: NaiveDate, authors: Vec<u32>) -> Self {
        Self {
            external_id,
            publication_date,
            authors,
            cited_works: Vec::new(),
        }
    }
}

/// Ordered collection of works with an external-id lookup.
#[derive(Debug, Default)]
pub struct WorkStore {
    works: Vec<Work>,
    index: HashMap<String, usize>,
}

impl WorkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a work. Re-ingesting an already-known external id replaces
    /// the previous record instead of duplicating it.
    pub fn insert(&mut self, work: Work) -> usize {
        if let Some(&idx) = self.index.get(&work.external_id) {
            self.works[idx] = work;
            return idx;
        }
        let idx = self.works.len();
        self.index.insert(work.external_id.clone(), idx);
        self.works.push(work);
        idx
    }

    /// Sorts all works by publication date ascending (stable, so ties keep
    /// insertion order) and rebuilds the external-id lookup over the new
    /// dense indices.
    pub fn sort_by_date(&mut self) {
        self.works.sort_by_key(|w| w.publication_date);
        self.index = self
            .works
            .iter()
            .enumerate()
            .map(|(idx, w)| (w.external_id.clone(), idx))
            .collect();
    }

    /// Internal index for an external work id, if present.
    pub fn lookup(&self, external_id: &str) -> Option<usize> {
        self.index.get(external_id).copied()
    }

    pub fn get(&self, idx: usize) -> Option<&Work> {
        self.works.get(idx)
    }

    /// Records that the work at `source` cites the work at `target`.
    pub fn append_citation(&mut self, source: usize, target: usize) {
        if let Some(work) = self.works.get_mut(source) {
            work.cited_works.push(target);
        }
    }

    pub fn works(&self) -> &[Work] {
        &self.works
    }

    pub fn len(&self) -> usize {
        self.works.len()
    }

    pub fn is_empty(&self) -> bool {
        self.works.is_empty()
    }
}
