//! Edge accumulation for one time bucket.
//!
//! An `EdgeMap` is the bucket-local mapping from endpoint pair to
//! accumulated weight. Undirected edges are canonicalized (smaller id
//! first) so `(a,b)` and `(b,a)` always land on the same entry; directed
//! edges keep their orientation. Repeated edges merge additively, and two
//! maps merge with a plain reducer, which is what the per-work flushing
//! and cross-file merging both build on.

use crate::corpus::store::{Work, WorkStore};
use std::collections::{btree_map, BTreeMap};

/// Endpoint pair. For undirected edges the canonical form is
/// `(min, max)`.
pub type EdgeKey = (u32, u32);

/// Bucket-local edge-weight mapping with deterministic key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeMap {
    edges: BTreeMap<EdgeKey, f64>,
}

impl EdgeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `weight` to the edge `(v_i, v_j)`, canonicalizing the
    /// endpoint order unless the edge is directed.
    pub fn add_edge(&mut self, v_i: u32, v_j: u32, weight: f64, directed: bool) {
        let key = if !directed && v_j < v_i {
            (v_j, v_i)
        } else {
            (v_i, v_j)
        };
        *self.edges.entry(key).or_insert(0.0) += weight;
    }

    /// Folds `other` into `self`, summing weights of shared keys.
    pub fn merge(&mut self, other: EdgeMap) {
        for (key, weight) in other.edges {
            *self.edges.entry(key).or_insert(0.0) += weight;
        }
    }

    pub fn get(&self, key: EdgeKey) -> Option<f64> {
        self.edges.get(&key).copied()
    }

    /// Edges in ascending key order.
    pub fn iter(&self) -> btree_map::Iter<'_, EdgeKey, f64> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Co-authorship edges of one work.
///
/// A work with k >= 2 authors yields the full clique over its distinct
/// listed authors, each edge weighted `1/(k-1)`. A solo work yields one
/// self-loop of weight 0 so the author still appears as an isolated
/// vertex in the output graph.
pub fn coauthorship_edges(authors: &[u32]) -> EdgeMap {
    let mut edges = EdgeMap::new();
    let k = authors.len();
    if k == 1 {
        edges.add_edge(authors[0], authors[0], 0.0, false);
        return edges;
    }
    let weight = 1.0 / (k as f64 - 1.0);
    for i in 0..k {
        for j in (i + 1)..k {
            if authors[i] != authors[j] {
                edges.add_edge(authors[i], authors[j], weight, false);
            }
        }
    }
    edges
}

/// Citation edges of one work: directed, citing author -> cited author.
///
/// Each resolvable cited work with `m >= 1` authors contributes edges of
/// weight `1/m`. Cited indices that no longer resolve, or resolve to a
/// zero-author work, are skipped; the count of skipped entries is
/// returned alongside the edges.
pub fn citation_edges(work: &Work, store: &WorkStore) -> (EdgeMap, usize) {
    let mut edges = EdgeMap::new();
    let mut dangling = 0;
    for &cited_idx in &work.cited_works {
        let cited = match store.get(cited_idx) {
            Some(cited) if !cited.authors.is_empty() => cited,
            _ => {
                dangling += 1;
                continue;
            }
        };
        let weight = 1.0 / cited.authors.len() as f64;
        for &citing_author in &work.authors {
            for &cited_author in &cited.authors {
                edges.add_edge(citing_author, cited_author, weight, true);
            }
        }
    }
    (edges, dangling)
}
