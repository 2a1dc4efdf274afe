//! Graph extraction layer.
//!
//! Turns the sorted work store into time-bucketed weighted graph files:
//! - `bucketer`: partitions date-sorted works into calendar buckets
//! - `edges`: per-work edge accumulation with canonical undirected keys
//!   and additive weight merging
//! - `writer`: delimited graph files, the per-file merge-and-sum pass,
//!   the cross-file k-way external merge, and the run manifest

pub mod bucketer;
pub mod edges;
pub mod writer;
