//! Stable author identity assignment.
//!
//! Authors are keyed by their display name exactly as it appears in the
//! source metadata; no normalization is attempted here, because the graph
//! files downstream only ever see the integer ids.

use std::collections::HashMap;

/// Maps author display names to stable integer ids.
///
/// Ids are assigned in first-seen order, starting at 0, and are never
/// reused or reassigned. Not safe for concurrent mutation; if ingestion
/// is ever parallelized, `resolve` must go through a single owner.
#[derive(Debug, Default)]
pub struct AuthorRegistry {
    ids: HashMap<String, u32>,
}

impl AuthorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, assigning the next free id on first sight.
    pub fn resolve(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.ids.len() as u32;
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Looks up a name without assigning an id.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Number of distinct authors seen so far.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The full name -> id mapping, for the `authors.json` dump.
    pub fn as_map(&self) -> &HashMap<String, u32> {
        &self.ids
    }
}
