//! Small filesystem helpers shared by the build pipeline.
//!
//! These are used for output directories and the JSON diagnostics
//! artifacts every run leaves behind.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

/// Creates a directory (and its parents) if it does not exist.
///
/// # Example
/// ```
/// use aps_graph::utilities::ensure_dir;
///
/// let dir = std::env::temp_dir().join("aps_graph_doctest");
/// ensure_dir(&dir).unwrap();
/// assert!(dir.is_dir());
/// ```
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Serializes `data` as JSON at `path`.
///
/// Used for every diagnostics artifact (ingestion summary, ignored works,
/// not-listed citation sources) and for the registry dumps, so recovered
/// anomalies are always inspectable after a run.
///
/// # Example
/// ```
/// use aps_graph::utilities::dump_json;
///
/// let path = std::env::temp_dir().join("aps_graph_doctest.json");
/// dump_json(&vec![1, 2, 3], &path).unwrap();
/// assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1,2,3]");
/// ```
pub fn dump_json<T: Serialize>(data: &T, path: &Path) -> io::Result<()> {
    let json = serde_json::to_string(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}
