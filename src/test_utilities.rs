//! Tests for utility functions.

#[cfg(test)]
mod tests {
    use crate::utilities::{dump_json, ensure_dir};
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Test creating a nested directory tree.
    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b/c");

        ensure_dir(&nested).unwrap();

        assert!(nested.is_dir());
    }

    /// Test that an existing directory is left alone.
    #[test]
    fn test_ensure_dir_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("out");

        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();

        assert!(dir.is_dir());
    }

    /// Test dumping a map as JSON.
    #[test]
    fn test_dump_json_map() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("authors.json");

        let mut map = HashMap::new();
        map.insert("M. Gell-Mann".to_string(), 0u32);
        dump_json(&map, &path).unwrap();

        let loaded: HashMap<String, u32> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.get("M. Gell-Mann"), Some(&0));
    }

    /// Test that dumping to an unwritable path surfaces the error.
    #[test]
    fn test_dump_json_bad_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no_such_dir/out.json");

        assert!(dump_json(&vec![1, 2], &path).is_err());
    }
}
