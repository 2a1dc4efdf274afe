#[cfg(test)]
mod tests {
    use crate::corpus::citations::{backfill, backfill_csv};
    use crate::corpus::store::{Work, WorkStore};
    use crate::corpus::CorpusError;
    use chrono::NaiveDate;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn store_with(ids: &[&str]) -> WorkStore {
        let mut store = WorkStore::new();
        for (i, id) in ids.iter().enumerate() {
            store.insert(Work::new(
                id.to_string(),
                NaiveDate::from_ymd_opt(2000 + i as i32, 1, 1).unwrap(),
                vec![i as u32],
            ));
        }
        store.sort_by_date();
        store
    }

    /// Rows with both endpoints known append the target's index to the
    /// source's citation list.
    #[test]
    fn test_backfill_links_known_edges() {
        let mut store = store_with(&["a", "b", "c"]);
        let csv = "source,target\nb,a\nc,a\nc,b\n";

        let report = backfill(Cursor::new(csv), &mut store);

        assert_eq!(report.rows, 3);
        assert_eq!(report.linked, 3);
        assert!(report.not_listed.is_empty());

        let a = store.lookup("a").unwrap();
        let b = store.lookup("b").unwrap();
        let c = store.lookup("c").unwrap();
        assert_eq!(store.get(b).unwrap().cited_works, vec![a]);
        assert_eq!(store.get(c).unwrap().cited_works, vec![a, b]);
    }

    /// The first row is skipped unconditionally, even when it looks like
    /// data.
    #[test]
    fn test_backfill_always_skips_first_row() {
        let mut store = store_with(&["a", "b"]);
        let csv = "b,a\nb,a\n";

        let report = backfill(Cursor::new(csv), &mut store);

        assert_eq!(report.rows, 1);
        let b = store.lookup("b").unwrap();
        assert_eq!(store.get(b).unwrap().cited_works.len(), 1);
    }

    /// A row referencing an unknown target does not raise, increments the
    /// not-listed counter for the source, and leaves the source's list
    /// untouched by that row.
    #[test]
    fn test_backfill_unknown_target_counted() {
        let mut store = store_with(&["a", "b"]);
        let csv = "source,target\nb,ghost\nb,ghost\nb,a\n";

        let report = backfill(Cursor::new(csv), &mut store);

        assert_eq!(report.linked, 1);
        assert_eq!(report.not_listed.get("b"), Some(&2));

        let b = store.lookup("b").unwrap();
        let a = store.lookup("a").unwrap();
        assert_eq!(store.get(b).unwrap().cited_works, vec![a]);
    }

    /// Unknown sources are counted under their own id.
    #[test]
    fn test_backfill_unknown_source_counted() {
        let mut store = store_with(&["a"]);
        let csv = "source,target\nghost,a\n";

        let report = backfill(Cursor::new(csv), &mut store);

        assert_eq!(report.linked, 0);
        assert_eq!(report.not_listed.get("ghost"), Some(&1));
    }

    /// Short rows are skipped and counted, never fatal.
    #[test]
    fn test_backfill_short_row_recovered() {
        let mut store = store_with(&["a", "b"]);
        let csv = "source,target\nonlyonefield\nb,a\n";

        let report = backfill(Cursor::new(csv), &mut store);

        assert_eq!(report.rows, 2);
        assert_eq!(report.skipped_rows, 1);
        assert_eq!(report.linked, 1);
    }

    /// File-based entry point; missing file is fatal.
    #[test]
    fn test_backfill_csv_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("citations.csv");
        std::fs::write(&path, "source,target\nb,a\n").unwrap();

        let mut store = store_with(&["a", "b"]);
        let report = backfill_csv(&path, &mut store).unwrap();
        assert_eq!(report.linked, 1);

        let missing = temp_dir.path().join("missing.csv");
        let err = backfill_csv(&missing, &mut store).unwrap_err();
        assert!(matches!(err, CorpusError::Unavailable { .. }));
    }
}
