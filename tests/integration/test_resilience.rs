//! Resilience tests: one bad unit must not abort the run

#[cfg(test)]
mod tests {
    use crate::fixtures::{PointListReader, test_config, write_unit};
    use shp2pgis::services::sink::WritePath;
    use shp2pgis::services::sink::memory::MemoryDatabase;
    use shp2pgis::{Error, ImportOptions, RunToken};
    use tempfile::TempDir;

    fn run() -> RunToken {
        RunToken::parse("170518").unwrap()
    }

    #[test]
    fn test_unreadable_file_skips_only_its_unit() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_unit(root, "A", &[("a.shp", "0 0\n")]);
        write_unit(root, "B", &[("b.shp", "1 1\nFAIL\n")]);
        write_unit(root, "C", &[("c.shp", "2 2\n")]);

        let config = test_config(root, true);
        let db = MemoryDatabase::new();
        let report =
            shp2pgis::run_import(&config, &run(), &ImportOptions::default(), &PointListReader, &db)
                .unwrap();

        assert_eq!(report.units_processed, 3);
        assert_eq!(report.units_succeeded, 2);
        assert_eq!(report.units_failed, 1);
        assert_eq!(report.failures[0].unit, "B");
        assert!(report.failures[0].message.contains("corrupt geometry"));
        assert_eq!(db.count(WritePath::Create), 1);
        assert_eq!(db.count(WritePath::Append), 1);

        let err = report.ensure_complete().unwrap_err();
        assert!(matches!(
            err,
            Error::PartialFailure {
                completed: 2,
                failed: 1
            }
        ));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_failed_create_is_retried_by_next_unit() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_unit(root, "A", &[("a.shp", "0 0\n")]);
        write_unit(root, "B", &[("b.shp", "1 1\n")]);
        write_unit(root, "C", &[("c.shp", "2 2\n")]);

        let config = test_config(root, true);
        let db = MemoryDatabase::new();
        db.fail_next_creates(1);

        let report =
            shp2pgis::run_import(&config, &run(), &ImportOptions::default(), &PointListReader, &db)
                .unwrap();

        assert_eq!(report.units_failed, 1);
        assert_eq!(report.failures[0].unit, "A");
        assert!(report.table_created);

        let writes = db.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].path, WritePath::Create);
        assert_eq!(writes[1].path, WritePath::Append);
    }

    #[test]
    fn test_database_rejection_keeps_earlier_batches_counted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_unit(root, "A", &[("a1.shp", "0 0\n1 1\n"), ("a2.shp", "FAIL\n")]);
        write_unit(root, "B", &[("b.shp", "2 2\n")]);

        let config = test_config(root, false);
        let db = MemoryDatabase::new();
        db.fail_unit("B");

        let report =
            shp2pgis::run_import(&config, &run(), &ImportOptions::default(), &PointListReader, &db)
                .unwrap();

        // A wrote its first file before the second one failed; B was rejected.
        assert_eq!(report.units_failed, 2);
        assert_eq!(report.records_written, 2);
        assert_eq!(report.files_read, 2);
        assert_eq!(db.count(WritePath::Append), 1);
        let failed: Vec<&str> = report.failures.iter().map(|f| f.unit.as_str()).collect();
        assert_eq!(failed, vec!["A", "B"]);
    }

    #[test]
    fn test_parallel_run_isolates_failures() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for i in 0..12 {
            let content = if i % 4 == 0 { "FAIL\n" } else { "0 0\n" };
            write_unit(root, &format!("u{i:02}"), &[("f.shp", content)]);
        }

        let config = test_config(root, true);
        let db = MemoryDatabase::new();
        let opts = ImportOptions {
            jobs: 3,
            ..ImportOptions::default()
        };

        let report = shp2pgis::run_import(&config, &run(), &opts, &PointListReader, &db).unwrap();

        assert_eq!(report.units_failed, 3);
        assert_eq!(report.units_succeeded, 9);
        assert_eq!(db.count(WritePath::Create), 1);
        assert_eq!(db.count(WritePath::Append), 8);
    }
}
