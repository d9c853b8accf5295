//! Contract test for the JSON report shape

use crate::fixtures::{PointListReader, test_config, write_unit};
use shp2pgis::cli::output::format_json;
use shp2pgis::services::sink::memory::MemoryDatabase;
use shp2pgis::{ImportOptions, RunToken};
use tempfile::TempDir;

#[test]
fn test_report_json_fields() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_unit(root, "ok", &[("a.shp", "0 0\n")]);
    write_unit(root, "broken", &[("b.shp", "FAIL\n")]);

    let config = test_config(root, true);
    let db = MemoryDatabase::counting();
    let run = RunToken::parse("170518").unwrap();
    let report =
        shp2pgis::run_import(&config, &run, &ImportOptions::default(), &PointListReader, &db)
            .unwrap();

    let json = format_json(&report);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    for key in [
        "units_total",
        "units_processed",
        "units_succeeded",
        "units_failed",
        "files_read",
        "records_written",
        "batches_created",
        "batches_appended",
        "table_created",
        "failures",
        "elapsed_ms",
    ] {
        assert!(value.get(key).is_some(), "missing key {key}");
    }

    assert_eq!(value["units_total"], 2);
    assert_eq!(value["table_created"], true);

    let failures = value["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["unit"], "broken");
    assert!(failures[0]["message"].as_str().unwrap().contains("corrupt geometry"));
}
