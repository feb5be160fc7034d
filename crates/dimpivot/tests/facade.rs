//! File-level tests: input dispatch, exports and the export cache

use std::fs;
use std::path::Path;

use dimpivot::prelude::*;
use dimpivot::{read_rows, MalformedReason, XlsxReader};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_labels(dir: &Path, name: &str, labels: &[&str]) -> std::path::PathBuf {
    let mut content = String::from("Item\n");
    for label in labels {
        content.push_str(label);
        content.push('\n');
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_open_csv_input() {
    let dir = TempDir::new().unwrap();
    let input = write_labels(
        dir.path(),
        "labels.csv",
        &["10x20x5 Red", "10x20x5 Red", "10x30x5 Blue"],
    );

    let table = FinalTable::open(&input, &PivotOptions::default()).unwrap();

    assert_eq!(table.grand_total(), 3);
    assert_eq!(table.cell(MeasureKey::new(20), "Red"), Some(2));
    assert_eq!(table.cell(MeasureKey::new(30), "Red"), Some(0));
    assert_eq!(
        table.headers(),
        vec!["Measurement2", "1-Blue", "2-Red", "Total"]
    );
}

#[test]
fn test_uppercase_extension_is_accepted() {
    let dir = TempDir::new().unwrap();
    let input = write_labels(dir.path(), "LABELS.CSV", &["1x2x3 Red"]);

    let rows = read_rows(&input).unwrap();
    assert_eq!(rows, vec![RawRow::new(2, "1x2x3 Red")]);
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("labels.ods");
    fs::write(&input, b"").unwrap();

    let err = FinalTable::open(&input, &PivotOptions::default()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));
    assert!(!err.is_malformed_input());
}

#[test]
fn test_malformed_input_reports_rows() {
    let dir = TempDir::new().unwrap();
    let input = write_labels(dir.path(), "labels.csv", &["9x9 Red", "abc"]);

    let err = FinalTable::open(&input, &PivotOptions::default()).unwrap_err();
    assert!(err.is_malformed_input());
    match err {
        Error::Pivot(dimpivot_core::Error::MalformedInput { reason, rows }) => {
            assert_eq!(reason, MalformedReason::PatternMismatch);
            assert_eq!(rows, vec![2, 3]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_header_only_input_is_malformed() {
    let dir = TempDir::new().unwrap();
    let input = write_labels(dir.path(), "labels.csv", &[]);

    let err = FinalTable::open(&input, &PivotOptions::default()).unwrap_err();
    assert!(err.is_malformed_input());
}

#[test]
fn test_save_picks_format_from_extension() {
    let dir = TempDir::new().unwrap();
    let table = Pipeline::default()
        .run_labels(["10x20x5 Red", "10x20x5 Red", "10x30x5 Blue"])
        .unwrap();

    let csv_path = dir.path().join("pivot.csv");
    table.save(&csv_path).unwrap();
    assert_eq!(
        fs::read_to_string(&csv_path).unwrap(),
        "No.;Measurement2;1-Blue;2-Red;Total\n\
         1;30;1;0;1\n\
         2;20;0;2;2\n\
         3;Total;1;2;3\n"
    );

    let xlsx_path = dir.path().join("pivot.xlsx");
    table.save(&xlsx_path).unwrap();
    let first_column: Vec<_> = XlsxReader::read_file(&xlsx_path)
        .unwrap()
        .into_iter()
        .map(|row| row.label)
        .collect();
    assert_eq!(
        first_column,
        vec![
            Some("30".to_string()),
            Some("20".to_string()),
            Some("Total".to_string())
        ]
    );

    assert!(table.save(dir.path().join("pivot.txt")).is_err());
}

#[test]
fn test_pivot_workbook_is_not_valid_input() {
    let dir = TempDir::new().unwrap();
    let table = Pipeline::default().run_labels(["1x2x3 Red"]).unwrap();
    let path = dir.path().join("pivot.xlsx");
    table.save(&path).unwrap();

    // Column A of a pivot holds bare identifiers, which never match the label pattern
    let err = FinalTable::open(&path, &PivotOptions::default()).unwrap_err();
    assert!(err.is_malformed_input());
}

#[test]
fn test_same_input_gives_identical_exports() {
    let dir = TempDir::new().unwrap();
    let labels = ["10x20x5 Red", "3x7x1 Green", "10x30x5 Blue", "4x7x2 Green"];
    let first = write_labels(dir.path(), "a.csv", &labels);
    let second = write_labels(dir.path(), "b.csv", &labels);

    let a = FinalTable::open(&first, &PivotOptions::default()).unwrap();
    let b = FinalTable::open(&second, &PivotOptions::default()).unwrap();

    for format in [ExportFormat::Xlsx, ExportFormat::Csv] {
        assert_eq!(a.export(format).unwrap(), b.export(format).unwrap());
    }
}

#[test]
fn test_cache_serves_repeat_downloads() {
    let dir = TempDir::new().unwrap();
    let input = write_labels(dir.path(), "labels.csv", &["10x20x5 Red", "10x30x5 Blue"]);
    let mut cache = ExportCache::default();

    for _ in 0..3 {
        let table = FinalTable::open(&input, &PivotOptions::default()).unwrap();
        let export = cache.get_or_encode(&table, ExportFormat::Xlsx).unwrap();
        assert_eq!(export.file_name, "pivot.xlsx");
    }
    assert_eq!((cache.hits(), cache.misses()), (2, 1));

    // A changed file must not be served stale bytes
    let changed = write_labels(dir.path(), "labels.csv", &["10x20x5 Red", "10x40x5 Blue"]);
    let table = FinalTable::open(&changed, &PivotOptions::default()).unwrap();
    let fresh = cache.get_or_encode(&table, ExportFormat::Xlsx).unwrap();
    assert_eq!(fresh.bytes, table.export(ExportFormat::Xlsx).unwrap().bytes);
    assert_eq!(cache.misses(), 2);
}
