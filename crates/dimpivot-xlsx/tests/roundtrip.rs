//! End-to-end tests: labels workbook -> pipeline -> pivot workbook

use std::io::{Cursor, Read, Write};

use dimpivot_core::{Pipeline, PivotOptions, RawRow};
use dimpivot_xlsx::{XlsxReader, XlsxWriteOptions, XlsxWriter};
use pretty_assertions::assert_eq;

/// Build a minimal workbook whose column A holds `header` then `labels`
fn labels_workbook(header: &str, labels: &[&str]) -> Vec<u8> {
    let mut rows = format!(
        r#"<row r="1"><c r="A1" t="inlineStr"><is><t>{}</t></is></c></row>"#,
        header
    );
    for (i, label) in labels.iter().enumerate() {
        rows.push_str(&format!(
            r#"<row r="{r}"><c r="A{r}" t="inlineStr"><is><t>{label}</t></is></c></row>"#,
            r = i + 2,
            label = label
        ));
    }

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        let parts = [
            ("[Content_Types].xml", r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#.to_string()),
            ("xl/workbook.xml", r#"<?xml version="1.0"?><workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string()),
            ("xl/_rels/workbook.xml.rels", r#"<?xml version="1.0"?><Relationships><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string()),
            ("xl/worksheets/sheet1.xml", format!("<worksheet><sheetData>{}</sheetData></worksheet>", rows)),
        ];
        for (name, content) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

fn sheet_xml(bytes: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name("xl/worksheets/sheet1.xml").unwrap();
    let mut xml = String::new();
    file.read_to_string(&mut xml).unwrap();
    xml
}

#[test]
fn test_pivot_workbook_roundtrip() {
    let input = labels_workbook("Item", &["10x20x5 Red", "10x20x5 Red", "10x30x5 Blue"]);
    let rows = XlsxReader::read(Cursor::new(input)).unwrap();
    assert_eq!(rows.len(), 3);

    let table = Pipeline::default().run(&rows).unwrap();
    let bytes = XlsxWriter::to_bytes(&table, &XlsxWriteOptions::default()).unwrap();

    // Column A of the output holds the identifiers, header skipped
    let first_column = XlsxReader::read(Cursor::new(&bytes)).unwrap();
    assert_eq!(
        first_column,
        vec![
            RawRow::new(2, "30"),
            RawRow::new(3, "20"),
            RawRow::new(4, "Total"),
        ]
    );

    let xml = sheet_xml(&bytes);
    assert!(xml.contains("<t>1-Blue</t>"));
    assert!(xml.contains("<t>2-Red</t>"));
    assert!(!xml.contains("No."));
}

#[test]
fn test_export_is_byte_identical() {
    let table = Pipeline::default()
        .run_labels(["1x2x3 Red", "1x4x3 Blue", "1x2x3 Blue"])
        .unwrap();
    let options = XlsxWriteOptions::default();

    let first = XlsxWriter::to_bytes(&table, &options).unwrap();
    let second = XlsxWriter::to_bytes(&table, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_plain_table_keeps_color_names() {
    let table = Pipeline::new(PivotOptions::plain())
        .run_labels(["1x2x3 Red"])
        .unwrap();
    let bytes = XlsxWriter::to_bytes(&table, &XlsxWriteOptions::default()).unwrap();

    let xml = sheet_xml(&bytes);
    assert!(xml.contains("<t>Red</t>"));
    assert!(!xml.contains("1-Red"));
}

#[test]
fn test_write_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pivot.xlsx");

    let table = Pipeline::default().run_labels(["1x2x3 Red"]).unwrap();
    let options = XlsxWriteOptions {
        sheet_name: "Pivot".to_string(),
    };
    XlsxWriter::write_file(&table, &path, &options).unwrap();

    let rows = XlsxReader::read_file(&path).unwrap();
    assert_eq!(rows, vec![RawRow::new(2, "2"), RawRow::new(3, "Total")]);
}

#[test]
fn test_escaped_control_characters_survive_roundtrip() {
    let input = labels_workbook("Item", &["1x2x3 Re_x0001_d", "1x2x3 Blue"]);
    let rows = XlsxReader::read(Cursor::new(input)).unwrap();
    assert_eq!(rows[0].label.as_deref(), Some("1x2x3 Re\u{1}d"));

    let table = Pipeline::default().run(&rows).unwrap();
    let bytes = XlsxWriter::to_bytes(&table, &XlsxWriteOptions::default()).unwrap();

    let xml = sheet_xml(&bytes);
    assert!(!xml.contains('\u{1}'));
    assert!(xml.contains("<t>2-Re_x0001_d</t>"));
}

#[test]
fn test_large_identifiers_read_back_exactly() {
    let table = Pipeline::default()
        .run_labels(["1x9007199254740993x1 Red", "1x9007199254740992x1 Red"])
        .unwrap();
    let bytes = XlsxWriter::to_bytes(&table, &XlsxWriteOptions::default()).unwrap();

    let first_column = XlsxReader::read(Cursor::new(&bytes)).unwrap();
    assert_eq!(
        first_column,
        vec![
            RawRow::new(2, "9007199254740993"),
            RawRow::new(3, "9007199254740992"),
            RawRow::new(4, "Total"),
        ]
    );
}

