//! XLSX writer for pivot tables
//!
//! Produces a single-sheet workbook: a bold header row with the column labels
//! followed by one row per table row. The row-number column is not written.
//! Every ZIP entry carries the same fixed timestamp, so equal tables encode to
//! equal bytes.

use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use crate::address::{CellAddress, MAX_COLS, MAX_ROWS};
use crate::error::{XlsxError, XlsxResult};
use dimpivot_core::{CellValue, FinalTable};

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters not allowed in sheet names
const SHEET_NAME_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// Style index of the header cells in styles.xml
const HEADER_XF: u32 = 1;

/// Options for writing a table as XLSX
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XlsxWriteOptions {
    /// Worksheet name (sanitized before writing)
    pub sheet_name: String,
}

impl Default for XlsxWriteOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
        }
    }
}

/// Replace characters Excel rejects and clamp to the maximum length
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if SHEET_NAME_ILLEGAL.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();

    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned.to_string()
    }
}

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a table to a file path
    pub fn write_file<P: AsRef<Path>>(
        table: &FinalTable,
        path: P,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(table, file, options)
    }

    /// Encode a table into an in-memory workbook
    pub fn to_bytes(table: &FinalTable, options: &XlsxWriteOptions) -> XlsxResult<Vec<u8>> {
        let mut buf = Vec::new();
        Self::write(table, Cursor::new(&mut buf), options)?;
        Ok(buf)
    }

    /// Write a table to a writer
    pub fn write<W: Write + Seek>(
        table: &FinalTable,
        writer: W,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let sheet_name = sanitize_sheet_name(&options.sheet_name);

        Self::write_part(&mut zip, "[Content_Types].xml", CONTENT_TYPES_XML)?;
        Self::write_part(&mut zip, "_rels/.rels", ROOT_RELS_XML)?;
        Self::write_part(&mut zip, "xl/workbook.xml", &Self::workbook_xml(&sheet_name))?;
        Self::write_part(&mut zip, "xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML)?;
        Self::write_part(&mut zip, "xl/styles.xml", STYLES_XML)?;
        let worksheet = Self::worksheet_xml(table)?;
        Self::write_part(&mut zip, "xl/worksheets/sheet1.xml", &worksheet)?;

        zip.finish()?;
        log::debug!(
            "wrote {} table rows to sheet '{}'",
            table.rows().len(),
            sheet_name
        );
        Ok(())
    }

    fn write_part<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default()
            .last_modified_time(zip::DateTime::default());
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn workbook_xml(sheet_name: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="{}" sheetId="1" r:id="rId1"/>
    </sheets>
</workbook>"#,
            escape_xml(sheet_name)
        )
    }

    fn worksheet_xml(table: &FinalTable) -> XlsxResult<String> {
        let header = table.header_record(false);
        let records = table.records(false);

        // One header row plus the records
        if header.len() > MAX_COLS as usize || records.len() + 1 > MAX_ROWS as usize {
            return Err(XlsxError::SheetTooLarge {
                rows: records.len() + 1,
                cols: header.len(),
            });
        }

        let last = CellAddress::new(records.len() as u32, (header.len() - 1) as u16);
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <dimension ref="A1:{}"/>
    <sheetData>"#,
            last
        );

        content.push_str("\n        <row r=\"1\">");
        for (col, text) in header.iter().enumerate() {
            let cell_ref = CellAddress::new(0, col as u16);
            content.push_str(&format!(
                "\n            <c r=\"{}\" s=\"{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                cell_ref,
                HEADER_XF,
                escape_cell_text(text)
            ));
        }
        content.push_str("\n        </row>");

        for (i, record) in records.iter().enumerate() {
            let row = i as u32 + 1;
            content.push_str(&format!("\n        <row r=\"{}\">", row + 1));
            for (col, value) in record.iter().enumerate() {
                let cell_ref = CellAddress::new(row, col as u16);
                Self::push_cell(&mut content, &cell_ref.to_a1_string(), value);
            }
            content.push_str("\n        </row>");
        }

        content.push_str("\n    </sheetData>\n</worksheet>");
        Ok(content)
    }

    fn push_cell(content: &mut String, cell_ref: &str, value: &CellValue) {
        match value {
            CellValue::Number(n) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\"><v>{}</v></c>",
                    cell_ref, n
                ));
            }
            CellValue::String(s) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                    cell_ref,
                    escape_cell_text(s)
                ));
            }
            CellValue::Boolean(b) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\" t=\"b\"><v>{}</v></c>",
                    cell_ref,
                    if *b { 1 } else { 0 }
                ));
            }
            CellValue::Empty => {}
        }
    }
}

/// Escape cell text.
///
/// Characters XML 1.0 forbids become `_xHHHH_` escapes. The underscore of a
/// literal `_xHHHH_` run is itself escaped as `_x005F_` so the reader decodes
/// the text back unchanged.
fn escape_cell_text(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '\t' | '\n' | '\r' => escaped.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {
                escaped.push_str(&format!("_x{:04X}_", c as u32));
            }
            '_' if starts_with_escape(&s[i..]) => escaped.push_str("_x005F_"),
            c => escaped.push(c),
        }
    }
    escape_xml(&escaped)
}

/// Whether `s` begins with an `_xHHHH_` sequence
fn starts_with_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 7
        && bytes.starts_with(b"_x")
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

// xf 0 is the default cell format, xf 1 the bold header
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="2">
        <font><sz val="11"/><name val="Calibri"/></font>
        <font><b/><sz val="11"/><name val="Calibri"/></font>
    </fonts>
    <fills count="2">
        <fill><patternFill patternType="none"/></fill>
        <fill><patternFill patternType="gray125"/></fill>
    </fills>
    <borders count="1">
        <border><left/><right/><top/><bottom/><diagonal/></border>
    </borders>
    <cellStyleXfs count="1">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    </cellStyleXfs>
    <cellXfs count="2">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
        <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
    </cellXfs>
    <cellStyles count="1">
        <cellStyle name="Normal" xfId="0" builtinId="0"/>
    </cellStyles>
</styleSheet>"#;
