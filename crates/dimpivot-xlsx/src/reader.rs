//! XLSX label reader
//!
//! Only the first worksheet is read, and of it only column A. The first
//! occupied row is the header; every later row that holds at least one value
//! (in any column) becomes a [`RawRow`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::address::CellAddress;
use crate::error::{XlsxError, XlsxResult};
use dimpivot_core::{CellValue, RawRow};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// - `_x000d_` = CR
/// - `_x000a_` = LF
/// - `_x005f_` = underscore
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("_x") {
        result.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Column A of the first sheet plus the set of non-empty rows
#[derive(Debug, Default)]
struct SheetColumn {
    first: BTreeMap<u32, CellValue>,
    occupied: BTreeSet<u32>,
}

impl SheetColumn {
    fn into_rows(self) -> Vec<RawRow> {
        let mut occupied = self.occupied.into_iter();
        // The first occupied row is the header
        if occupied.next().is_none() {
            return Vec::new();
        }

        occupied
            .map(|row| RawRow {
                row: row as usize + 1,
                label: self.first.get(&row).and_then(CellValue::to_label),
            })
            .collect()
    }
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read the label rows of a workbook file
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Vec<RawRow>> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read the label rows of a workbook
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Vec<RawRow>> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;

        let (sheet_name, r_id) = Self::read_first_sheet(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;
        let path = sheet_paths.get(&r_id).ok_or_else(|| {
            XlsxError::MissingPart(format!("worksheet for relationship {}", r_id))
        })?;

        let column = Self::read_first_column(&mut archive, path, &shared_strings)?;
        let rows = column.into_rows();
        log::debug!("read {} label rows from sheet '{}'", rows.len(), sheet_name);
        Ok(rows)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        // Text is not trimmed: whitespace inside <t> is significant
        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current.push_str(&e.unescape()?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Name and relationship id of the first sheet in workbook.xml
    fn read_first_sheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<(String, String)> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let name = attribute(&e, b"name")?;
                    let r_id = attribute(&e, b"r:id")?;

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        return Ok((name, r_id));
                    }
                    log::warn!("skipping <sheet> element without name or r:id");
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Err(XlsxError::InvalidFormat("Workbook has no sheets".into()))
    }

    /// Read workbook.xml.rels to get worksheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attribute(&e, b"Id")?;
                    let target = attribute(&e, b"Target")?;
                    let rel_type = attribute(&e, b"Type")?;

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ unless absolute
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Collect column A and the occupied rows of a worksheet
    fn read_first_column<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        shared_strings: &[String],
    ) -> XlsxResult<SheetColumn> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut column = SheetColumn::default();

        // Position for rows and cells that omit their `r` attribute
        let mut current_row: Option<u32> = None;
        let mut next_col: u16 = 0;

        let mut current_cell: Option<CellAddress> = None;
        let mut current_type: Option<String> = None;
        let mut current_value = String::new();
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        current_row = Some(Self::row_index(&e, current_row)?);
                        next_col = 0;
                    }
                    b"c" => {
                        let addr = Self::cell_address(&e, current_row, next_col)?;
                        next_col = addr.col.saturating_add(1);
                        current_cell = Some(addr);
                        current_type = attribute(&e, b"t")?;
                        current_value.clear();
                    }
                    b"v" if current_cell.is_some() => in_value = true,
                    b"is" if current_cell.is_some() => in_inline_str = true,
                    b"rPh" => in_phonetic = true,
                    b"t" if in_inline_str && !in_phonetic => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" => {
                        current_row = Some(Self::row_index(&e, current_row)?);
                        next_col = 0;
                    }
                    b"c" => {
                        let addr = Self::cell_address(&e, current_row, next_col)?;
                        next_col = addr.col.saturating_add(1);
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_inline_text => {
                    current_value.push_str(&e.unescape()?);
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(addr) = current_cell.take() {
                            let value = Self::cell_value(
                                current_type.take().as_deref(),
                                &current_value,
                                shared_strings,
                            )?;
                            if !value.is_empty() {
                                column.occupied.insert(addr.row);
                                if addr.col == 0 {
                                    column.first.insert(addr.row, value);
                                }
                            }
                        }
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"rPh" => in_phonetic = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(column)
    }

    fn row_index(e: &BytesStart, previous: Option<u32>) -> XlsxResult<u32> {
        match attribute(e, b"r")? {
            Some(r) => {
                let r: u32 = r
                    .parse()
                    .map_err(|_| XlsxError::Parse(format!("Invalid row number: {}", r)))?;
                r.checked_sub(1)
                    .ok_or_else(|| XlsxError::Parse("Row number must be >= 1".into()))
            }
            None => Ok(previous.map_or(0, |p| p + 1)),
        }
    }

    fn cell_address(
        e: &BytesStart,
        current_row: Option<u32>,
        next_col: u16,
    ) -> XlsxResult<CellAddress> {
        match attribute(e, b"r")? {
            Some(r) => CellAddress::parse(&r),
            None => Ok(CellAddress::new(current_row.unwrap_or(0), next_col)),
        }
    }

    /// Convert the raw `<v>`/inline text of a cell according to its type
    fn cell_value(
        cell_type: Option<&str>,
        raw: &str,
        shared_strings: &[String],
    ) -> XlsxResult<CellValue> {
        if raw.is_empty() {
            return Ok(CellValue::Empty);
        }

        let value = match cell_type {
            // Shared string
            Some("s") => {
                let idx: usize = raw.parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", raw))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::string(s.as_str())
            }

            // Boolean
            Some("b") => CellValue::Boolean(raw == "1" || raw.eq_ignore_ascii_case("true")),

            // Inline or formula string
            Some("inlineStr") | Some("str") => CellValue::string(decode_excel_escapes(raw)),

            // Number (default type or explicit "n")
            None | Some("n") => match raw.parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::string(raw),
            },

            // Errors and unknown types keep their text
            Some(_) => CellValue::string(raw),
        };

        Ok(value)
    }
}

/// Read one attribute as an owned string
fn attribute(e: &BytesStart, key: &[u8]) -> XlsxResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XlsxError::Parse(err.to_string()))?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
