//! CSV label reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvReadOptions;
use dimpivot_core::{CellValue, RawRow};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read the label rows of a CSV file
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Vec<RawRow>> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read the first field of every non-blank record.
    ///
    /// Row numbers are the 1-based line numbers of the records.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Vec<RawRow>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let first_data_line = if options.has_header { 2 } else { 1 };
            let row = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + first_data_line);
            let label = record
                .get(0)
                .map(CellValue::string)
                .and_then(|v| v.to_label());

            rows.push(RawRow { row, label });
        }

        log::debug!("read {} label rows from CSV", rows.len());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_skips_header_and_blank_lines() {
        let data = "Item,Qty\n10x20x5 Red,1\n\n,2\n\"10x30x5 Dark, Blue\",3\n";
        let rows = CsvReader::read(data.as_bytes(), &CsvReadOptions::default()).unwrap();

        assert_eq!(
            rows,
            vec![
                RawRow::new(2, "10x20x5 Red"),
                RawRow::blank(4),
                RawRow::new(5, "10x30x5 Dark, Blue"),
            ]
        );
    }

    #[test]
    fn test_read_without_header() {
        let options = CsvReadOptions {
            delimiter: b';',
            has_header: false,
            ..Default::default()
        };
        let rows = CsvReader::read("1x2x3 Red;x\n".as_bytes(), &options).unwrap();
        assert_eq!(rows, vec![RawRow::new(1, "1x2x3 Red")]);
    }
}
