//! Delimited text writer for pivot tables

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::{CsvWriteOptions, LineTerminator};
use dimpivot_core::{CellValue, FinalTable};

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a table to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        table: &FinalTable,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(table, file, options)
    }

    /// Encode a table as UTF-8 delimited text
    pub fn to_bytes(table: &FinalTable, options: &CsvWriteOptions) -> CsvResult<Vec<u8>> {
        let mut buf = Vec::new();
        Self::write(table, &mut buf, options)?;
        Ok(buf)
    }

    /// Write a table to a writer
    pub fn write<W: Write>(
        table: &FinalTable,
        writer: W,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        if options.decimal_separator.to_string().as_bytes() == [options.delimiter] {
            return Err(CsvError::InvalidOption(
                "decimal separator must differ from the delimiter".into(),
            ));
        }

        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .from_writer(writer);

        if options.write_header {
            csv_writer.write_record(table.header_record(options.write_row_numbers))?;
        }

        for record in table.records(options.write_row_numbers) {
            let fields: Vec<String> = record
                .iter()
                .map(|value| format_value(value, options.decimal_separator))
                .collect();
            csv_writer.write_record(&fields)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// Render a cell, using `decimal` in place of the decimal point
fn format_value(value: &CellValue, decimal: char) -> String {
    let text = value.to_string();
    match value {
        CellValue::Number(_) if decimal != '.' => text.replace('.', &decimal.to_string()),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_decimal_separator() {
        assert_eq!(format_value(&CellValue::Number(2.5), ','), "2,5");
        assert_eq!(format_value(&CellValue::Number(3.0), ','), "3");
        assert_eq!(format_value(&CellValue::Number(2.5), '.'), "2.5");
        assert_eq!(format_value(&CellValue::string("1.5 m"), ','), "1.5 m");
    }
}
