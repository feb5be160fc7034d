//! # dimpivot
//!
//! Cross-tabulate dimension/color labels such as `10x20x5 Red` into a count
//! table keyed by the second measurement and the color.
//!
//! ## Features
//!
//! - Read the first column of XLSX or CSV files
//! - All-or-nothing validation of the label column
//! - Total row and column, descending sort and sequence-numbered color headers
//! - Deterministic XLSX and CSV exports, with an optional content-keyed cache
//!
//! ## Example
//!
//! ```rust
//! use dimpivot::prelude::*;
//!
//! let table = Pipeline::default()
//!     .run_labels(["10x20x5 Red", "10x20x5 Red", "10x30x5 Blue"])
//!     .unwrap();
//!
//! let export = encode(&table, ExportFormat::Csv, &ExportOptions::default()).unwrap();
//! assert_eq!(export.file_name, "pivot.csv");
//!
//! // let table = FinalTable::open("labels.xlsx", &PivotOptions::default()).unwrap();
//! // table.save("pivot.xlsx").unwrap();
//! ```

pub mod cache;
pub mod error;
pub mod export;
pub mod prelude;

pub use cache::ExportCache;
pub use error::{Error, Result};
pub use export::{encode, Export, ExportFormat, ExportOptions};

// Re-export core types
pub use dimpivot_core::{
    Aggregator, CellValue, CountMatrix, Extractor, FinalRow, FinalTable, GroupKey, LabelFields,
    MalformedReason, MeasureKey, NormalizedRow, Normalizer, ParsedRow, Pipeline, PivotOptions,
    PivotTable, RawRow, RowLabel, Totalizer,
};

// Re-export I/O types
pub use dimpivot_csv::{CsvError, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
pub use dimpivot_xlsx::{XlsxError, XlsxReader, XlsxWriteOptions, XlsxWriter};

use std::path::Path;

/// Read the label column of an input file, dispatching on its extension
pub fn read_rows<P: AsRef<Path>>(path: P) -> Result<Vec<RawRow>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let rows = match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => XlsxReader::read_file(path)?,
        Some("csv") => CsvReader::read_file(path, &CsvReadOptions::default())?,
        _ => return Err(Error::UnsupportedFormat(path.display().to_string())),
    };

    log::debug!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Extension trait for FinalTable to add file I/O
pub trait FinalTableExt: Sized {
    /// Read an input file and run the pipeline over it
    fn open<P: AsRef<Path>>(path: P, options: &PivotOptions) -> Result<Self>;

    /// Encode the table in the given format
    fn export(&self, format: ExportFormat) -> Result<Export>;

    /// Write the table to a file, picking the format from its extension
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl FinalTableExt for FinalTable {
    fn open<P: AsRef<Path>>(path: P, options: &PivotOptions) -> Result<FinalTable> {
        let rows = read_rows(path)?;
        Ok(Pipeline::new(options.clone()).run(&rows)?)
    }

    fn export(&self, format: ExportFormat) -> Result<Export> {
        encode(self, format, &ExportOptions::default())
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        match ExportFormat::from_path(path)? {
            ExportFormat::Xlsx => {
                XlsxWriter::write_file(self, path, &XlsxWriteOptions::default())?
            }
            ExportFormat::Csv => CsvWriter::write_file(self, path, &CsvWriteOptions::default())?,
        }
        Ok(())
    }
}
