//! # dimpivot-csv
//!
//! CSV reader and writer for dimpivot.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use reader::CsvReader;
pub use writer::CsvWriter;

/// MIME type of the delimited export
pub const CSV_MIME_TYPE: &str = "text/csv";
