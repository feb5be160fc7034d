//! # dimpivot-xlsx
//!
//! XLSX (Office Open XML) support for dimpivot: reading the label column of
//! an uploaded workbook and writing a [`dimpivot_core::FinalTable`] as a
//! single-sheet workbook.

pub mod address;
pub mod error;
pub mod reader;
pub mod writer;

pub use address::CellAddress;
pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::{XlsxWriteOptions, XlsxWriter};

/// MIME type of an XLSX workbook
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
