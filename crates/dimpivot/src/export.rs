//! Export artifacts

use std::fmt;
use std::path::Path;

use dimpivot_core::FinalTable;
use dimpivot_csv::{CsvWriteOptions, CsvWriter, CSV_MIME_TYPE};
use dimpivot_xlsx::{XlsxWriteOptions, XlsxWriter, XLSX_MIME_TYPE};

use crate::error::{Error, Result};

/// Output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Single-sheet workbook
    Xlsx,
    /// Semicolon-separated text
    Csv,
}

impl ExportFormat {
    /// Fixed download file name
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "pivot.xlsx",
            ExportFormat::Csv => "pivot.csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => XLSX_MIME_TYPE,
            ExportFormat::Csv => CSV_MIME_TYPE,
        }
    }

    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") => Ok(ExportFormat::Xlsx),
            Some("csv") => Ok(ExportFormat::Csv),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        })
    }
}

/// Writer options for both formats
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub xlsx: XlsxWriteOptions,
    pub csv: CsvWriteOptions,
}

/// An encoded table ready to hand out as a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub format: ExportFormat,
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Encode a table. Pure: equal inputs give equal bytes.
pub fn encode(
    table: &FinalTable,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<Export> {
    let bytes = match format {
        ExportFormat::Xlsx => XlsxWriter::to_bytes(table, &options.xlsx)?,
        ExportFormat::Csv => CsvWriter::to_bytes(table, &options.csv)?,
    };

    Ok(Export {
        format,
        file_name: format.file_name(),
        mime_type: format.mime_type(),
        bytes,
    })
}
