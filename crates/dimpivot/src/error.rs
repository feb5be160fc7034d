//! Error types for the dimpivot facade

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the facade
#[derive(Debug, Error)]
pub enum Error {
    /// The batch was rejected by the pipeline
    #[error(transparent)]
    Pivot(#[from] dimpivot_core::Error),

    /// XLSX read/write error
    #[error(transparent)]
    Xlsx(#[from] dimpivot_xlsx::XlsxError),

    /// CSV read/write error
    #[error(transparent)]
    Csv(#[from] dimpivot_csv::CsvError),

    /// File extension not handled
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Whether the input file itself was malformed (as opposed to unreadable)
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Error::Pivot(e) if e.is_malformed_input())
    }
}
