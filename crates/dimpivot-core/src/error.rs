//! Error types for dimpivot-core

use std::fmt;

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum number of offending rows spelled out in an error message
const MAX_LISTED_ROWS: usize = 10;

/// Errors that can occur in dimpivot-core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The batch failed validation and was rejected as a whole.
    ///
    /// `rows` holds the 1-based source row numbers that caused the rejection
    /// (empty when the batch had no data rows at all).
    #[error("Malformed input: {reason}{}", describe_rows(.rows))]
    MalformedInput {
        reason: MalformedReason,
        rows: Vec<usize>,
    },
}

impl Error {
    /// Create a malformed-input error for the given rows
    pub fn malformed(reason: MalformedReason, rows: Vec<usize>) -> Self {
        Error::MalformedInput { reason, rows }
    }

    /// Check if this is a malformed-input error
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Error::MalformedInput { .. })
    }

    /// Source rows that caused the error
    pub fn rows(&self) -> &[usize] {
        match self {
            Error::MalformedInput { rows, .. } => rows,
        }
    }
}

/// Why a batch was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MalformedReason {
    /// The input has a header but no data rows
    NoData,
    /// A label does not start with `<n>x<n>x<n> <color>`
    PatternMismatch,
    /// The color part is empty after trimming
    MissingColor,
    /// The second measurement could not be read as a number
    NonNumericMeasure,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MalformedReason::NoData => "no data rows",
            MalformedReason::PatternMismatch => {
                "label does not match '<n>x<n>x<n> <color>'"
            }
            MalformedReason::MissingColor => "missing color",
            MalformedReason::NonNumericMeasure => "second measurement is not numeric",
        };
        f.write_str(text)
    }
}

fn describe_rows(rows: &[usize]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let listed: Vec<String> = rows
        .iter()
        .take(MAX_LISTED_ROWS)
        .map(|r| r.to_string())
        .collect();

    let mut text = format!(" (row {}", listed.join(", "));
    if rows.len() > MAX_LISTED_ROWS {
        text.push_str(&format!(" and {} more", rows.len() - MAX_LISTED_ROWS));
    }
    text.push(')');
    text
}
