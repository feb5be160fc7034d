//! Cell value types shared by the readers and writers

use std::fmt;

/// A single spreadsheet cell as seen by the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell (no value)
    Empty,

    /// Numeric value
    Number(f64),

    /// String value
    String(String),

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Get as number (if numeric)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string slice (if string)
    pub fn as_string(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Text a label extractor should see for this cell.
    ///
    /// Empty cells and blank strings have no label.
    pub fn to_label(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::String(s) if s.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Largest integer an `f64` represents exactly (2^53)
pub const MAX_EXACT_INTEGER: u64 = 1 << 53;

impl From<u64> for CellValue {
    /// Integers beyond `f64` precision are kept as their decimal text
    fn from(n: u64) -> Self {
        if n <= MAX_EXACT_INTEGER {
            CellValue::Number(n as f64)
        } else {
            CellValue::String(n.to_string())
        }
    }
}

impl From<usize> for CellValue {
    fn from(n: usize) -> Self {
        CellValue::from(n as u64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}
