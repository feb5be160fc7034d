//! Row types flowing through the pipeline stages

use std::fmt;

/// One input record: the first-column text of a source row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based row number in the source sheet
    pub row: usize,
    /// Label text, `None` when the cell was empty
    pub label: Option<String>,
}

impl RawRow {
    /// Create a row with a label
    pub fn new<S: Into<String>>(row: usize, label: S) -> Self {
        Self {
            row,
            label: Some(label.into()),
        }
    }

    /// Create a row whose label cell is empty
    pub fn blank(row: usize) -> Self {
        Self { row, label: None }
    }

    /// Number labels consecutively, starting at source row 2 (row 1 is the header)
    pub fn from_labels<I, S>(labels: I) -> Vec<RawRow>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| RawRow::new(i + 2, label))
            .collect()
    }
}

/// The four captures taken from a label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFields {
    pub measurement1: String,
    pub measurement2: String,
    pub measurement3: String,
    pub color: String,
}

/// A raw row after extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based row number in the source sheet
    pub row: usize,
    /// Original label text
    pub label: Option<String>,
    /// Extracted fields, `None` if the label did not match
    pub fields: Option<LabelFields>,
}

impl ParsedRow {
    /// Whether extraction produced all four fields
    pub fn is_match(&self) -> bool {
        self.fields.is_some()
    }
}

/// Committed numeric key for the second measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeasureKey(u64);

impl MeasureKey {
    /// Create a key from a number
    pub const fn new(value: u64) -> Self {
        MeasureKey(value)
    }

    /// Coerce trimmed text to a key; `None` is the not-a-number sentinel
    pub fn coerce(text: &str) -> Option<Self> {
        text.trim().parse::<u64>().ok().map(MeasureKey)
    }

    /// Numeric value of the key
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MeasureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MeasureKey {
    fn from(value: u64) -> Self {
        MeasureKey(value)
    }
}

/// A parsed row after trimming and numeric coercion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    /// 1-based row number in the source sheet
    pub row: usize,
    pub measurement1: String,
    pub measure: MeasureKey,
    pub measurement3: String,
    pub color: String,
}
