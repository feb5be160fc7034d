//! Label extraction
//!
//! A label looks like `10x20x5 Red`: three digit runs separated by `x` or `X`,
//! at least one whitespace character, then the color text. Only the start of
//! the label has to match; the color runs to the end of the first line.

use lazy_regex::{lazy_regex, Lazy, Regex};

use crate::error::{Error, MalformedReason, Result};
use crate::row::{LabelFields, ParsedRow, RawRow};

static LABEL_PATTERN: Lazy<Regex> = lazy_regex!(r"^(\d+)[xX](\d+)[xX](\d+)\s+(.+)");

/// Extract the measurement triplet and color from one label
pub fn extract_label(label: &str) -> Option<LabelFields> {
    let caps = LABEL_PATTERN.captures(label)?;

    Some(LabelFields {
        measurement1: caps[1].to_string(),
        measurement2: caps[2].to_string(),
        measurement3: caps[3].to_string(),
        color: caps[4].trim().to_string(),
    })
}

/// First pipeline stage
pub struct Extractor;

impl Extractor {
    /// Parse every row, rejecting the batch if any label does not match
    pub fn extract(rows: &[RawRow]) -> Result<Vec<ParsedRow>> {
        if rows.is_empty() {
            return Err(Error::malformed(MalformedReason::NoData, Vec::new()));
        }

        let parsed: Vec<ParsedRow> = rows.iter().map(Self::parse_row).collect();

        let failed: Vec<usize> = parsed
            .iter()
            .filter(|p| !p.is_match())
            .map(|p| p.row)
            .collect();
        if !failed.is_empty() {
            log::warn!(
                "rejecting batch: {} of {} labels do not match",
                failed.len(),
                parsed.len()
            );
            return Err(Error::malformed(MalformedReason::PatternMismatch, failed));
        }

        log::debug!("extracted {} rows", parsed.len());
        Ok(parsed)
    }

    fn parse_row(raw: &RawRow) -> ParsedRow {
        ParsedRow {
            row: raw.row,
            label: raw.label.clone(),
            fields: raw.label.as_deref().and_then(extract_label),
        }
    }
}
