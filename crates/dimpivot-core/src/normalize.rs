//! Trimming, numeric coercion and re-validation of extracted rows

use crate::error::{Error, MalformedReason, Result};
use crate::row::{MeasureKey, NormalizedRow, ParsedRow};

/// Second pipeline stage
pub struct Normalizer;

impl Normalizer {
    /// Commit every row to a numeric key and a trimmed color.
    ///
    /// The batch is rejected if any row lacks fields, has an empty color or a
    /// second measurement that does not coerce to a number. The reported
    /// reason is the one of the first offending row; all offending rows are
    /// listed.
    pub fn normalize(rows: &[ParsedRow]) -> Result<Vec<NormalizedRow>> {
        let mut normalized = Vec::with_capacity(rows.len());
        let mut reason = None;
        let mut failed = Vec::new();

        for parsed in rows {
            match Self::normalize_row(parsed) {
                Ok(row) => normalized.push(row),
                Err(r) => {
                    reason.get_or_insert(r);
                    failed.push(parsed.row);
                }
            }
        }

        if let Some(reason) = reason {
            log::warn!("rejecting batch: {} rows fail normalization", failed.len());
            return Err(Error::malformed(reason, failed));
        }

        Ok(normalized)
    }

    fn normalize_row(parsed: &ParsedRow) -> std::result::Result<NormalizedRow, MalformedReason> {
        let fields = parsed
            .fields
            .as_ref()
            .ok_or(MalformedReason::PatternMismatch)?;

        let color = fields.color.trim();
        if color.is_empty() {
            return Err(MalformedReason::MissingColor);
        }

        let measure =
            MeasureKey::coerce(&fields.measurement2).ok_or(MalformedReason::NonNumericMeasure)?;

        Ok(NormalizedRow {
            row: parsed.row,
            measurement1: fields.measurement1.clone(),
            measure,
            measurement3: fields.measurement3.clone(),
            color: color.to_string(),
        })
    }
}
