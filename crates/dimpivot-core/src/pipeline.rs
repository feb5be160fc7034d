//! End-to-end pipeline and its options

use crate::aggregate::Aggregator;
use crate::error::Result;
use crate::extract::Extractor;
use crate::normalize::Normalizer;
use crate::row::RawRow;
use crate::table::{FinalTable, Totalizer};

/// Options for building the final table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotOptions {
    /// Header of the identifier (second measurement) column
    pub id_header: String,
    /// Header of the row-number column, where exported
    pub number_header: String,
    /// Label of the total row and total column
    pub total_label: String,
    /// Sort data rows by measure, largest first
    pub sort_descending: bool,
    /// Prefix color headers with their position
    pub sequence_labels: bool,
}

impl Default for PivotOptions {
    fn default() -> Self {
        Self {
            id_header: "Measurement2".to_string(),
            number_header: "No.".to_string(),
            total_label: "Total".to_string(),
            sort_descending: true,
            sequence_labels: true,
        }
    }
}

impl PivotOptions {
    /// Ascending rows and unprefixed color headers
    pub fn plain() -> Self {
        Self {
            sort_descending: false,
            sequence_labels: false,
            ..Default::default()
        }
    }
}

/// Runs extraction, normalization, aggregation and totals in order
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PivotOptions,
}

impl Pipeline {
    pub fn new(options: PivotOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PivotOptions {
        &self.options
    }

    /// Build the final table, or reject the whole batch
    pub fn run(&self, rows: &[RawRow]) -> Result<FinalTable> {
        let parsed = Extractor::extract(rows)?;
        let normalized = Normalizer::normalize(&parsed)?;
        let pivot = Aggregator::aggregate(&normalized);
        let table = Totalizer::totalize(&pivot, &self.options);

        log::debug!(
            "built table with {} data rows and {} colors (grand total {})",
            pivot.row_count(),
            pivot.col_count(),
            table.grand_total()
        );
        Ok(table)
    }

    /// Convenience for label lists numbered from source row 2
    pub fn run_labels<I, S>(&self, labels: I) -> Result<FinalTable>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(&RawRow::from_labels(labels))
    }
}
