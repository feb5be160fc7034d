//! Grouping and pivot construction

use std::collections::{BTreeMap, BTreeSet};

use crate::row::{MeasureKey, NormalizedRow};

/// Bucket a row is counted in
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub measure: MeasureKey,
    pub color: String,
}

impl GroupKey {
    pub fn new<S: Into<String>>(measure: MeasureKey, color: S) -> Self {
        Self {
            measure,
            color: color.into(),
        }
    }
}

/// Occurrence counts per [`GroupKey`]; every stored count is positive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountMatrix {
    counts: BTreeMap<GroupKey, u64>,
}

impl CountMatrix {
    /// Count rows by exact (measure, color) match
    pub fn from_rows(rows: &[NormalizedRow]) -> Self {
        let mut counts = BTreeMap::new();
        for row in rows {
            *counts
                .entry(GroupKey::new(row.measure, row.color.as_str()))
                .or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Count for a key (0 when never observed)
    pub fn get(&self, measure: MeasureKey, color: &str) -> u64 {
        self.counts
            .get(&GroupKey::new(measure, color))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if no rows were counted
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Iterate keys and counts in key order
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, u64)> {
        self.counts.iter().map(|(k, v)| (k, *v))
    }
}

/// Dense rows x columns count table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotTable {
    row_keys: Vec<MeasureKey>,
    col_keys: Vec<String>,
    /// Row-major, `row_keys.len() * col_keys.len()` cells
    cells: Vec<u64>,
}

impl PivotTable {
    /// Materialize a count matrix, filling unobserved combinations with 0.
    ///
    /// Row keys ascend numerically, column keys ascend byte-wise.
    pub fn from_counts(counts: &CountMatrix) -> Self {
        let row_keys: Vec<MeasureKey> = counts
            .iter()
            .map(|(k, _)| k.measure)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let col_keys: Vec<String> = counts
            .iter()
            .map(|(k, _)| k.color.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = Vec::with_capacity(row_keys.len() * col_keys.len());
        for &measure in &row_keys {
            for color in &col_keys {
                cells.push(counts.get(measure, color));
            }
        }

        Self {
            row_keys,
            col_keys,
            cells,
        }
    }

    /// Row keys in table order
    pub fn row_keys(&self) -> &[MeasureKey] {
        &self.row_keys
    }

    /// Column keys in table order
    pub fn col_keys(&self) -> &[String] {
        &self.col_keys
    }

    /// Cell by position
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn cell(&self, row: usize, col: usize) -> u64 {
        assert!(col < self.col_keys.len(), "column index out of bounds");
        self.cells[row * self.col_keys.len() + col]
    }

    /// Cell by key (0 when either key is absent)
    pub fn get(&self, measure: MeasureKey, color: &str) -> u64 {
        let row = self.row_keys.binary_search(&measure).ok();
        let col = self.col_keys.iter().position(|c| c == color);
        match (row, col) {
            (Some(r), Some(c)) => self.cell(r, c),
            _ => 0,
        }
    }

    /// Cells of one row
    pub fn row(&self, row: usize) -> &[u64] {
        let width = self.col_keys.len();
        &self.cells[row * width..(row + 1) * width]
    }

    /// Sum of one row
    pub fn row_sum(&self, row: usize) -> u64 {
        self.row(row).iter().sum()
    }

    /// Sum of one column
    pub fn col_sum(&self, col: usize) -> u64 {
        (0..self.row_keys.len()).map(|r| self.cell(r, col)).sum()
    }

    /// Sum of every cell
    pub fn grand_total(&self) -> u64 {
        self.cells.iter().sum()
    }

    pub fn row_count(&self) -> usize {
        self.row_keys.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_keys.len()
    }
}

/// Third pipeline stage
pub struct Aggregator;

impl Aggregator {
    /// Group rows and pivot the counts
    pub fn aggregate(rows: &[NormalizedRow]) -> PivotTable {
        let counts = CountMatrix::from_rows(rows);
        let pivot = PivotTable::from_counts(&counts);
        log::debug!(
            "pivoted {} rows into {} x {} cells",
            rows.len(),
            pivot.row_count(),
            pivot.col_count()
        );
        pivot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(measure: u64, color: &str) -> NormalizedRow {
        NormalizedRow {
            row: 0,
            measurement1: "10".into(),
            measure: MeasureKey::new(measure),
            measurement3: "5".into(),
            color: color.into(),
        }
    }

    #[test]
    fn test_count_matrix_groups_exact_matches() {
        let counts = CountMatrix::from_rows(&[row(20, "Red"), row(20, "Red"), row(20, "red")]);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get(MeasureKey::new(20), "Red"), 2);
        assert_eq!(counts.get(MeasureKey::new(20), "red"), 1);
        assert_eq!(counts.get(MeasureKey::new(30), "Red"), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_pivot_is_dense() {
        let pivot = Aggregator::aggregate(&[row(20, "Red"), row(20, "Red"), row(30, "Blue")]);

        assert_eq!(
            pivot.row_keys(),
            &[MeasureKey::new(20), MeasureKey::new(30)]
        );
        assert_eq!(pivot.col_keys(), &["Blue".to_string(), "Red".to_string()]);
        assert_eq!(pivot.get(MeasureKey::new(20), "Red"), 2);
        assert_eq!(pivot.get(MeasureKey::new(20), "Blue"), 0);
        assert_eq!(pivot.get(MeasureKey::new(30), "Red"), 0);
        assert_eq!(pivot.get(MeasureKey::new(30), "Blue"), 1);
        assert_eq!(pivot.row(0), &[0, 2]);
    }

    #[test]
    fn test_pivot_rows_sort_numerically() {
        let pivot = Aggregator::aggregate(&[row(10, "Red"), row(9, "Red"), row(100, "Red")]);
        assert_eq!(
            pivot.row_keys(),
            &[MeasureKey::new(9), MeasureKey::new(10), MeasureKey::new(100)]
        );
    }

    #[test]
    fn test_pivot_marginals() {
        let pivot = Aggregator::aggregate(&[
            row(20, "Red"),
            row(20, "Blue"),
            row(30, "Blue"),
            row(30, "Blue"),
        ]);
        assert_eq!(pivot.row_sum(0), 2);
        assert_eq!(pivot.row_sum(1), 2);
        assert_eq!(pivot.col_sum(0), 3);
        assert_eq!(pivot.col_sum(1), 1);
        assert_eq!(pivot.grand_total(), 4);
    }
}
