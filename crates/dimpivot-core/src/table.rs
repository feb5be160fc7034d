//! Totals, ordering and labeling of the pivot
//!
//! [`Totalizer::totalize`] turns a [`PivotTable`] into a [`FinalTable`] in a
//! fixed order: total column, total row, optional descending sort, optional
//! sequence labels, row numbering. Each step consumes the table and returns a
//! new one.

use std::cmp::Ordering;
use std::fmt;

use crate::aggregate::PivotTable;
use crate::pipeline::PivotOptions;
use crate::row::MeasureKey;
use crate::value::CellValue;

/// Identifier of a table row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowLabel {
    /// A data row for one second-measurement value
    Measure(MeasureKey),
    /// The synthetic total row
    Total,
}

impl RowLabel {
    pub fn is_total(&self) -> bool {
        matches!(self, RowLabel::Total)
    }

    /// Ordering used by the descending sort: larger measures first, total last
    fn cmp_descending(&self, other: &RowLabel) -> Ordering {
        match (self, other) {
            (RowLabel::Total, RowLabel::Total) => Ordering::Equal,
            (RowLabel::Total, _) => Ordering::Greater,
            (_, RowLabel::Total) => Ordering::Less,
            (RowLabel::Measure(a), RowLabel::Measure(b)) => b.cmp(a),
        }
    }
}

/// One row of a [`FinalTable`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FinalRow {
    /// 1-based display position
    pub number: usize,
    pub label: RowLabel,
    /// Counts per color column, in column order
    pub counts: Vec<u64>,
    /// Sum of `counts`
    pub total: u64,
}

/// Pivot with marginal totals, ready for export
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FinalTable {
    id_header: String,
    number_header: String,
    total_label: String,
    colors: Vec<String>,
    color_headers: Vec<String>,
    rows: Vec<FinalRow>,
}

impl FinalTable {
    /// Header of the identifier column
    pub fn id_header(&self) -> &str {
        &self.id_header
    }

    /// Header of the row-number column
    pub fn number_header(&self) -> &str {
        &self.number_header
    }

    /// Label used for the total row and total column
    pub fn total_label(&self) -> &str {
        &self.total_label
    }

    /// Colors in column order, without sequence prefixes
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// Color column headers as exported
    pub fn color_headers(&self) -> &[String] {
        &self.color_headers
    }

    /// Full header: identifier, colors, total
    pub fn headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(self.colors.len() + 2);
        headers.push(self.id_header.clone());
        headers.extend(self.color_headers.iter().cloned());
        headers.push(self.total_label.clone());
        headers
    }

    /// All rows in display order, total row included
    pub fn rows(&self) -> &[FinalRow] {
        &self.rows
    }

    /// Rows other than the total row
    pub fn data_rows(&self) -> impl Iterator<Item = &FinalRow> {
        self.rows.iter().filter(|r| !r.label.is_total())
    }

    /// The synthetic total row
    pub fn total_row(&self) -> Option<&FinalRow> {
        self.rows.iter().find(|r| r.label.is_total())
    }

    /// Row for a measure
    pub fn row(&self, measure: MeasureKey) -> Option<&FinalRow> {
        self.rows
            .iter()
            .find(|r| r.label == RowLabel::Measure(measure))
    }

    /// Count for a measure and an (unprefixed) color
    pub fn cell(&self, measure: MeasureKey, color: &str) -> Option<u64> {
        let col = self.colors.iter().position(|c| c == color)?;
        self.row(measure).map(|r| r.counts[col])
    }

    /// Total-row / total-column corner
    pub fn grand_total(&self) -> u64 {
        self.total_row().map(|r| r.total).unwrap_or(0)
    }

    /// Sort data rows by measure, largest first; the total row stays last
    pub fn sorted_descending(mut self) -> Self {
        self.rows.sort_by(|a, b| a.label.cmp_descending(&b.label));
        self.numbered()
    }

    /// Prefix color headers with their 1-based position, e.g. `2-Blue`
    pub fn with_sequence_labels(mut self) -> Self {
        self.color_headers = self
            .colors
            .iter()
            .enumerate()
            .map(|(i, color)| format!("{}-{}", i + 1, color))
            .collect();
        self
    }

    /// Assign 1-based display numbers in current order
    fn numbered(mut self) -> Self {
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.number = i + 1;
        }
        self
    }

    /// Cells of one row as exported; the identifier cell holds the measure
    /// number or the total label
    pub fn record(&self, row: &FinalRow, with_number: bool) -> Vec<CellValue> {
        let mut record = Vec::with_capacity(self.colors.len() + 3);
        if with_number {
            record.push(CellValue::from(row.number));
        }
        record.push(match row.label {
            RowLabel::Measure(m) => CellValue::from(m.value()),
            RowLabel::Total => CellValue::string(self.total_label.as_str()),
        });
        record.extend(row.counts.iter().map(|&c| CellValue::from(c)));
        record.push(CellValue::from(row.total));
        record
    }

    /// Header record, optionally preceded by the row-number header
    pub fn header_record(&self, with_number: bool) -> Vec<String> {
        let mut header = Vec::with_capacity(self.colors.len() + 3);
        if with_number {
            header.push(self.number_header.clone());
        }
        header.extend(self.headers());
        header
    }

    /// All rows as exported records
    pub fn records(&self, with_number: bool) -> Vec<Vec<CellValue>> {
        self.rows
            .iter()
            .map(|row| self.record(row, with_number))
            .collect()
    }
}

impl fmt::Display for FinalTable {
    /// Tab-separated rendering, used for terminal output
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header_record(true).join("\t"))?;
        for record in self.records(true) {
            let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            writeln!(f, "{}", cells.join("\t"))?;
        }
        Ok(())
    }
}

/// Fourth pipeline stage
pub struct Totalizer;

impl Totalizer {
    /// Append totals and apply the ordering/labeling options.
    ///
    /// The input must come from [`crate::Aggregator`]; nothing is re-validated.
    pub fn totalize(pivot: &PivotTable, options: &PivotOptions) -> FinalTable {
        let mut table = Self::with_totals(pivot, options);
        if options.sort_descending {
            table = table.sorted_descending();
        }
        if options.sequence_labels {
            table = table.with_sequence_labels();
        }
        table.numbered()
    }

    /// Steps 1 and 2: total column, then total row over every column
    fn with_totals(pivot: &PivotTable, options: &PivotOptions) -> FinalTable {
        let mut rows: Vec<FinalRow> = pivot
            .row_keys()
            .iter()
            .enumerate()
            .map(|(r, &measure)| {
                let counts = pivot.row(r).to_vec();
                FinalRow {
                    number: 0,
                    label: RowLabel::Measure(measure),
                    total: counts.iter().sum(),
                    counts,
                }
            })
            .collect();

        let column_totals: Vec<u64> = (0..pivot.col_count())
            .map(|c| rows.iter().map(|row| row.counts[c]).sum())
            .collect();
        let corner = rows.iter().map(|row| row.total).sum();
        rows.push(FinalRow {
            number: 0,
            label: RowLabel::Total,
            counts: column_totals,
            total: corner,
        });

        FinalTable {
            id_header: options.id_header.clone(),
            number_header: options.number_header.clone(),
            total_label: options.total_label.clone(),
            colors: pivot.col_keys().to_vec(),
            color_headers: pivot.col_keys().to_vec(),
            rows,
        }
        .numbered()
    }
}
