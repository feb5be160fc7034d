//! # dimpivot-core
//!
//! Parsing and aggregation for dimension/color labels.
//!
//! Labels such as `10x20x5 Red` are split into three measurements and a
//! color, counted per (second measurement, color), and pivoted into a table
//! with one row per measurement, one column per color, and marginal totals.
//!
//! - [`Extractor`] - pattern extraction
//! - [`Normalizer`] - trimming and numeric coercion
//! - [`Aggregator`] - grouping into a dense [`PivotTable`]
//! - [`Totalizer`] - totals, ordering and labels, producing a [`FinalTable`]
//!
//! A batch with any malformed row is rejected as a whole.
//!
//! ## Example
//!
//! ```rust
//! use dimpivot_core::{MeasureKey, Pipeline};
//!
//! let table = Pipeline::default()
//!     .run_labels(["10x20x5 Red", "10x20x5 Red", "10x30x5 Blue"])
//!     .unwrap();
//!
//! assert_eq!(table.cell(MeasureKey::new(20), "Red"), Some(2));
//! assert_eq!(table.grand_total(), 3);
//! ```

pub mod aggregate;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod row;
pub mod table;
pub mod value;

pub use aggregate::{Aggregator, CountMatrix, GroupKey, PivotTable};
pub use error::{Error, MalformedReason, Result};
pub use extract::{extract_label, Extractor};
pub use normalize::Normalizer;
pub use pipeline::{Pipeline, PivotOptions};
pub use row::{LabelFields, MeasureKey, NormalizedRow, ParsedRow, RawRow};
pub use table::{FinalRow, FinalTable, RowLabel, Totalizer};
pub use value::{CellValue, MAX_EXACT_INTEGER};
