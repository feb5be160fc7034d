//! Prelude module for convenient imports
//!
//! ```rust
//! use dimpivot::prelude::*;
//! ```

pub use crate::{
    encode, CellValue, Error, Export, ExportCache, ExportFormat, ExportOptions, FinalTable,
    FinalTableExt, MeasureKey, Pipeline, PivotOptions, RawRow, Result,
};
