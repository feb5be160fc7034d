//! Content-keyed cache of encoded exports
//!
//! Entries are keyed by the full table content and the format, so a lookup
//! for a different table can never return another table's bytes. The cache is
//! a plain value: callers own it and decide its lifetime.

use std::sync::Arc;

use ahash::AHashMap;
use dimpivot_core::FinalTable;

use crate::error::Result;
use crate::export::{encode, Export, ExportFormat, ExportOptions};

/// Memoizes [`encode`] for one set of export options
#[derive(Debug, Default)]
pub struct ExportCache {
    options: ExportOptions,
    entries: AHashMap<(FinalTable, ExportFormat), Arc<Export>>,
    hits: u64,
    misses: u64,
}

impl ExportCache {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Return the cached encoding of `table`, encoding it on first request
    pub fn get_or_encode(
        &mut self,
        table: &FinalTable,
        format: ExportFormat,
    ) -> Result<Arc<Export>> {
        let key = (table.clone(), format);
        if let Some(export) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(Arc::clone(export));
        }

        let export = Arc::new(encode(table, format, &self.options)?);
        self.misses += 1;
        log::debug!("cached {} export ({} bytes)", format, export.bytes.len());
        self.entries.insert(key, Arc::clone(&export));
        Ok(export)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups answered from the cache
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of lookups that had to encode
    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
