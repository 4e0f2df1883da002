//! # Value Folder Module
//!
//! An interning cache that collapses repeated equal string values into one
//! shared instance while a staging-store query result is materialized into
//! an in-memory sheet.
//!
//! A column name repeated across thousands of staged rows costs one
//! allocation instead of thousands. One folder instance is scoped to a
//! single materialization pass and discarded afterwards; there is no global
//! cache lifetime.

use crate::core::workbook::CellValue;
use std::collections::HashSet;
use std::sync::Arc;

/// Scoped string interner for one query-materialization pass
#[derive(Debug, Default)]
pub struct ValueFolder {
    interned: HashSet<Arc<str>>,
}

impl ValueFolder {
    /// Create an empty folder
    pub fn new() -> Self {
        Self {
            interned: HashSet::new(),
        }
    }

    /// Return the canonical shared instance for this value.
    ///
    /// Equal inputs always return clones of the same underlying allocation.
    pub fn intern(&mut self, value: &str) -> Arc<str> {
        if let Some(existing) = self.interned.get(value) {
            return Arc::clone(existing);
        }
        let shared: Arc<str> = Arc::from(value);
        self.interned.insert(Arc::clone(&shared));
        shared
    }

    /// Fold a cell value: text is interned, every other kind passes
    /// through unchanged.
    pub fn fold_cell(&mut self, cell: CellValue) -> CellValue {
        match cell {
            CellValue::Text(text) => CellValue::Text(self.intern(&text)),
            other => other,
        }
    }

    /// Number of distinct strings interned so far
    pub fn len(&self) -> usize {
        self.interned.len()
    }

    /// True if nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.interned.is_empty()
    }
}
