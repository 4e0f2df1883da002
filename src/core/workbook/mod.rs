//! # Workbook Module
//!
//! Spreadsheet read/write abstractions so the pipeline stays
//! format-agnostic.
//!
//! ## Modules
//! - `reader` - reads sheets and columns from xlsx files (calamine)
//! - `writer` - writes output workbooks atomically (rust_xlsxwriter)
//! - `sheet_name` - sanitizes column names into legal sheet names

pub mod reader;
pub mod sheet_name;
pub mod writer;

pub use reader::XlsxReader;
pub use sheet_name::sanitize_sheet_name;
pub use writer::XlsxWriter;

use crate::error::{InputError, OutputError};
use std::path::Path;
use std::sync::Arc;

/// A single spreadsheet cell value.
///
/// Text is held behind `Arc<str>` so the `ValueFolder` can share one
/// allocation across repeated equal values during materialization.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(Arc<str>),
    Number(f64),
    Bool(bool),
    /// Excel serial date number
    DateTime(f64),
}

impl CellValue {
    /// Convenience constructor for text cells
    pub fn text(value: &str) -> Self {
        CellValue::Text(Arc::from(value))
    }
}

/// One sheet's worth of materialized rows, header included
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetData {
    /// Create an empty sheet with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Append a row of cells
    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }
}

/// Trait for workbook readers
pub trait WorkbookReader {
    /// List the workbook's sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Read a whole sheet's cells, header row included
    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, InputError>;

    /// Read one column's values below the header row, stringified.
    ///
    /// The first row of the sheet is the header; `column` must match one of
    /// its cells exactly. Empty cells are skipped.
    fn read_column(&mut self, sheet: &str, column: &str) -> Result<Vec<String>, InputError>;
}

/// Trait for workbook writers
pub trait WorkbookWriter {
    /// Write the sheets to `path`.
    ///
    /// The file is written to a temporary sibling path and renamed into
    /// place on success, so a failed write never leaves a truncated
    /// artifact behind.
    fn write(&self, path: &Path, sheets: &[SheetData]) -> Result<(), OutputError>;
}
