//! # Core Module
//!
//! The UI-agnostic hash-map pipeline engine.
//!
//! ## Modules
//! - `hasher` - digests plaintext values under a selected algorithm
//! - `staging` - run-scoped disk-backed dedup/sort/join table
//! - `folder` - scoped string interning during result materialization
//! - `workbook` - format-agnostic spreadsheet read/write
//! - `pipeline` - orchestrates the four-stage run

pub mod folder;
pub mod hasher;
pub mod pipeline;
pub mod staging;
pub mod workbook;

// Re-export commonly used types
pub use folder::ValueFolder;
pub use hasher::{HashAlgorithm, HashEngine};
pub use pipeline::{CancelToken, Pipeline, RunHandle, RunResult, SourceSelection};
pub use staging::{StagingRow, StagingStore};
pub use workbook::{CellValue, SheetData, WorkbookReader, WorkbookWriter};
