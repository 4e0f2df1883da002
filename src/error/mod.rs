//! # Error Module
//!
//! User-friendly error types for the hash-map pipeline.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, sheet names, what went wrong
//! - **One terminal error per run** - every stage failure halts the run and
//!   surfaces a single error to the caller

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ExcelHashError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Staging storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Run was cancelled")]
    Cancelled,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors in run configuration, surfaced before a run starts
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported hash algorithm: {name}. Choose one of ripemd160, sha224, sha256, sha384, sha512.")]
    UnsupportedAlgorithm { name: String },
}

/// Errors reading the source workbook or validating the selection
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to open workbook {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Sheet not found in workbook: {sheet}")]
    SheetNotFound { sheet: String },

    #[error("Sheet {sheet} has no header row. The first row must contain column names.")]
    MissingHeader { sheet: String },

    #[error("Column {column} not found in the header row of sheet {sheet}")]
    ColumnNotFound { column: String, sheet: String },

    #[error("No columns selected for hashing")]
    NoColumnsSelected,

    #[error("Column {column} was selected more than once")]
    DuplicateColumn { column: String },
}

/// Errors with the staging store
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create staging storage at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Staging database query failed: {0}")]
    QueryFailed(String),

    #[error("Failed to remove staging storage at {path}: {reason}")]
    CleanupFailed { path: PathBuf, reason: String },
}

/// Errors while emitting output workbooks
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Output directory does not exist: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to write workbook {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Failed to move {from} into place at {to}: {source}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ExcelHashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_includes_sheet_and_column() {
        let error = InputError::ColumnNotFound {
            column: "Email".to_string(),
            sheet: "Customers".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("Email"));
        assert!(message.contains("Customers"));
    }

    #[test]
    fn config_error_lists_supported_algorithms() {
        let error = ConfigError::UnsupportedAlgorithm {
            name: "md5".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("md5"));
        assert!(message.contains("sha256"));
    }

    #[test]
    fn storage_error_includes_path() {
        let error = StorageError::OpenFailed {
            path: PathBuf::from("/tmp/staging"),
            reason: "disk full".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/tmp/staging"));
        assert!(message.contains("disk full"));
    }
}
