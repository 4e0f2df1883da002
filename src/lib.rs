//! # Excel Hash Mapper
//!
//! Hashes user-selected spreadsheet columns into deterministic, sorted
//! hash map files.
//!
//! ## Core Philosophy
//! - **Deterministic output** - identical input always produces byte-identical map files
//! - **Bounded memory** - a disk-backed staging store dedupes and sorts, not RAM
//! - **No half-written files** - artifacts appear atomically or not at all
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - the hash-map pipeline engine
//! - `events` - event-driven progress reporting (GUI-ready)
//! - `error` - user-friendly error types
//! - `cli` - command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ExcelHashError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
