//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// All events emitted by the hash-map pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Run-level events
    Run(RunEvent),
    /// Ingest stage events
    Ingest(IngestEvent),
    /// Output emission events
    Output(OutputEvent),
}

/// Run-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEvent {
    /// A run has started
    Started { run_id: Uuid },
    /// The run moved to a new stage
    StageChanged { stage: RunStage },
    /// The run completed successfully
    Completed { summary: RunSummary },
    /// The run was cancelled between stages
    Cancelled,
    /// The run encountered a fatal error
    Error { message: String },
}

/// Events during the ingest stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IngestEvent {
    /// Ingesting has started
    Started { total_columns: usize },
    /// Progress update during ingesting
    Progress(IngestProgress),
    /// One column was deduplicated, hashed, and staged
    ColumnIngested {
        column: String,
        raw_values: usize,
        distinct_values: usize,
    },
    /// Ingesting completed
    Completed { total_distinct: usize },
}

/// Progress information during ingesting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestProgress {
    /// Number of columns staged so far
    pub columns_completed: usize,
    /// Total number of selected columns
    pub total_columns: usize,
    /// Current column being staged
    pub current_column: String,
}

/// Events during output emission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputEvent {
    /// The summary workbook was written
    SummaryWritten { path: PathBuf, rows: usize },
    /// One detail sheet was materialized
    DetailSheetWritten { sheet: String, rows: usize },
    /// The detail workbook was written
    DetailWritten { path: PathBuf, sheets: usize },
    /// The annotated copy of the source workbook was written
    AnnotatedWritten { path: PathBuf },
}

/// Stages of a run, in order. A run never moves backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStage {
    Idle,
    Ingesting,
    SummaryWritten,
    DetailWritten,
    AnnotatedWritten,
    Done,
    Failed,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of columns processed
    pub columns_processed: usize,
    /// Total distinct values hashed across all columns
    pub distinct_values: usize,
    /// Path of the summary workbook
    pub summary_path: PathBuf,
    /// Path of the detail workbook
    pub detail_path: PathBuf,
    /// Path of the annotated workbook
    pub annotated_path: PathBuf,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStage::Idle => write!(f, "Idle"),
            RunStage::Ingesting => write!(f, "Ingesting"),
            RunStage::SummaryWritten => write!(f, "Writing summary"),
            RunStage::DetailWritten => write!(f, "Writing detail"),
            RunStage::AnnotatedWritten => write!(f, "Writing annotated copy"),
            RunStage::Done => write!(f, "Done"),
            RunStage::Failed => write!(f, "Failed"),
        }
    }
}
