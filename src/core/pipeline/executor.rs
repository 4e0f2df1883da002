//! Pipeline execution implementation.

use crate::core::folder::ValueFolder;
use crate::core::hasher::{HashAlgorithm, HashEngine};
use crate::core::staging::StagingStore;
use crate::core::workbook::{
    sanitize_sheet_name, CellValue, SheetData, WorkbookReader, WorkbookWriter, XlsxReader,
    XlsxWriter,
};
use crate::error::{ExcelHashError, InputError, OutputError};
use crate::events::{
    null_sender, Event, EventSender, IngestEvent, IngestProgress, OutputEvent, RunEvent, RunStage,
    RunSummary,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

const SUMMARY_SHEET: &str = "Hash_MapFile_Summary";

/// What to hash: the file, the sheet, the columns, and where output goes.
///
/// Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct SourceSelection {
    /// Source workbook path
    pub file_path: PathBuf,
    /// Sheet to process
    pub sheet_name: String,
    /// Columns to hash, in caller-supplied order
    pub columns: Vec<String>,
    /// Directory receiving the three output workbooks
    pub output_dir: PathBuf,
}

/// Cooperative cancellation flag, checked between stages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an abort. The stage in flight completes or fails normally;
    /// the run then cleans up as on failure.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Path of the summary workbook
    pub summary_path: PathBuf,
    /// Path of the detail workbook
    pub detail_path: PathBuf,
    /// Path of the annotated copy of the source
    pub annotated_path: PathBuf,
    /// Number of columns processed
    pub columns_processed: usize,
    /// Total distinct values hashed
    pub distinct_values: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunResult {
    fn summary(&self) -> RunSummary {
        RunSummary {
            columns_processed: self.columns_processed,
            distinct_values: self.distinct_values,
            summary_path: self.summary_path.clone(),
            detail_path: self.detail_path.clone(),
            annotated_path: self.annotated_path.clone(),
            duration_ms: self.duration_ms,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    selection: SourceSelection,
    algorithm: HashAlgorithm,
    staging_hint: Option<PathBuf>,
    cancel: CancelToken,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            selection: SourceSelection {
                file_path: PathBuf::new(),
                sheet_name: String::new(),
                columns: Vec::new(),
                output_dir: PathBuf::from("."),
            },
            algorithm: HashAlgorithm::Sha256,
            staging_hint: None,
            cancel: CancelToken::new(),
        }
    }

    /// Set the source workbook path
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.selection.file_path = path.into();
        self
    }

    /// Set the sheet to process
    pub fn sheet(mut self, name: impl Into<String>) -> Self {
        self.selection.sheet_name = name.into();
        self
    }

    /// Set the columns to hash, in order
    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.selection.columns = columns;
        self
    }

    /// Set the output directory
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.selection.output_dir = path.into();
        self
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Place the staging store under this directory instead of the
    /// system temp location
    pub fn staging_hint(mut self, path: impl Into<PathBuf>) -> Self {
        self.staging_hint = Some(path.into());
        self
    }

    /// Use an externally held cancellation token
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            run_id: Uuid::new_v4(),
            selection: self.selection,
            algorithm: self.algorithm,
            staging_hint: self.staging_hint,
            cancel: self.cancel,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a run executing on a background thread
pub struct RunHandle {
    id: Uuid,
    thread: JoinHandle<Result<RunResult, ExcelHashError>>,
}

impl RunHandle {
    /// Identifier of the running pipeline
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Block until the run reaches a terminal state
    pub fn join(self) -> Result<RunResult, ExcelHashError> {
        self.thread
            .join()
            .map_err(|_| ExcelHashError::Unexpected("run thread panicked".to_string()))?
    }
}

/// The hash-map pipeline
pub struct Pipeline {
    run_id: Uuid,
    selection: SourceSelection,
    algorithm: HashAlgorithm,
    staging_hint: Option<PathBuf>,
    cancel: CancelToken,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Identifier of this run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Token that aborts this run between stages
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<RunResult, ExcelHashError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline on a background thread.
    ///
    /// Progress arrives through `events`; the terminal result through
    /// `RunHandle::join`.
    pub fn spawn(self, events: EventSender) -> RunHandle {
        let id = self.run_id;
        let thread = thread::spawn(move || self.run_with_events(&events));
        RunHandle { id, thread }
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<RunResult, ExcelHashError> {
        let start = Instant::now();

        events.send(Event::Run(RunEvent::Started { run_id: self.run_id }));

        match self.execute(events, start) {
            Ok(result) => {
                events.send(Event::Run(RunEvent::StageChanged {
                    stage: RunStage::Done,
                }));
                events.send(Event::Run(RunEvent::Completed {
                    summary: result.summary(),
                }));
                Ok(result)
            }
            Err(ExcelHashError::Cancelled) => {
                events.send(Event::Run(RunEvent::Cancelled));
                Err(ExcelHashError::Cancelled)
            }
            Err(err) => {
                events.send(Event::Run(RunEvent::Error {
                    message: err.to_string(),
                }));
                Err(err)
            }
        }
    }

    fn execute(&self, events: &EventSender, start: Instant) -> Result<RunResult, ExcelHashError> {
        // Selection and input problems abort before any staging exists
        self.validate_selection()?;

        let mut reader = XlsxReader::open(&self.selection.file_path)?;
        if !reader
            .sheet_names()
            .iter()
            .any(|name| name == &self.selection.sheet_name)
        {
            return Err(InputError::SheetNotFound {
                sheet: self.selection.sheet_name.clone(),
            }
            .into());
        }

        let engine = HashEngine::new(self.algorithm);
        let mut store = StagingStore::open(self.staging_hint.as_deref())?;

        let outcome = self.run_stages(&mut reader, &mut store, &engine, events, start);

        // The store is removed on every terminal path
        let cleanup = store.close();
        match outcome {
            Ok(result) => {
                cleanup?;
                Ok(result)
            }
            Err(err) => {
                if let Err(cleanup_err) = cleanup {
                    warn!(error = %cleanup_err, "staging cleanup failed after run error");
                }
                Err(err)
            }
        }
    }

    fn validate_selection(&self) -> Result<(), ExcelHashError> {
        if self.selection.columns.is_empty() {
            return Err(InputError::NoColumnsSelected.into());
        }

        // Appending the same column twice would double-count in the
        // summary and detail outputs
        for (idx, column) in self.selection.columns.iter().enumerate() {
            if self.selection.columns[..idx].contains(column) {
                return Err(InputError::DuplicateColumn {
                    column: column.clone(),
                }
                .into());
            }
        }

        if !self.selection.output_dir.is_dir() {
            return Err(OutputError::DirectoryNotFound {
                path: self.selection.output_dir.clone(),
            }
            .into());
        }

        Ok(())
    }

    fn ensure_not_cancelled(&self) -> Result<(), ExcelHashError> {
        if self.cancel.is_cancelled() {
            return Err(ExcelHashError::Cancelled);
        }
        Ok(())
    }

    fn output_path(&self, file_name: &str) -> PathBuf {
        self.selection.output_dir.join(file_name)
    }

    fn run_stages(
        &self,
        reader: &mut XlsxReader,
        store: &mut StagingStore,
        engine: &HashEngine,
        events: &EventSender,
        start: Instant,
    ) -> Result<RunResult, ExcelHashError> {
        let writer = XlsxWriter::new();
        let token = self.algorithm.token();
        let columns = &self.selection.columns;

        // Stage 1: ingest & hash, one column at a time in caller order
        self.ensure_not_cancelled()?;
        events.send(Event::Run(RunEvent::StageChanged {
            stage: RunStage::Ingesting,
        }));
        events.send(Event::Ingest(IngestEvent::Started {
            total_columns: columns.len(),
        }));

        let mut distinct_values = 0;
        for (idx, column) in columns.iter().enumerate() {
            events.send(Event::Ingest(IngestEvent::Progress(IngestProgress {
                columns_completed: idx,
                total_columns: columns.len(),
                current_column: column.clone(),
            })));

            let values = reader.read_column(&self.selection.sheet_name, column)?;
            let distinct = store.append_distinct(column, &values, engine)?;
            distinct_values += distinct;

            events.send(Event::Ingest(IngestEvent::ColumnIngested {
                column: column.clone(),
                raw_values: values.len(),
                distinct_values: distinct,
            }));
        }

        events.send(Event::Ingest(IngestEvent::Completed {
            total_distinct: distinct_values,
        }));
        debug!(distinct_values, "ingest stage complete");

        // Stage 2: summary workbook
        self.ensure_not_cancelled()?;
        events.send(Event::Run(RunEvent::StageChanged {
            stage: RunStage::SummaryWritten,
        }));

        let summary_sheet = self.materialize_summary(store)?;
        let summary_rows = summary_sheet.rows.len() - 1;
        let summary_path = self.output_path(&format!("Hash_MapFile_Summary_{}.xlsx", token));
        writer.write(&summary_path, &[summary_sheet])?;

        events.send(Event::Output(OutputEvent::SummaryWritten {
            path: summary_path.clone(),
            rows: summary_rows,
        }));

        // Stage 3: detail workbook, one sheet per column
        self.ensure_not_cancelled()?;
        events.send(Event::Run(RunEvent::StageChanged {
            stage: RunStage::DetailWritten,
        }));

        let mut detail_sheets = Vec::with_capacity(columns.len());
        for column in columns {
            let sheet = self.materialize_detail(store, column)?;
            events.send(Event::Output(OutputEvent::DetailSheetWritten {
                sheet: sheet.name.clone(),
                rows: sheet.rows.len() - 1,
            }));
            detail_sheets.push(sheet);
        }

        let detail_path = self.output_path(&format!("Hash_MapFile_Detail_{}.xlsx", token));
        writer.write(&detail_path, &detail_sheets)?;

        events.send(Event::Output(OutputEvent::DetailWritten {
            path: detail_path.clone(),
            sheets: detail_sheets.len(),
        }));

        // Stage 4: annotated copy of the source, detail sheets inserted
        // immediately after the processed sheet
        self.ensure_not_cancelled()?;
        events.send(Event::Run(RunEvent::StageChanged {
            stage: RunStage::AnnotatedWritten,
        }));

        let annotated_path = self.annotated_path(token);
        let mut annotated = Vec::new();
        let mut pending_details = detail_sheets;
        for name in reader.sheet_names() {
            let is_processed = name == self.selection.sheet_name;
            annotated.push(reader.read_sheet(&name)?);
            if is_processed {
                annotated.append(&mut pending_details);
            }
        }
        writer.write(&annotated_path, &annotated)?;

        events.send(Event::Output(OutputEvent::AnnotatedWritten {
            path: annotated_path.clone(),
        }));

        Ok(RunResult {
            summary_path,
            detail_path,
            annotated_path,
            columns_processed: columns.len(),
            distinct_values,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Materialize the full staging table into the summary sheet,
    /// folding repeated strings into shared instances.
    fn materialize_summary(&self, store: &StagingStore) -> Result<SheetData, ExcelHashError> {
        let mut folder = ValueFolder::new();
        let mut sheet = SheetData::new(SUMMARY_SHEET);
        sheet.push_row(vec![
            CellValue::text("ColumnName"),
            CellValue::text("Plaintext"),
            CellValue::text("Hashvalue"),
        ]);

        store.for_each_row(|row| {
            sheet.push_row(vec![
                CellValue::Text(folder.intern(&row.column_name)),
                CellValue::Text(folder.intern(&row.plaintext)),
                CellValue::Text(folder.intern(&row.hash_value)),
            ]);
        })?;

        Ok(sheet)
    }

    /// Materialize one column's staging rows into its detail sheet
    fn materialize_detail(
        &self,
        store: &StagingStore,
        column: &str,
    ) -> Result<SheetData, ExcelHashError> {
        let mut folder = ValueFolder::new();
        let mut sheet = SheetData::new(sanitize_sheet_name(column));
        sheet.push_row(vec![
            CellValue::text("Plaintext"),
            CellValue::text("Hashvalue"),
        ]);

        store.for_each_in_column(column, |row| {
            sheet.push_row(vec![
                CellValue::Text(folder.intern(&row.plaintext)),
                CellValue::Text(folder.intern(&row.hash_value)),
            ]);
        })?;

        Ok(sheet)
    }

    fn annotated_path(&self, token: &str) -> PathBuf {
        let stem = self
            .selection
            .file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workbook".to_string());
        self.output_path(&format!("Hashed_{}_{}.xlsx", stem, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builder_creates_pipeline() {
        let pipeline = Pipeline::builder()
            .source("data.xlsx")
            .sheet("Sheet1")
            .columns(vec!["Name".to_string()])
            .algorithm(HashAlgorithm::Sha512)
            .build();

        assert_eq!(pipeline.algorithm, HashAlgorithm::Sha512);
        assert_eq!(pipeline.selection.sheet_name, "Sheet1");
    }

    #[test]
    fn empty_column_selection_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = Pipeline::builder()
            .source("data.xlsx")
            .sheet("Sheet1")
            .output_dir(temp_dir.path())
            .build();

        let err = pipeline.run().unwrap_err();
        assert!(matches!(
            err,
            ExcelHashError::Input(InputError::NoColumnsSelected)
        ));
    }

    #[test]
    fn duplicate_column_selection_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = Pipeline::builder()
            .source("data.xlsx")
            .sheet("Sheet1")
            .columns(vec!["Name".to_string(), "Name".to_string()])
            .output_dir(temp_dir.path())
            .build();

        let err = pipeline.run().unwrap_err();
        assert!(matches!(
            err,
            ExcelHashError::Input(InputError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn missing_output_directory_is_rejected() {
        let pipeline = Pipeline::builder()
            .source("data.xlsx")
            .sheet("Sheet1")
            .columns(vec!["Name".to_string()])
            .output_dir("/nonexistent/output/dir")
            .build();

        let err = pipeline.run().unwrap_err();
        assert!(matches!(
            err,
            ExcelHashError::Output(OutputError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn pre_cancelled_run_terminates_before_ingest() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("data.xlsx");

        let mut sheet = SheetData::new("Sheet1");
        sheet.push_row(vec![CellValue::text("Name")]);
        sheet.push_row(vec![CellValue::text("Alice")]);
        XlsxWriter::new().write(&source, &[sheet]).unwrap();

        let pipeline = Pipeline::builder()
            .source(&source)
            .sheet("Sheet1")
            .columns(vec!["Name".to_string()])
            .output_dir(temp_dir.path())
            .build();

        pipeline.cancel_token().cancel();

        let err = pipeline.run().unwrap_err();
        assert!(matches!(err, ExcelHashError::Cancelled));
        assert!(!temp_dir
            .path()
            .join("Hash_MapFile_Summary_sha256.xlsx")
            .exists());
    }

    #[test]
    fn run_ids_are_unique() {
        let a = Pipeline::builder().build();
        let b = Pipeline::builder().build();
        assert_ne!(a.run_id(), b.run_id());
    }
}
