//! # CLI Module
//!
//! Command-line interface for the Excel hash mapper.
//!
//! ## Usage
//! ```bash
//! # Hash two columns of a sheet with SHA-256
//! excel-hash run data.xlsx --sheet Customers --columns Name,Email
//!
//! # Pick another algorithm and output directory
//! excel-hash run data.xlsx --sheet Customers --columns Name --algorithm sha512 --out-dir out/
//!
//! # Discover what a workbook contains
//! excel-hash sheets data.xlsx
//! excel-hash columns data.xlsx --sheet Customers
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use excel_hash_mapper::core::hasher::HashAlgorithm;
use excel_hash_mapper::core::pipeline::{Pipeline, RunResult};
use excel_hash_mapper::core::workbook::{CellValue, WorkbookReader, XlsxReader};
use excel_hash_mapper::error::{ExcelHashError, InputError, Result};
use excel_hash_mapper::events::{Event, EventChannel, IngestEvent, RunEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;

/// Excel Hash Mapper - deterministic hash map files from spreadsheet columns
#[derive(Parser, Debug)]
#[command(name = "excel-hash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hash selected columns into summary, detail, and annotated workbooks
    Run {
        /// Source workbook (.xlsx)
        input: PathBuf,

        /// Sheet to process
        #[arg(short, long)]
        sheet: String,

        /// Columns to hash, in order
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Hash algorithm to use
        #[arg(short, long, default_value = "sha256")]
        algorithm: Algorithm,

        /// Directory receiving the output workbooks
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Output format
        #[arg(long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the sheets of a workbook
    Sheets {
        /// Source workbook (.xlsx)
        input: PathBuf,
    },

    /// List the header-row columns of a sheet
    Columns {
        /// Source workbook (.xlsx)
        input: PathBuf,

        /// Sheet whose header to read
        #[arg(short, long)]
        sheet: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// RIPEMD-160
    Ripemd160,
    /// SHA-224
    Sha224,
    /// SHA-256 (default)
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl From<Algorithm> for HashAlgorithm {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Ripemd160 => HashAlgorithm::Ripemd160,
            Algorithm::Sha224 => HashAlgorithm::Sha224,
            Algorithm::Sha256 => HashAlgorithm::Sha256,
            Algorithm::Sha384 => HashAlgorithm::Sha384,
            Algorithm::Sha512 => HashAlgorithm::Sha512,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (artifact paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    excel_hash_mapper::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            sheet,
            columns,
            algorithm,
            out_dir,
            output,
            verbose,
        } => run_pipeline(input, sheet, columns, algorithm.into(), out_dir, output, verbose),
        Commands::Sheets { input } => list_sheets(input),
        Commands::Columns { input, sheet } => list_columns(input, sheet),
    }
}

fn run_pipeline(
    input: PathBuf,
    sheet: String,
    columns: Vec<String>,
    algorithm: HashAlgorithm,
    out_dir: PathBuf,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Excel Hash Mapper").bold().cyan(),
            style(algorithm.token()).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let pipeline = Pipeline::builder()
        .source(input)
        .sheet(sheet)
        .columns(columns)
        .algorithm(algorithm)
        .output_dir(out_dir)
        .build();

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose_clone = verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Run(RunEvent::StageChanged { stage }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(format!("{}", stage));
                    }
                }
                Event::Ingest(IngestEvent::Started { total_columns }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(total_columns as u64);
                    }
                }
                Event::Ingest(IngestEvent::ColumnIngested {
                    column,
                    raw_values,
                    distinct_values,
                }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.inc(1);
                        if verbose_clone {
                            pb.set_message(format!(
                                "{} ({} distinct of {})",
                                column, distinct_values, raw_values
                            ));
                        }
                    }
                }
                Event::Run(RunEvent::Completed { .. })
                | Event::Run(RunEvent::Error { .. })
                | Event::Run(RunEvent::Cancelled) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;

    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &result),
        OutputFormat::Json => print_json_results(&result),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

fn list_sheets(input: PathBuf) -> Result<()> {
    let reader = XlsxReader::open(&input)?;
    for name in reader.sheet_names() {
        println!("{}", name);
    }
    Ok(())
}

fn list_columns(input: PathBuf, sheet: String) -> Result<()> {
    let mut reader = XlsxReader::open(&input)?;
    let data = reader.read_sheet(&sheet)?;

    let header = data
        .rows
        .first()
        .ok_or(ExcelHashError::Input(InputError::MissingHeader {
            sheet: sheet.clone(),
        }))?;

    for cell in header {
        if let CellValue::Text(text) = cell {
            println!("{}", text);
        }
    }
    Ok(())
}

fn print_pretty_results(term: &Term, result: &RunResult) {
    term.write_line("").ok();
    term.write_line(&format!("{} Run Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} columns processed in {:.1}s",
        style(result.columns_processed).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} distinct values hashed",
        style(result.distinct_values).cyan()
    ))
    .ok();

    term.write_line("").ok();
    term.write_line(&format!("{}", style("Output files:").bold().underlined()))
        .ok();
    term.write_line(&format!("  summary    {}", result.summary_path.display()))
        .ok();
    term.write_line(&format!("  detail     {}", result.detail_path.display()))
        .ok();
    term.write_line(&format!("  annotated  {}", result.annotated_path.display()))
        .ok();
}

fn print_json_results(result: &RunResult) {
    let output = serde_json::json!({
        "columns_processed": result.columns_processed,
        "distinct_values": result.distinct_values,
        "duration_ms": result.duration_ms,
        "summary_path": result.summary_path,
        "detail_path": result.detail_path,
        "annotated_path": result.annotated_path,
    });

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn print_minimal_results(result: &RunResult) {
    println!("{}", result.summary_path.display());
    println!("{}", result.detail_path.display());
    println!("{}", result.annotated_path.display());
}
