//! # Pipeline Module
//!
//! Orchestrates one hashing run through four strictly sequential stages:
//!
//! ```text
//! Idle -> Ingesting -> SummaryWritten -> DetailWritten -> AnnotatedWritten -> Done
//! ```
//!
//! Any stage failure moves the run to `Failed` (terminal). On every
//! terminal path, success or failure, the staging store is closed and its
//! backing storage removed. Cancellation is honored between stages; a
//! stage already in flight completes or fails normally.
//!
//! ## Example
//! ```rust,ignore
//! use excel_hash_mapper::core::pipeline::Pipeline;
//! use excel_hash_mapper::core::hasher::HashAlgorithm;
//!
//! let pipeline = Pipeline::builder()
//!     .source("customers.xlsx")
//!     .sheet("Sheet1")
//!     .columns(vec!["Name".into(), "Email".into()])
//!     .output_dir("out")
//!     .algorithm(HashAlgorithm::Sha256)
//!     .build();
//!
//! let result = pipeline.run()?;
//! ```

mod executor;

pub use executor::{
    CancelToken, Pipeline, PipelineBuilder, RunHandle, RunResult, SourceSelection,
};
