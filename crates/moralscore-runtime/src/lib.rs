//! # moralscore-runtime
//!
//! File-level moral foundation analysis around `moralscore-core`.
//!
//! This crate provides:
//! - Configuration loading (YAML or JSON) layered over [`AnalysisOptions`]
//! - Text extraction from plain-text and PDF files behind a registry
//! - The [`MoralFrameworkAnalyzer`] facade for text, file and batch analysis
//! - JSON and CSV result writers
//!
//! Batch analysis never aborts on a single bad file: each failure is kept in
//! its slot as a [`FailedAnalysis`] so results line up with the input paths.
//!
//! [`AnalysisOptions`]: moralscore_core::AnalysisOptions

pub mod analyzer;
pub mod config;
pub mod extraction;
pub mod output;

pub use analyzer::{
    AnalysisParameters, BatchEntry, FailedAnalysis, FileAnalysis, MoralFrameworkAnalyzer,
    RuntimeError,
};
pub use config::{
    Codepage, ConfigError, DeterminismConfig, ExtractionConfig, LexiconConfig, OcrConfig,
    PdfConfig, RuntimeConfig,
};
pub use extraction::{
    ExtractionError, FileMetadata, PdfExtractor, TextExtractionManager, TextExtractor,
    TxtExtractor,
};
pub use output::{write_csv, write_json, write_results, OutputError, OutputFormat};
