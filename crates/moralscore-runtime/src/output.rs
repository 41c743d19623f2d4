//! Result writers.
//!
//! JSON writes the batch entries as a pretty array. CSV writes one row per
//! entry with the columns `file_path,text_length,word_count,error` followed
//! by the metric columns of the layout in canonical order; cells that do not
//! apply to an entry are left empty.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use moralscore_core::MetricLayout;

use crate::analyzer::BatchEntry;

/// Errors that can occur when writing results.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write results: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON results: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode CSV results: {0}")]
    Csv(#[from] csv::Error),
}

/// Serialization format for result files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    /// CSV for `.csv` files, JSON otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(e) if e.eq_ignore_ascii_case("csv") => OutputFormat::Csv,
            _ => OutputFormat::Json,
        }
    }
}

const FIXED_COLUMNS: [&str; 4] = ["file_path", "text_length", "word_count", "error"];

pub fn write_json<W: Write>(writer: W, entries: &[BatchEntry]) -> Result<(), OutputError> {
    let mut writer = writer;
    serde_json::to_writer_pretty(&mut writer, entries)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn write_csv<W: Write>(
    writer: W,
    entries: &[BatchEntry],
    layout: MetricLayout,
) -> Result<(), OutputError> {
    let metrics = layout.metric_names();
    let mut csv_writer = csv::Writer::from_writer(writer);

    let header: Vec<&str> = FIXED_COLUMNS
        .iter()
        .copied()
        .chain(metrics.iter().map(String::as_str))
        .collect();
    csv_writer.write_record(&header)?;

    for entry in entries {
        let mut row = Vec::with_capacity(header.len());
        row.push(entry.file_path().to_string());
        match entry.analysis() {
            Some(a) => {
                row.push(a.text_length.to_string());
                row.push(a.word_count.to_string());
                row.push(String::new());
            }
            None => {
                row.push(String::new());
                row.push(String::new());
                row.push(entry.error().unwrap_or_default().to_string());
            }
        }
        for metric in &metrics {
            row.push(
                entry
                    .moral_scores()
                    .get(metric)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write `entries` to `path` in the format its extension selects.
pub fn write_results(
    path: &Path,
    entries: &[BatchEntry],
    layout: MetricLayout,
) -> Result<OutputFormat, OutputError> {
    let format = OutputFormat::from_path(path);
    let writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Json => write_json(writer, entries)?,
        OutputFormat::Csv => write_csv(writer, entries, layout)?,
    }
    tracing::info!(path = %path.display(), entries = entries.len(), ?format, "Results written");
    Ok(format)
}
