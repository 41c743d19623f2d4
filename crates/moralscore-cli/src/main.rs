//! moralscore CLI
//!
//! Command-line interface for moral foundation analysis.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze files with the eMFD
//! moralscore speech.txt report.pdf
//!
//! # Pipe text from stdin
//! echo "A fair and just verdict." | moralscore --show-summary
//!
//! # MFD with vice/virtue metrics, results to CSV
//! moralscore --dict-type mfd --score-method pattern --output results.csv docs/*.txt
//!
//! # JSON on stdout
//! moralscore --format json speech.txt
//! ```
//!
//! ## Exit Codes
//!
//! - 0: every input analyzed
//! - 1: at least one file failed
//! - 2: fatal error

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use moralscore_core::{
    DictionaryKind, FoundationReading, MappingMode, MetricLayout, ScoreRecord, ScoringMethod,
    Summary,
};
use moralscore_runtime::{
    write_results, BatchEntry, MoralFrameworkAnalyzer, RuntimeConfig, TextExtractionManager,
};

/// moralscore: moral foundation scoring for texts and documents
#[derive(Parser)]
#[command(name = "moralscore")]
#[command(version)]
#[command(about = "Score texts and documents along the five moral foundations", long_about = None)]
struct Cli {
    /// Files to analyze (reads text from stdin if none are given)
    paths: Vec<PathBuf>,

    /// Dictionary: emfd, mfd or mfd2 (built-in samples unless the config sets lexicon.path)
    #[arg(short, long)]
    dict_type: Option<DictionaryKind>,

    /// eMFD probability mapping: all or single
    #[arg(long)]
    prob_map: Option<MappingMode>,

    /// Scoring method: bow, wordlist, ngram or pattern
    #[arg(short = 'm', long)]
    score_method: Option<ScoringMethod>,

    /// Metric family: sentiment or vice-virtue
    #[arg(long)]
    output_metrics: Option<MetricLayout>,

    /// Write results to a file (.csv for CSV, anything else for JSON)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include the interpretive summary
    #[arg(short, long)]
    show_summary: bool,

    /// Print the supported file extensions and exit
    #[arg(long)]
    list_supported: bool,

    /// Output format on stdout
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Runtime configuration file (YAML or JSON); flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fall back to rule-based lemmas for unmatched words
    #[arg(long)]
    lemmatize: bool,

    /// Enable OCR for PDFs without a text layer
    #[arg(long)]
    ocr: bool,

    /// Explicit timestamp for reproducible output (RFC 3339).
    /// Example: --analyzed-at 2025-12-20T00:00:00Z
    #[arg(long, value_parser = parse_datetime)]
    analyzed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Scores for text read from stdin.
#[derive(Serialize)]
struct TextReport {
    moral_scores: ScoreRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    moral_summary: Option<Summary>,
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid datetime format: {}. Expected RFC 3339 (e.g., 2025-12-20T00:00:00Z)", e))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    match run() {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    // Listing extensions needs no lexicon.
    if cli.list_supported {
        for ext in TextExtractionManager::new(&config.extraction).supported_extensions() {
            println!(".{}", ext);
        }
        return Ok(ExitCode::from(0));
    }

    let analyzer = MoralFrameworkAnalyzer::new(config).context("Failed to initialize analyzer")?;

    if cli.paths.is_empty() {
        analyze_stdin(&analyzer, &cli)
    } else {
        analyze_files(&analyzer, &cli)
    }
}

/// Configuration file values with command-line flags applied on top.
fn build_config(cli: &Cli) -> Result<RuntimeConfig> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => RuntimeConfig::default(),
    };

    let analysis = &mut config.analysis;
    if let Some(dictionary) = cli.dict_type {
        analysis.dictionary = dictionary;
    }
    if let Some(mapping) = cli.prob_map {
        analysis.mapping = mapping;
    }
    if let Some(method) = cli.score_method {
        analysis.method = method;
    }
    if let Some(metrics) = cli.output_metrics {
        analysis.metrics = Some(metrics);
    }
    if cli.lemmatize {
        analysis.lemmatize = true;
    }
    if cli.ocr {
        config.extraction.ocr.enabled = true;
    }
    if cli.analyzed_at.is_some() {
        config.determinism.analyzed_at = cli.analyzed_at;
    }

    Ok(config)
}

fn analyze_stdin(analyzer: &MoralFrameworkAnalyzer, cli: &Cli) -> Result<ExitCode> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read from stdin")?;

    let report = if cli.show_summary {
        let (moral_scores, summary) = analyzer
            .analyze_text_with_summary(&text)
            .context("Analysis failed")?;
        TextReport {
            moral_scores,
            moral_summary: Some(summary),
        }
    } else {
        TextReport {
            moral_scores: analyzer.analyze_text(&text).context("Analysis failed")?,
            moral_summary: None,
        }
    };

    if let Some(path) = &cli.output {
        // A single text has no per-file columns, so it is always written as JSON.
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json + "\n").with_context(|| format!("Failed to write results to {:?}", path))?;
    }

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            let layout = analyzer.options().layout();
            print_scores(&report.moral_scores, layout);
            if let Some(summary) = &report.moral_summary {
                println!();
                print_summary(summary);
            }
        }
    }

    Ok(ExitCode::from(0))
}

fn analyze_files(analyzer: &MoralFrameworkAnalyzer, cli: &Cli) -> Result<ExitCode> {
    let entries = if cli.show_summary {
        analyzer.analyze_batch_with_summary(&cli.paths)
    } else {
        analyzer.analyze_batch(&cli.paths)
    };
    let layout = analyzer.options().layout();

    if let Some(path) = &cli.output {
        write_results(path, &entries, layout)
            .with_context(|| format!("Failed to write results to {:?}", path))?;
    }

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => print_entries(&entries, layout),
    }

    let failed = entries.iter().filter(|e| e.is_failed()).count();
    if failed > 0 {
        eprintln!("{} of {} files failed", failed, entries.len());
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::from(0))
}

fn print_entries(entries: &[BatchEntry], layout: MetricLayout) {
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("== {} ==", entry.file_path());
        match entry {
            BatchEntry::Failed(failed) => println!("ERROR: {}", failed.error),
            BatchEntry::Analyzed(analysis) => {
                println!(
                    "Characters: {}  Words: {}",
                    analysis.text_length, analysis.word_count
                );
                if let Some(pages) = analysis.file_metadata.page_count {
                    println!("Pages: {}", pages);
                }
                println!();
                print_scores(&analysis.moral_scores, layout);
                if let Some(summary) = &analysis.moral_summary {
                    println!();
                    print_summary(summary);
                }
            }
        }
    }
}

fn print_scores(scores: &ScoreRecord, layout: MetricLayout) {
    for name in layout.metric_names() {
        if let Some(value) = scores.get(&name) {
            println!("  {:<22} {:.4}", name, value);
        }
    }
}

fn print_summary(summary: &Summary) {
    println!(
        "Dominant foundation: {} ({:.4})",
        summary.dominant_foundation.name.as_str(),
        summary.dominant_foundation.probability
    );
    println!(
        "Moral density: {:.4} ({:?})",
        summary.moral_density.ratio, summary.moral_density.interpretation
    );
    println!();
    for reading in &summary.moral_foundations {
        match reading {
            FoundationReading::Probabilistic {
                name,
                probability,
                strength,
                sentiment,
                sentiment_direction,
            } => println!(
                "  {:<10} {:.4} {:?} sentiment {:+.4} ({:?})",
                name, probability, strength, sentiment, sentiment_direction
            ),
            FoundationReading::Categorical {
                name,
                score,
                strength,
            } => println!("  {:<18} {:.4} {:?}", name, score, strength),
        }
    }
}
