//! Analyzer facade over extraction, scoring and summaries.
//!
//! `MoralFrameworkAnalyzer` owns one validated configuration, one shared
//! lexicon and one extraction registry. Single text and single file calls
//! surface errors to the caller; batch calls record each failure in its slot
//! and carry on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use moralscore_core::{
    analyze_with_lexicon, summarize_layout, AnalysisError, AnalysisOptions, DictionaryKind,
    Lexicon, MappingMode, MetricLayout, ScoreRecord, ScoringMethod, Summary,
};

use crate::config::{ConfigError, RuntimeConfig};
use crate::extraction::{ExtractionError, FileMetadata, TextExtractionManager, TextExtractor};
use crate::output::OutputError;

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Options a file was analyzed with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisParameters {
    pub dict_type: DictionaryKind,
    pub prob_map: MappingMode,
    pub score_method: ScoringMethod,
    pub output_metrics: MetricLayout,
    pub lemmatize: bool,
    /// `builtin:<dict>-sample` or the custom lexicon path
    pub lexicon: String,
}

/// Result of analyzing one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileAnalysis {
    pub file_path: String,
    pub file_metadata: FileMetadata,
    pub extracted_text: String,
    /// Characters in `extracted_text`
    pub text_length: usize,
    /// Whitespace-separated words in `extracted_text`
    pub word_count: usize,
    pub moral_scores: ScoreRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moral_summary: Option<Summary>,
    pub analysis_parameters: AnalysisParameters,
    pub analyzed_at: DateTime<Utc>,
}

/// A batch slot whose file could not be analyzed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedAnalysis {
    pub file_path: String,
    pub error: String,
    /// Always empty; present so every slot carries a scores object
    pub moral_scores: ScoreRecord,
}

/// One slot of a batch result, in input order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BatchEntry {
    Analyzed(Box<FileAnalysis>),
    Failed(FailedAnalysis),
}

impl BatchEntry {
    pub fn file_path(&self) -> &str {
        match self {
            BatchEntry::Analyzed(a) => &a.file_path,
            BatchEntry::Failed(f) => &f.file_path,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchEntry::Failed(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            BatchEntry::Analyzed(_) => None,
            BatchEntry::Failed(f) => Some(&f.error),
        }
    }

    pub fn analysis(&self) -> Option<&FileAnalysis> {
        match self {
            BatchEntry::Analyzed(a) => Some(&**a),
            BatchEntry::Failed(_) => None,
        }
    }

    pub fn moral_scores(&self) -> &ScoreRecord {
        match self {
            BatchEntry::Analyzed(a) => &a.moral_scores,
            BatchEntry::Failed(f) => &f.moral_scores,
        }
    }
}

/// Moral foundation analysis of texts and files.
pub struct MoralFrameworkAnalyzer {
    config: RuntimeConfig,
    lexicon: Arc<Lexicon>,
    extraction: TextExtractionManager,
}

impl MoralFrameworkAnalyzer {
    /// Validate `config` and load its lexicon.
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.analysis.validate()?;
        config.validate()?;
        let lexicon = Lexicon::load(config.analysis.dictionary, config.lexicon.path.as_deref())
            .map_err(AnalysisError::from)?;
        let extraction = TextExtractionManager::new(&config.extraction);

        tracing::info!(
            dictionary = %config.analysis.dictionary,
            method = %config.analysis.method,
            lexicon = lexicon.source(),
            entries = lexicon.len(),
            "Analyzer ready"
        );

        Ok(Self {
            config,
            lexicon,
            extraction,
        })
    }

    /// Analyzer with the default configuration (eMFD, bag-of-words).
    pub fn with_defaults() -> Result<Self, RuntimeError> {
        Self::new(RuntimeConfig::default())
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.config.analysis
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Add an extractor after the built-in ones.
    pub fn register_extractor(&mut self, extractor: Box<dyn TextExtractor>) {
        self.extraction.register(extractor);
    }

    pub fn supported_extensions(&self) -> Vec<String> {
        self.extraction.supported_extensions()
    }

    /// Score raw text.
    pub fn analyze_text(&self, text: &str) -> Result<ScoreRecord, RuntimeError> {
        Ok(analyze_with_lexicon(text, &self.lexicon, &self.config.analysis)?)
    }

    /// Score raw text and summarize the record.
    pub fn analyze_text_with_summary(&self, text: &str) -> Result<(ScoreRecord, Summary), RuntimeError> {
        let scores = self.analyze_text(text)?;
        let summary = self.summarize(&scores)?;
        Ok((scores, summary))
    }

    /// Summarize a record produced with this analyzer's options.
    pub fn summarize(&self, scores: &ScoreRecord) -> Result<Summary, RuntimeError> {
        let options = &self.config.analysis;
        Ok(summarize_layout(scores, options.dictionary, options.layout())?)
    }

    /// Extract and score one file.
    ///
    /// `analyzed_at` is the configured fixed timestamp, or the current time.
    /// Use [`Self::analyze_file_at`] for an explicit timestamp.
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> Result<FileAnalysis, RuntimeError> {
        self.analyze_file_at(path, self.timestamp())
    }

    pub fn analyze_file_at(
        &self,
        path: impl AsRef<Path>,
        analyzed_at: DateTime<Utc>,
    ) -> Result<FileAnalysis, RuntimeError> {
        self.file_at(path.as_ref(), false, analyzed_at)
    }

    /// Extract, score and summarize one file.
    pub fn analyze_file_with_summary(&self, path: impl AsRef<Path>) -> Result<FileAnalysis, RuntimeError> {
        self.analyze_file_with_summary_at(path, self.timestamp())
    }

    pub fn analyze_file_with_summary_at(
        &self,
        path: impl AsRef<Path>,
        analyzed_at: DateTime<Utc>,
    ) -> Result<FileAnalysis, RuntimeError> {
        self.file_at(path.as_ref(), true, analyzed_at)
    }

    /// Analyze every path; the result has one entry per path, in order.
    pub fn analyze_batch<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<BatchEntry> {
        self.analyze_batch_at(paths, false, self.timestamp())
    }

    pub fn analyze_batch_with_summary<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<BatchEntry> {
        self.analyze_batch_at(paths, true, self.timestamp())
    }

    /// Batch analysis with an explicit timestamp shared by every entry.
    pub fn analyze_batch_at<P: AsRef<Path>>(
        &self,
        paths: &[P],
        with_summary: bool,
        analyzed_at: DateTime<Utc>,
    ) -> Vec<BatchEntry> {
        let entries: Vec<BatchEntry> = paths
            .iter()
            .map(|p| {
                let path = p.as_ref();
                match self.file_at(path, with_summary, analyzed_at) {
                    Ok(analysis) => BatchEntry::Analyzed(Box::new(analysis)),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "File analysis failed");
                        BatchEntry::Failed(FailedAnalysis {
                            file_path: path.display().to_string(),
                            error: e.to_string(),
                            moral_scores: ScoreRecord::default(),
                        })
                    }
                }
            })
            .collect();

        let failed = entries.iter().filter(|e| e.is_failed()).count();
        tracing::info!(total = entries.len(), failed, "Batch analysis finished");
        entries
    }

    fn file_at(
        &self,
        path: &Path,
        with_summary: bool,
        analyzed_at: DateTime<Utc>,
    ) -> Result<FileAnalysis, RuntimeError> {
        let text = self.extraction.extract(path)?;
        let file_metadata = self.extraction.metadata(path)?;
        let moral_scores = self.analyze_text(&text)?;
        let moral_summary = if with_summary {
            Some(self.summarize(&moral_scores)?)
        } else {
            None
        };

        tracing::info!(
            path = %path.display(),
            chars = text.chars().count(),
            "File analyzed"
        );

        Ok(FileAnalysis {
            file_path: path.display().to_string(),
            file_metadata,
            text_length: text.chars().count(),
            word_count: text.split_whitespace().count(),
            extracted_text: text,
            moral_scores,
            moral_summary,
            analysis_parameters: self.parameters(),
            analyzed_at,
        })
    }

    fn parameters(&self) -> AnalysisParameters {
        let options = &self.config.analysis;
        AnalysisParameters {
            dict_type: options.dictionary,
            prob_map: options.mapping,
            score_method: options.method,
            output_metrics: options.layout(),
            lemmatize: options.lemmatize,
            lexicon: self.lexicon.source().to_string(),
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.config.determinism.analyzed_at.unwrap_or_else(Utc::now)
    }
}
