//! Configuration for moralscore-runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use moralscore_core::{AnalysisError, AnalysisOptions};

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    /// Dictionary, method, mapping, metrics and scorer parameters
    #[serde(default)]
    pub analysis: AnalysisOptions,

    /// Custom lexicon file replacing the built-in one
    #[serde(default)]
    pub lexicon: LexiconConfig,

    /// Text extraction configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Determinism configuration
    #[serde(default)]
    pub determinism: DeterminismConfig,
}

impl RuntimeConfig {
    /// Load from a YAML (`.yaml`/`.yml`) or JSON (`.json`) file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let config: RuntimeConfig = if is_json {
            serde_json::from_str(&contents)?
        } else {
            serde_yaml::from_str(&contents)?
        };
        config.validate()?;

        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;

        if self.extraction.codepages.is_empty() {
            return Err(ConfigError::Invalid(
                "extraction.codepages must list at least one codepage".to_string(),
            ));
        }
        if self.extraction.command_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "extraction.command_timeout must be greater than zero".to_string(),
            ));
        }
        if self.extraction.ocr.dpi == 0 {
            return Err(ConfigError::Invalid("extraction.ocr.dpi must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Custom lexicon selection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LexiconConfig {
    /// File in the format of `analysis.dictionary`; built-in when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Text decoding attempted for plain-text files, in order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Codepage {
    /// UTF-8, with or without a byte-order mark
    #[serde(rename = "utf-8")]
    Utf8,
    /// UTF-16 LE/BE; requires a byte-order mark
    #[serde(rename = "utf-16")]
    Utf16,
    #[serde(rename = "windows-1252")]
    Windows1252,
    /// ISO-8859-1, byte for code point
    #[serde(rename = "latin-1")]
    Latin1,
}

impl Codepage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Codepage::Utf8 => "utf-8",
            Codepage::Utf16 => "utf-16",
            Codepage::Windows1252 => "windows-1252",
            Codepage::Latin1 => "latin-1",
        }
    }
}

/// Extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Codepage chain for plain-text files
    #[serde(default = "default_codepages")]
    pub codepages: Vec<Codepage>,

    /// Timeout for each external command (`pdftotext`, `pdftoppm`, `tesseract`)
    #[serde(with = "humantime_serde", default = "default_command_timeout")]
    pub command_timeout: Duration,

    /// PDF extraction
    #[serde(default)]
    pub pdf: PdfConfig,

    /// OCR fallback for scanned PDFs
    #[serde(default)]
    pub ocr: OcrConfig,
}

fn default_codepages() -> Vec<Codepage> {
    vec![
        Codepage::Utf8,
        Codepage::Utf16,
        Codepage::Windows1252,
        Codepage::Latin1,
    ]
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(60)
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            codepages: default_codepages(),
            command_timeout: default_command_timeout(),
            pdf: PdfConfig::default(),
            ocr: OcrConfig::default(),
        }
    }
}

/// PDF extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Try the `pdftotext` command after the built-in parser
    #[serde(default = "default_true")]
    pub use_pdftotext: bool,

    #[serde(default = "default_pdftotext")]
    pub pdftotext_command: String,
}

fn default_true() -> bool {
    true
}

fn default_pdftotext() -> String {
    "pdftotext".to_string()
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            use_pdftotext: true,
            pdftotext_command: default_pdftotext(),
        }
    }
}

/// OCR configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Tesseract language code
    #[serde(default = "default_language")]
    pub language: String,

    /// Rasterization resolution
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    #[serde(default = "default_pdftoppm")]
    pub pdftoppm_command: String,

    #[serde(default = "default_tesseract")]
    pub tesseract_command: String,
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_dpi() -> u32 {
    300
}

fn default_pdftoppm() -> String {
    "pdftoppm".to_string()
}

fn default_tesseract() -> String {
    "tesseract".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            language: default_language(),
            dpi: default_dpi(),
            pdftoppm_command: default_pdftoppm(),
            tesseract_command: default_tesseract(),
        }
    }
}

/// Determinism configuration for reproducible results.
///
/// When `analyzed_at` is set it stamps every file analysis instead of the
/// current system time:
///
/// ```yaml
/// determinism:
///   analyzed_at: "2025-12-20T10:00:00Z"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeterminismConfig {
    #[serde(default)]
    pub analyzed_at: Option<DateTime<Utc>>,
}

// Custom serialization for Duration using humantime format
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
