//! Text extraction from files.
//!
//! Extractors are tried in registration order. The first one that claims
//! the file's extension and produces text wins; failures are logged and the
//! next candidate is tried.
//!
//! | Extractor | Extensions | Strategy |
//! |-----------|------------|----------|
//! | [`TxtExtractor`] | `.txt`, `.text`, `.md` | codepage chain |
//! | [`PdfExtractor`] | `.pdf` | built-in parser → `pdftotext` → OCR |

mod command;
mod pdf;
mod txt;

pub use pdf::PdfExtractor;
pub use txt::{decode_with, TxtExtractor};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::ExtractionConfig;

/// Errors that can occur during text extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No extractor registered for '{extension}' ({})", .path.display())]
    NoExtractor { path: PathBuf, extension: String },

    #[error("All extractors failed for {}: {}", .path.display(), .reasons.join("; "))]
    AllFailed { path: PathBuf, reasons: Vec<String> },

    #[error("Failed to decode text: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command '{command}' failed: {reason}")]
    Command { command: String, reason: String },
}

/// Facts about a source file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FileMetadata {
    pub file_name: String,
    pub file_size: u64,
    /// Lowercased extension without the dot
    pub file_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    /// Extractor-specific facts (BTreeMap for deterministic output)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// Trait implemented by all extractors.
pub trait TextExtractor: Send + Sync {
    /// Short name used in logs and error reasons.
    fn name(&self) -> &'static str;

    /// Lowercase extensions without the dot.
    fn extensions(&self) -> &[&'static str];

    fn supports(&self, path: &Path) -> bool {
        let extension = extension_of(path);
        self.extensions().iter().any(|e| *e == extension)
    }

    /// Extract the text of `path`.
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;

    /// Add format-specific facts such as the page count.
    fn enrich_metadata(&self, _path: &Path, _metadata: &mut FileMetadata) {}
}

pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Registry of extractors.
pub struct TextExtractionManager {
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl TextExtractionManager {
    /// Manager with the built-in text and PDF extractors.
    pub fn new(config: &ExtractionConfig) -> Self {
        let mut manager = Self::empty();
        manager.register(Box::new(TxtExtractor::new(config.codepages.clone())));
        manager.register(Box::new(PdfExtractor::new(config)));
        manager
    }

    /// Manager with no extractors.
    pub fn empty() -> Self {
        Self { extractors: Vec::new() }
    }

    /// Append an extractor; earlier registrations are tried first.
    pub fn register(&mut self, extractor: Box<dyn TextExtractor>) {
        tracing::debug!(extractor = extractor.name(), "Extractor registered");
        self.extractors.push(extractor);
    }

    /// Extensions claimed by any registered extractor, in registration order.
    pub fn supported_extensions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for extractor in &self.extractors {
            for ext in extractor.extensions() {
                if !out.iter().any(|e| e.as_str() == *ext) {
                    out.push(ext.to_string());
                }
            }
        }
        out
    }

    pub fn can_extract(&self, path: &Path) -> bool {
        self.extractors.iter().any(|e| e.supports(path))
    }

    /// Extract the text of `path`.
    pub fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        if !path.exists() {
            return Err(ExtractionError::NotFound(path.to_path_buf()));
        }

        let candidates: Vec<&dyn TextExtractor> = self
            .extractors
            .iter()
            .map(|e| e.as_ref())
            .filter(|e| e.supports(path))
            .collect();
        if candidates.is_empty() {
            return Err(ExtractionError::NoExtractor {
                path: path.to_path_buf(),
                extension: extension_of(path),
            });
        }

        let mut reasons = Vec::new();
        for extractor in candidates {
            match extractor.extract(path) {
                Ok(text) => {
                    tracing::debug!(
                        extractor = extractor.name(),
                        path = %path.display(),
                        chars = text.chars().count(),
                        "Text extracted"
                    );
                    return Ok(text);
                }
                Err(e) => {
                    tracing::warn!(
                        extractor = extractor.name(),
                        path = %path.display(),
                        error = %e,
                        "Extractor failed, trying next"
                    );
                    reasons.push(format!("{}: {}", extractor.name(), e));
                }
            }
        }

        Err(ExtractionError::AllFailed {
            path: path.to_path_buf(),
            reasons,
        })
    }

    /// File facts plus whatever the first supporting extractor adds.
    pub fn metadata(&self, path: &Path) -> Result<FileMetadata, ExtractionError> {
        if !path.exists() {
            return Err(ExtractionError::NotFound(path.to_path_buf()));
        }
        let fs_meta = fs::metadata(path)?;

        let mut metadata = FileMetadata {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            file_size: fs_meta.len(),
            file_type: extension_of(path),
            modified: fs_meta.modified().ok().map(DateTime::<Utc>::from),
            page_count: None,
            extra: BTreeMap::new(),
        };

        if let Some(extractor) = self.extractors.iter().find(|e| e.supports(path)) {
            extractor.enrich_metadata(path, &mut metadata);
        }
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl TextExtractor for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn extensions(&self) -> &[&'static str] {
            &["txt", "log"]
        }

        fn extract(&self, _path: &Path) -> Result<String, ExtractionError> {
            Err(ExtractionError::Decode("always fails".to_string()))
        }
    }

    #[test]
    fn test_supported_extensions() {
        let manager = TextExtractionManager::new(&ExtractionConfig::default());
        assert_eq!(manager.supported_extensions(), vec!["txt", "text", "md", "pdf"]);
        assert!(manager.can_extract(Path::new("Report.PDF")));
        assert!(!manager.can_extract(Path::new("image.png")));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let manager = TextExtractionManager::new(&ExtractionConfig::default());
        let result = manager.extract(Path::new("/definitely/not/here.txt"));
        assert!(matches!(result, Err(ExtractionError::NotFound(_))));
    }

    #[test]
    fn test_unclaimed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        fs::write(&path, [0u8, 1, 2]).unwrap();

        let manager = TextExtractionManager::new(&ExtractionConfig::default());
        match manager.extract(&path) {
            Err(ExtractionError::NoExtractor { extension, .. }) => assert_eq!(extension, "png"),
            other => panic!("expected NoExtractor, got {:?}", other),
        }
    }

    #[test]
    fn test_falls_through_to_next_extractor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "fair and just").unwrap();

        let mut manager = TextExtractionManager::empty();
        manager.register(Box::new(Failing));
        manager.register(Box::new(TxtExtractor::new(ExtractionConfig::default().codepages)));
        assert_eq!(manager.extract(&path).unwrap(), "fair and just");
    }

    #[test]
    fn test_all_failed_collects_reasons() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "x").unwrap();

        let mut manager = TextExtractionManager::empty();
        manager.register(Box::new(Failing));
        match manager.extract(&path) {
            Err(ExtractionError::AllFailed { reasons, .. }) => {
                assert_eq!(reasons.len(), 1);
                assert!(reasons[0].starts_with("failing:"));
            }
            other => panic!("expected AllFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_metadata_basics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Essay.TXT");
        fs::write(&path, "hello").unwrap();

        let manager = TextExtractionManager::new(&ExtractionConfig::default());
        let metadata = manager.metadata(&path).unwrap();
        assert_eq!(metadata.file_name, "Essay.TXT");
        assert_eq!(metadata.file_size, 5);
        assert_eq!(metadata.file_type, "txt");
        assert!(metadata.modified.is_some());
        assert!(metadata.page_count.is_none());
    }
}
