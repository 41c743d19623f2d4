//! PDF extraction.
//!
//! Stages, tried in order until one yields non-blank text:
//! 1. built-in parser (`pdf-extract`, cargo feature `pdf`)
//! 2. `pdftotext`
//! 3. OCR: `pdftoppm` rasterizes pages, `tesseract` reads them (opt-in)
//!
//! Metadata adds the page count and the document info dictionary
//! (`pdf_title`, `pdf_author`, ...) read through lopdf.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use super::command::run_with_timeout;
use super::{ExtractionError, FileMetadata, TextExtractor};
use crate::config::{ExtractionConfig, OcrConfig, PdfConfig};

/// Layered PDF text extractor.
pub struct PdfExtractor {
    pdf: PdfConfig,
    ocr: OcrConfig,
    timeout: Duration,
}

impl PdfExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            pdf: config.pdf.clone(),
            ocr: config.ocr.clone(),
            timeout: config.command_timeout,
        }
    }

    #[cfg(feature = "pdf")]
    fn extract_builtin(&self, path: &Path) -> Result<String, ExtractionError> {
        // The parser panics on some malformed files.
        match std::panic::catch_unwind(|| pdf_extract::extract_text(path)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractionError::Decode(e.to_string())),
            Err(_) => Err(ExtractionError::Decode("pdf parser panicked".to_string())),
        }
    }

    fn extract_pdftotext(&self, path: &Path) -> Result<String, ExtractionError> {
        let mut command = Command::new(&self.pdf.pdftotext_command);
        command.arg("-layout").arg(path).arg("-");
        let out = run_with_timeout(command, self.timeout)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn extract_ocr(&self, path: &Path) -> Result<String, ExtractionError> {
        let workdir = tempfile::tempdir()?;
        let prefix = workdir.path().join("page");

        let mut rasterize = Command::new(&self.ocr.pdftoppm_command);
        rasterize
            .arg("-r")
            .arg(self.ocr.dpi.to_string())
            .arg("-png")
            .arg(path)
            .arg(&prefix);
        run_with_timeout(rasterize, self.timeout)?;

        let mut pages: Vec<PathBuf> = fs::read_dir(workdir.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|e| e == "png"))
            .collect();
        pages.sort();
        if pages.is_empty() {
            return Err(ExtractionError::Decode("rasterizer produced no pages".to_string()));
        }

        let mut text = String::new();
        for page in &pages {
            let mut recognize = Command::new(&self.ocr.tesseract_command);
            recognize
                .arg(page)
                .arg("stdout")
                .arg("-l")
                .arg(&self.ocr.language);
            let out = run_with_timeout(recognize, self.timeout)?;
            text.push_str(&String::from_utf8_lossy(&out));
            text.push('\n');
        }

        tracing::info!(path = %path.display(), pages = pages.len(), "OCR completed");
        Ok(text)
    }
}

impl TextExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extensions(&self) -> &[&'static str] {
        &["pdf"]
    }

    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        type Stage<'a> = (&'static str, Box<dyn Fn() -> Result<String, ExtractionError> + 'a>);

        let mut stages: Vec<Stage<'_>> = Vec::new();
        #[cfg(feature = "pdf")]
        stages.push(("pdf-extract", Box::new(|| self.extract_builtin(path))));
        if self.pdf.use_pdftotext {
            stages.push(("pdftotext", Box::new(|| self.extract_pdftotext(path))));
        }
        if self.ocr.enabled {
            stages.push(("ocr", Box::new(|| self.extract_ocr(path))));
        }

        let mut reasons = Vec::new();
        for (stage, run) in stages {
            match run() {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::debug!(stage, path = %path.display(), "PDF stage succeeded");
                    return Ok(text);
                }
                Ok(_) => {
                    tracing::warn!(stage, path = %path.display(), "PDF stage produced no text");
                    reasons.push(format!("{}: no text", stage));
                }
                Err(e) => {
                    tracing::warn!(stage, path = %path.display(), error = %e, "PDF stage failed");
                    reasons.push(format!("{}: {}", stage, e));
                }
            }
        }

        if reasons.is_empty() {
            reasons.push("no extraction stage enabled".to_string());
        }
        Err(ExtractionError::Decode(reasons.join("; ")))
    }

    fn enrich_metadata(&self, path: &Path, metadata: &mut FileMetadata) {
        read_document_facts(path, metadata);
        metadata
            .extra
            .insert("ocr_enabled".to_string(), self.ocr.enabled.to_string());
    }
}

/// Page count plus the document info dictionary as `pdf_<key>` extras.
#[cfg(feature = "pdf")]
fn read_document_facts(path: &Path, metadata: &mut FileMetadata) {
    let doc = match lopdf::Document::load(path) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Could not read PDF structure");
            return;
        }
    };
    metadata.page_count = Some(doc.get_pages().len());
    for (key, value) in document_info(&doc) {
        metadata.extra.insert(format!("pdf_{}", key), value);
    }
}

#[cfg(not(feature = "pdf"))]
fn read_document_facts(_path: &Path, _metadata: &mut FileMetadata) {}

#[cfg(feature = "pdf")]
fn document_info(doc: &lopdf::Document) -> Vec<(String, String)> {
    use lopdf::Object;

    let info = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).ok(),
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    };
    let Some(info) = info else {
        return Vec::new();
    };

    info.iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Object::String(bytes, _) => decode_text_string(bytes),
                Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                _ => return None,
            };
            let text = text.trim().to_string();
            (!text.is_empty()).then(|| (String::from_utf8_lossy(key).to_lowercase(), text))
        })
        .collect()
}

/// UTF-16BE with a byte order mark, otherwise one byte per character.
#[cfg(feature = "pdf")]
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(body) => encoding_rs::UTF_16BE
            .decode_without_bom_handling(body)
            .0
            .into_owned(),
        None => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> ExtractionConfig {
        let mut config = ExtractionConfig::default();
        config.pdf.pdftotext_command = "moralscore-missing-pdftotext".to_string();
        config.command_timeout = Duration::from_secs(5);
        config
    }

    #[test]
    fn test_garbage_pdf_reports_every_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"this is not a pdf").unwrap();

        let err = PdfExtractor::new(&offline_config()).extract(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("pdftotext"), "{}", message);
        #[cfg(feature = "pdf")]
        assert!(message.contains("pdf-extract"), "{}", message);
        assert!(!message.contains("ocr:"), "{}", message);
    }

    #[test]
    fn test_ocr_stage_runs_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        fs::write(&path, b"%PDF-1.4 nothing here").unwrap();

        let mut config = offline_config();
        config.ocr.enabled = true;
        config.ocr.pdftoppm_command = "moralscore-missing-pdftoppm".to_string();

        let message = PdfExtractor::new(&config).extract(&path).unwrap_err().to_string();
        assert!(message.contains("ocr:"), "{}", message);
        assert!(message.contains("moralscore-missing-pdftoppm"), "{}", message);
    }

    #[test]
    fn test_metadata_without_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"junk").unwrap();

        let mut metadata = FileMetadata::default();
        PdfExtractor::new(&offline_config()).enrich_metadata(&path, &mut metadata);
        assert!(metadata.page_count.is_none());
        assert_eq!(metadata.extra.get("ocr_enabled").map(String::as_str), Some("false"));
    }

    #[cfg(feature = "pdf")]
    fn write_one_page_pdf(path: &Path, text: &str) {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Closing Argument"),
            "Author" => Object::string_literal("Court Clerk"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.save(path).unwrap();
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_builtin_parser_reads_text_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("argument.pdf");
        write_one_page_pdf(&path, "justice");

        let mut config = offline_config();
        config.pdf.use_pdftotext = false;
        let text = PdfExtractor::new(&config).extract(&path).unwrap();
        assert!(text.contains("justice"), "{:?}", text);
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_metadata_from_document_structure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("argument.pdf");
        write_one_page_pdf(&path, "justice");

        let mut metadata = FileMetadata::default();
        PdfExtractor::new(&offline_config()).enrich_metadata(&path, &mut metadata);
        assert_eq!(metadata.page_count, Some(1));
        assert_eq!(
            metadata.extra.get("pdf_title").map(String::as_str),
            Some("Closing Argument")
        );
        assert_eq!(
            metadata.extra.get("pdf_author").map(String::as_str),
            Some("Court Clerk")
        );
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_utf16_info_strings() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "V\u{e9}rit\u{e9}".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_text_string(&bytes), "V\u{e9}rit\u{e9}");
        assert_eq!(decode_text_string(b"Oath"), "Oath");
    }
}
