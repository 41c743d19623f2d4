//! Plain-text extraction with a codepage fallback chain.

use encoding_rs::{UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use std::fs;
use std::path::Path;

use super::{ExtractionError, TextExtractor};
use crate::config::Codepage;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Decodes `.txt`, `.text` and `.md` files.
pub struct TxtExtractor {
    codepages: Vec<Codepage>,
}

impl TxtExtractor {
    pub fn new(codepages: Vec<Codepage>) -> Self {
        Self { codepages }
    }
}

impl TextExtractor for TxtExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extensions(&self) -> &[&'static str] {
        &["txt", "text", "md"]
    }

    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = fs::read(path)?;
        let (text, codepage) = decode_with(&bytes, &self.codepages)?;
        if self.codepages.first() != Some(&codepage) {
            tracing::warn!(
                path = %path.display(),
                codepage = codepage.as_str(),
                "Decoded with fallback codepage"
            );
        }
        Ok(text)
    }
}

/// Decode `bytes` with the first codepage in `chain` that accepts them.
pub fn decode_with(bytes: &[u8], chain: &[Codepage]) -> Result<(String, Codepage), ExtractionError> {
    for codepage in chain {
        if let Some(text) = decode(bytes, *codepage) {
            return Ok((text, *codepage));
        }
    }
    let tried: Vec<&str> = chain.iter().map(Codepage::as_str).collect();
    Err(ExtractionError::Decode(format!(
        "bytes are not valid in any of: {}",
        tried.join(", ")
    )))
}

fn decode(bytes: &[u8], codepage: Codepage) -> Option<String> {
    match codepage {
        Codepage::Utf8 => {
            let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            UTF_8
                .decode_without_bom_handling_and_without_replacement(body)
                .map(|t| t.into_owned())
        }
        Codepage::Utf16 => {
            let (encoding, body) = if let Some(body) = bytes.strip_prefix(UTF16LE_BOM) {
                (UTF_16LE, body)
            } else if let Some(body) = bytes.strip_prefix(UTF16BE_BOM) {
                (UTF_16BE, body)
            } else {
                return None;
            };
            encoding
                .decode_without_bom_handling_and_without_replacement(body)
                .map(|t| t.into_owned())
        }
        Codepage::Windows1252 => WINDOWS_1252
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|t| t.into_owned()),
        Codepage::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn default_chain() -> Vec<Codepage> {
        crate::config::ExtractionConfig::default().codepages
    }

    #[test]
    fn test_utf8_with_and_without_bom() {
        let (text, cp) = decode_with("caf\u{e9}".as_bytes(), &default_chain()).unwrap();
        assert_eq!(text, "caf\u{e9}");
        assert_eq!(cp, Codepage::Utf8);

        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"fair");
        assert_eq!(decode_with(&bytes, &default_chain()).unwrap().0, "fair");
    }

    #[test]
    fn test_utf16_with_bom() {
        let mut bytes = UTF16LE_BOM.to_vec();
        for unit in "loyal".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let (text, cp) = decode_with(&bytes, &default_chain()).unwrap();
        assert_eq!(text, "loyal");
        assert_eq!(cp, Codepage::Utf16);
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "caf\xe9 \x93q\x94"
        let bytes = [0x63, 0x61, 0x66, 0xE9, 0x20, 0x93, 0x71, 0x94];
        let (text, cp) = decode_with(&bytes, &default_chain()).unwrap();
        assert_eq!(cp, Codepage::Windows1252);
        assert_eq!(text, "caf\u{e9} \u{201c}q\u{201d}");
    }

    #[test]
    fn test_latin1_maps_bytes_to_code_points() {
        let (text, cp) = decode_with(&[0x66, 0xE9, 0x93], &[Codepage::Utf8, Codepage::Latin1]).unwrap();
        assert_eq!(cp, Codepage::Latin1);
        assert_eq!(text, "f\u{e9}\u{93}");
    }

    #[test]
    fn test_chain_exhausted() {
        let result = decode_with(&[0xFF, 0x00, 0xC3], &[Codepage::Utf8, Codepage::Utf16]);
        assert!(matches!(result, Err(ExtractionError::Decode(_))));
    }

    #[test]
    fn test_extract_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.md");
        fs::write(&path, "# Title\n\nWe stand together.").unwrap();

        let text = TxtExtractor::new(default_chain()).extract(&path).unwrap();
        assert!(text.contains("stand together"));
    }
}
