//! Raw input documents and plain-text extraction

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use std::path::Path;

/// A document handed to the pipeline, consumed once by the text extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Display name (usually the file name)
    pub name: String,

    /// Declared media type, e.g. `text/plain`
    pub media_type: String,

    /// Undecoded content
    pub bytes: Vec<u8>,
}

impl RawDocument {
    /// Document from raw bytes with an explicit media type
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Plain-text document
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::from_bytes(name, "text/plain", text.into().into_bytes())
    }

    /// Read a file, inferring the media type from its extension
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_bytes(name, media_type_for_path(path), bytes))
    }
}

/// Media type for a file name, by extension
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("txt") | Some("text") | Some("log") => "text/plain",
        Some("md") | Some("markdown") => "text/markdown",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Essence of a media type: lowercase, parameters dropped
fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Turns a raw document into plain text
pub trait TextExtractor: Send + Sync {
    /// Decode the document or explain why it cannot be read as text
    fn extract(&self, document: &RawDocument) -> Result<String, ExtractorError>;
}

/// UTF-8 text extractor with media-type and length checks
#[derive(Debug, Clone)]
pub struct PlainTextExtractor {
    accepted_media_types: Vec<String>,
    max_text_length: usize,
}

impl PlainTextExtractor {
    /// Create an extractor from pipeline configuration
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            accepted_media_types: config.accepted_media_types.iter().map(|m| essence(m)).collect(),
            max_text_length: config.max_text_length,
        }
    }

    fn accepts(&self, media_type: &str) -> bool {
        let wanted = essence(media_type);
        self.accepted_media_types.iter().any(|m| *m == wanted)
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, document: &RawDocument) -> Result<String, ExtractorError> {
        if !self.accepts(&document.media_type) {
            return Err(ExtractorError::Extraction(format!(
                "unsupported media type '{}' for {}",
                document.media_type, document.name
            )));
        }

        let bytes = document
            .bytes
            .strip_prefix(b"\xEF\xBB\xBF")
            .unwrap_or(document.bytes.as_slice());

        let text = std::str::from_utf8(bytes).map_err(|e| {
            ExtractorError::Extraction(format!(
                "{} is not valid UTF-8 text (invalid byte at offset {})",
                document.name,
                e.valid_up_to()
            ))
        })?;

        let length = text.chars().count();
        if length > self.max_text_length {
            return Err(ExtractorError::Extraction(format!(
                "{} is too long: {} chars (max: {})",
                document.name, length, self.max_text_length
            )));
        }

        if text.trim().is_empty() {
            return Err(ExtractorError::Extraction(format!("{} is empty", document.name)));
        }

        Ok(text.replace("\r\n", "\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_text() {
        let doc = RawDocument::from_text("call.txt", "Yana: hi\r\nDana: we need exports\r\n");
        let text = PlainTextExtractor::default().extract(&doc).unwrap();
        assert_eq!(text, "Yana: hi\nDana: we need exports\n");
    }

    #[test]
    fn test_strips_byte_order_mark() {
        let doc = RawDocument::from_bytes("call.md", "text/markdown", b"\xEF\xBB\xBF# Call".to_vec());
        assert_eq!(PlainTextExtractor::default().extract(&doc).unwrap(), "# Call");
    }

    #[test]
    fn test_media_type_parameters_ignored() {
        let doc = RawDocument::from_bytes("a", "Text/Plain; charset=utf-8", b"hello".to_vec());
        assert!(PlainTextExtractor::default().extract(&doc).is_ok());
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        let doc = RawDocument::from_bytes("bin.txt", "text/plain", vec![b'o', b'k', 0xFF, 0xFE]);
        let err = PlainTextExtractor::default().extract(&doc).unwrap_err();
        match err {
            ExtractorError::Extraction(msg) => assert!(msg.contains("offset 2")),
            other => panic!("Expected Extraction error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unsupported_media_type() {
        let doc = RawDocument::from_bytes("scan.pdf", "application/pdf", b"%PDF".to_vec());
        assert!(matches!(
            PlainTextExtractor::default().extract(&doc),
            Err(ExtractorError::Extraction(_))
        ));
    }

    #[test]
    fn test_rejects_too_long() {
        let config = ExtractorConfig {
            max_text_length: 5,
            ..Default::default()
        };
        let doc = RawDocument::from_text("a.txt", "привет мир");
        assert!(PlainTextExtractor::new(&config).extract(&doc).is_err());

        // Length is counted in characters, not bytes
        let doc = RawDocument::from_text("a.txt", "привет");
        let config = ExtractorConfig {
            max_text_length: 6,
            ..Default::default()
        };
        assert!(PlainTextExtractor::new(&config).extract(&doc).is_ok());
    }

    #[test]
    fn test_rejects_blank_document() {
        let doc = RawDocument::from_text("empty.txt", " \n\t");
        assert!(PlainTextExtractor::default().extract(&doc).is_err());
    }

    #[test]
    fn test_media_type_for_path() {
        assert_eq!(media_type_for_path(Path::new("a.TXT")), "text/plain");
        assert_eq!(media_type_for_path(Path::new("notes.md")), "text/markdown");
        assert_eq!(media_type_for_path(Path::new("dump.json")), "application/json");
        assert_eq!(media_type_for_path(Path::new("scan.pdf")), "application/octet-stream");
        assert_eq!(media_type_for_path(Path::new("README")), "application/octet-stream");
    }
}
