//! Plain-text loader: one paragraph per line.

use super::DocumentLoader;
use crate::detect::{detect_format_from_bytes, SourceFormat};
use crate::error::{Error, Result};
use crate::model::Document;

/// Loader for UTF-8 text exports of reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

impl TextLoader {
    /// Create a new text loader.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for TextLoader {
    fn supported_extensions(&self) -> &[&str] {
        &["txt"]
    }

    fn name(&self) -> &str {
        "text"
    }

    fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<Document> {
        if bytes.is_empty() {
            return Ok(Document::new(name));
        }
        if detect_format_from_bytes(bytes)? != SourceFormat::PlainText {
            return Err(Error::UnknownFormat);
        }
        let text = std::str::from_utf8(bytes).map_err(|e| Error::Other(e.to_string()))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Ok(Document::from_paragraphs(
            name,
            text.lines().map(|l| l.trim_end_matches('\r')),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_become_paragraphs() {
        let doc = TextLoader::new()
            .load_bytes("a.txt", "\u{feff}Obduktion\r\n\r\nDødsårsag: drukning\n".as_bytes())
            .unwrap();
        let texts: Vec<&str> = doc.paragraphs().iter().map(|p| p.text()).collect();
        assert_eq!(texts, ["Obduktion", "", "Dødsårsag: drukning"]);
        assert!(doc.tables().is_empty());
    }

    #[test]
    fn test_empty_file() {
        let doc = TextLoader::new().load_bytes("a.txt", b"").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_rejects_zip() {
        let err = TextLoader::new().load_bytes("a.txt", b"PK\x03\x04abc").unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
    }
}
