//! Paragraph and text-run types.

use serde::{Deserialize, Serialize};
use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

/// A paragraph of report text.
///
/// The joined text is computed once when the paragraph is built; paragraphs
/// are never edited after a document is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    index: usize,
    runs: Vec<TextRun>,
    text: String,
}

impl Paragraph {
    /// Create a paragraph from its runs.
    pub fn from_runs(index: usize, runs: Vec<TextRun>) -> Self {
        let text = runs.iter().map(|r| r.text.as_str()).collect();
        Self { index, runs, text }
    }

    /// Create a paragraph holding a single run of plain text.
    pub fn with_text(index: usize, text: impl Into<String>) -> Self {
        Self::from_runs(index, vec![TextRun::new(text)])
    }

    /// Position of the paragraph in its document (0-indexed).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Text runs as they appeared in the source.
    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Raw paragraph text (runs concatenated, line breaks kept).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Paragraph text with `\n` and `\r` replaced by spaces.
    pub fn flat_text(&self) -> String {
        flatten_newlines(&self.text)
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A run of text sharing formatting in the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content, NFC-normalized
    pub text: String,
}

impl TextRun {
    /// Create a new text run.
    ///
    /// Decomposed characters (e.g. `a` + combining ring) are composed so that
    /// Danish trigger phrases match regardless of how the source encoded them.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let text = match is_nfc_quick(text.chars()) {
            IsNormalized::Yes => text,
            _ => text.nfc().collect(),
        };
        Self { text }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Replace `\n` and `\r` with spaces.
pub fn flatten_newlines(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_text_joins_runs() {
        let p = Paragraph::from_runs(
            3,
            vec![TextRun::new("Hjertet vejer "), TextRun::new("350 g.")],
        );
        assert_eq!(p.text(), "Hjertet vejer 350 g.");
        assert_eq!(p.index(), 3);
        assert_eq!(p.runs().len(), 2);
    }

    #[test]
    fn test_flat_text() {
        let p = Paragraph::with_text(0, "linje 1\nlinje 2\r");
        assert_eq!(p.flat_text(), "linje 1 linje 2 ");
    }

    #[test]
    fn test_nfc_normalization() {
        // "å" written as "a" + U+030A combining ring above
        let run = TextRun::new("Halspuls\u{0061}\u{030A}rerne");
        assert_eq!(run.text, "Halspulsårerne");
    }

    #[test]
    fn test_is_empty() {
        assert!(Paragraph::with_text(0, "  \n").is_empty());
        assert!(!Paragraph::with_text(0, "x").is_empty());
    }
}
