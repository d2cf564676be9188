//! Source format detection and validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Detected source document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Office Open XML word-processing document (zip container)
    Docx,
    /// UTF-8 plain text, one paragraph per line
    PlainText,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Docx => write!(f, "DOCX"),
            SourceFormat::PlainText => write!(f, "text"),
        }
    }
}

/// Zip local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const SNIFF_LEN: usize = 512;

/// Detect the source format from a file path.
///
/// Only the first few hundred bytes are read.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the source format from bytes.
///
/// # Returns
/// * `Ok(SourceFormat::Docx)` if the data starts with a zip header
/// * `Ok(SourceFormat::PlainText)` if the data is UTF-8 text without NUL bytes
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SourceFormat> {
    if data.is_empty() {
        return Err(Error::UnknownFormat);
    }

    if data.starts_with(ZIP_MAGIC) {
        return Ok(SourceFormat::Docx);
    }

    if looks_like_text(data) {
        return Ok(SourceFormat::PlainText);
    }

    Err(Error::UnknownFormat)
}

/// UTF-8 check tolerant of a multi-byte sequence cut off by the sniff window.
fn looks_like_text(data: &[u8]) -> bool {
    if data.contains(&0) {
        return false;
    }
    match std::str::from_utf8(data) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

/// Check if a file is a zip-based DOCX container.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format_from_path(path), Ok(SourceFormat::Docx))
}

/// Check if bytes start with a zip container header.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    matches!(detect_format_from_bytes(data), Ok(SourceFormat::Docx))
}
