//! Error types for autmine library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for autmine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, mining or exporting documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a recognized document container.
    #[error("Unknown file format: not a valid DOCX container")]
    UnknownFormat,

    /// No loader is registered for the file extension.
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    /// Error reading the DOCX zip container.
    #[error("DOCX container error: {0}")]
    Zip(String),

    /// Error parsing WordprocessingML.
    #[error("DOCX markup error: {0}")]
    Xml(String),

    /// A keyword list could not be read.
    #[error("Keyword list {path}: {reason}")]
    KeywordList {
        /// File the list was read from
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A keyword could not be compiled into a search pattern.
    #[error("Invalid keyword pattern: {0}")]
    Pattern(String),

    /// The input folder contains no loadable documents.
    #[error("No documents found in {0}")]
    NoDocuments(PathBuf),

    /// Error writing CSV output.
    #[error("CSV export error: {0}")]
    Csv(String),

    /// Error writing JSON output.
    #[error("JSON export error: {0}")]
    Json(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::Zip(err.to_string()),
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Pattern(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}
