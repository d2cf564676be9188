//! Field extractors for autopsy reports.
//!
//! Each submodule covers one family of fields. Extractors are pure functions
//! (or small matchers compiled once from keyword lists) over the document's
//! full text or its paragraphs. None of them fails: missing triggers yield
//! sentinels or `Absent`, malformed captures are reported as [`Diagnostic`]s.
//!
//! # Example
//!
//! ```
//! use autmine::extract::{demographics, putrefaction};
//!
//! let text = "Afdøde var en 54-årig mand. Der var begyndende forrådnelse.";
//! let age = demographics::age(text).unwrap();
//! assert_eq!(age.unit.label(), "yrs");
//! assert_eq!(demographics::sex(text).unwrap().label(), "M");
//! assert_eq!(putrefaction::degree(text).label(), "DISCREET");
//! ```

pub mod demographics;
pub mod flags;
pub mod identifiers;
pub mod lesions;
pub mod measurements;
pub mod narrative;
pub mod pattern;
pub mod putrefaction;

use crate::error::{Error, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error as ThisError;

/// Default organ weight keywords.
pub const DEFAULT_WEIGHT_KEYWORDS: &[&str] = &[
    "Højre lunge",
    "Venstre lunge",
    "Hjerte",
    "Milt",
    "Leveren",
    "Hjernen",
    "Højre nyre",
    "Venstre nyre",
];

/// Default organs measured in three dimensions.
pub const DEFAULT_SIZE_KEYWORDS: &[&str] = &["Hjertet", "Leveren", "Højre nyre", "Venstre nyre"];

/// Default heart wall keywords.
pub const DEFAULT_WALL_KEYWORDS: &[&str] =
    &["højre hjertekammer", "venstre hjertekammer", "hjerteskille"];

/// Default cavity keywords for fluid volumes.
pub const DEFAULT_FLUID_KEYWORDS: &[&str] = &["højre", "venstre", "bughule"];

/// Default keyword looked for near CT paragraphs.
pub const DEFAULT_CT_KEYWORD: &str = "hjertepose";

/// A capture that matched its pattern but could not be converted.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("{reason}: {input:?}")]
pub struct Malformed {
    /// The captured text
    pub input: String,
    /// Why it was rejected
    pub reason: String,
}

impl Malformed {
    /// Create a new malformed-input report.
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// A non-fatal extraction problem attached to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Field the problem belongs to
    pub field: String,
    /// The offending input
    pub input: String,
    /// Description of the problem
    pub reason: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({:?})", self.field, self.reason, self.input)
    }
}

/// Diagnostics collected while assembling one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a malformed capture for `field`.
    pub fn malformed(&mut self, field: impl Into<String>, err: Malformed) {
        self.entries.push(Diagnostic {
            field: field.into(),
            input: err.input,
            reason: err.reason,
        });
    }

    /// Unwrap a parse result, recording the failure.
    pub fn check<T>(&mut self, field: &str, result: std::result::Result<T, Malformed>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.malformed(field, err);
                None
            }
        }
    }

    /// Iterate over the diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An ordered list of search terms, one per line in its source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordList {
    terms: Vec<String>,
}

impl KeywordList {
    /// Build a list from terms; blank entries are dropped and the rest trimmed.
    pub fn new<S: AsRef<str>>(terms: impl IntoIterator<Item = S>) -> Self {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Read a UTF-8 list file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::KeywordList {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let list = Self::new(content.lines());
        log::debug!("Loaded {} terms from {}", list.len(), path.display());
        Ok(list)
    }

    /// The terms in file order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// The four term lists lesion extraction needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LesionLexicon {
    /// Lesion terms (`list_les.txt`)
    pub lesions: KeywordList,
    /// Colour terms (`list_col.txt`)
    pub colors: KeywordList,
    /// Location terms (`list_loc.txt`)
    pub locations: KeywordList,
    /// Shape terms (`list_sha.txt`)
    pub shapes: KeywordList,
}

impl LesionLexicon {
    /// Read the four lists from a directory. All four files must exist.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            lesions: KeywordList::from_file(dir.join("list_les.txt"))?,
            colors: KeywordList::from_file(dir.join("list_col.txt"))?,
            locations: KeywordList::from_file(dir.join("list_loc.txt"))?,
            shapes: KeywordList::from_file(dir.join("list_sha.txt"))?,
        })
    }
}

/// Keyword configuration for a mining run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Organs whose weight is extracted
    pub weight_keywords: Vec<String>,

    /// Organs whose three dimensions are extracted
    pub size_keywords: Vec<String>,

    /// Heart walls whose thickness is extracted
    pub wall_keywords: Vec<String>,

    /// Cavities whose fluid volume is extracted
    pub fluid_keywords: Vec<String>,

    /// Keyword looked for after CT paragraphs
    pub ct_keyword: String,

    /// Lesion term lists; lesion fields are only produced when set
    pub lesions: Option<LesionLexicon>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl ExtractOptions {
    /// Create options with the default keyword lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the organ weight keywords.
    pub fn with_weight_keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.weight_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the organ size keywords.
    pub fn with_size_keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.size_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the wall thickness keywords.
    pub fn with_wall_keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.wall_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the fluid volume keywords.
    pub fn with_fluid_keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.fluid_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the CT keyword.
    pub fn with_ct_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.ct_keyword = keyword.into();
        self
    }

    /// Enable lesion extraction.
    pub fn with_lesions(mut self, lexicon: LesionLexicon) -> Self {
        self.lesions = Some(lexicon);
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            weight_keywords: owned(DEFAULT_WEIGHT_KEYWORDS),
            size_keywords: owned(DEFAULT_SIZE_KEYWORDS),
            wall_keywords: owned(DEFAULT_WALL_KEYWORDS),
            fluid_keywords: owned(DEFAULT_FLUID_KEYWORDS),
            ct_keyword: DEFAULT_CT_KEYWORD.to_string(),
            lesions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_options_builder() {
        let options = ExtractOptions::new()
            .with_weight_keywords(["Milt"])
            .with_ct_keyword("pneumothorax");
        assert_eq!(options.weight_keywords, ["Milt"]);
        assert_eq!(options.size_keywords.len(), 4);
        assert_eq!(options.ct_keyword, "pneumothorax");
        assert!(options.lesions.is_none());
    }

    #[test]
    fn test_keyword_list_trims_and_skips_blanks() {
        let list = KeywordList::new(["  sår ", "", "   ", "hudafskrabning"]);
        assert_eq!(list.terms(), ["sår", "hudafskrabning"]);
    }

    #[test]
    fn test_keyword_list_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "blodudtrædning\n\nsår\r").unwrap();
        let list = KeywordList::from_file(file.path()).unwrap();
        assert_eq!(list.terms(), ["blodudtrædning", "sår"]);
    }

    #[test]
    fn test_lexicon_requires_all_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("list_les.txt"), "sår\n").unwrap();
        let err = LesionLexicon::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, Error::KeywordList { .. }));
    }

    #[test]
    fn test_diagnostics_check() {
        let mut diagnostics = Diagnostics::new();
        assert_eq!(diagnostics.check("Age", pattern::parse_int("42")), Some(42));
        assert_eq!(diagnostics.check("Age", pattern::parse_int("x")), None);
        assert_eq!(diagnostics.len(), 1);
        let d = diagnostics.iter().next().unwrap();
        assert_eq!(d.field, "Age");
        assert_eq!(d.input, "x");
    }
}
