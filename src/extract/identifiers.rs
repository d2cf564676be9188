//! Person, case and date identifiers from the report header.
//!
//! The header table is searched first; older reports without a header table
//! fall back to a cascade over the body paragraphs.

use crate::model::{Document, Paragraph};
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel when no person identifier is found.
pub const CPR_NOT_FOUND: &str = "No CPR match";
/// Sentinel when no case number is found.
pub const CASE_NOT_FOUND: &str = "No match";
/// Sentinel when no autopsy date is found.
pub const DATE_NOT_FOUND: &str = "No date";

/// Paragraphs searched for a date when the header table has none.
const DATE_PARAGRAPH_LIMIT: usize = 15;

static CPR_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{6}-[\da-zA-ZÅ-ø]{4}\b").unwrap());
static CPR_COMPACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{6})([\da-zA-ZÅ-ø]{4})(-)?\b").unwrap());
static CPR_HYPHENATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{6}-[\da-zA-ZÅ-ø]{4})(-)?\b").unwrap());
static CPR_SPACED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{2}) ?\.?(\d{2}) ?\.?(\d{2}) ?- ?(\d{4})").unwrap());

static JOURNAL_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"04\.01\.\d{1,3}\.\d{2}").unwrap());
static OK_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"OK ?(?:\d{1,3}[\\\-/ ]\d{2,4}|\d{3,5})").unwrap());

static DATE_CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{2}[-.]\d{2}[-.]\d{4}\b").unwrap());
static DATE_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[-.](\d{2})[-.](\d{2,4})").unwrap());

static SUPPLEMENTARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bsupplerende erklæring til(?: retslægelig)? obduktion|obduktion-supl\b")
        .unwrap()
});

/// Report status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    /// Primary autopsy report
    Primary,
    /// Supplementary statement to an earlier report
    Supplementary,
}

impl ReportStatus {
    /// Export label.
    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Primary => "Prim",
            ReportStatus::Supplementary => "Supp",
        }
    }
}

/// Person identifier (`DDMMYY-XXXX`).
pub fn cpr_number(doc: &Document) -> Option<String> {
    if let Some(m) = doc.cells().find_map(|cell| CPR_CELL.find(cell.as_str())) {
        return Some(m.as_str().to_string());
    }
    doc.paragraphs().iter().find_map(cpr_from_paragraph)
}

fn cpr_from_paragraph(paragraph: &Paragraph) -> Option<String> {
    let text = paragraph.text();
    if let Some(c) = CPR_COMPACT.captures(text) {
        return Some(format!("{}-{}", &c[1], &c[2]));
    }
    if let Some(c) = CPR_HYPHENATED.captures(text) {
        return Some(c[1].to_string());
    }
    CPR_SPACED
        .captures(text)
        .map(|c| format!("{}{}{}-{}", &c[1], &c[2], &c[3], &c[4]))
}

/// Case number, prefixed with `J`.
pub fn case_number(doc: &Document) -> Option<String> {
    let in_cells = doc.cells().find_map(|cell| {
        let text = cell.as_str();
        JOURNAL_NUMBER.find(text).or_else(|| OK_NUMBER.find(text))
    });
    let found = in_cells.or_else(|| {
        doc.paragraphs()
            .iter()
            .find_map(|p| OK_NUMBER.find(p.text()))
    });
    found.map(|m| format!("J{}", m.as_str()))
}

/// Autopsy date, verbatim from the header or `DD-MM-YY(YY)` from the body.
pub fn autopsy_date(doc: &Document) -> Option<String> {
    if let Some(m) = doc.cells().find_map(|cell| DATE_CELL.find(cell.as_str())) {
        return Some(m.as_str().to_string());
    }
    doc.paragraphs()
        .iter()
        .take(DATE_PARAGRAPH_LIMIT)
        .find_map(|p| DATE_PARAGRAPH.captures(p.text()))
        .map(|c| format!("{:0>2}-{}-{}", &c[1], &c[2], &c[3]))
}

/// Primary or supplementary report.
pub fn report_status(full_text: &str) -> ReportStatus {
    if SUPPLEMENTARY.is_match(full_text) {
        ReportStatus::Supplementary
    } else {
        ReportStatus::Primary
    }
}
