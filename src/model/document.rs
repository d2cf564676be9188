//! Document-level types.

use super::{flatten_newlines, Paragraph, Table, TableCell, TextRun};
use serde::{Deserialize, Serialize};

/// A loaded report: body paragraphs and table grids.
///
/// Paragraphs inside tables are not part of [`Document::paragraphs`]; they are
/// only reachable through the table cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Source file name (no directory part)
    pub name: String,

    paragraphs: Vec<Paragraph>,

    tables: Vec<Table>,
}

impl Document {
    /// Create a new empty document.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paragraphs: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Build a document from plain paragraph strings.
    pub fn from_paragraphs<S: Into<String>>(
        name: impl Into<String>,
        paragraphs: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut doc = Self::new(name);
        for text in paragraphs {
            doc.push_text(text);
        }
        doc
    }

    /// Append a paragraph made of the given runs.
    pub fn push_runs(&mut self, runs: Vec<TextRun>) {
        let index = self.paragraphs.len();
        self.paragraphs.push(Paragraph::from_runs(index, runs));
    }

    /// Append a single-run paragraph.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.push_runs(vec![TextRun::new(text)]);
    }

    /// Add a table to the document.
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Body paragraphs in document order.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Tables in document order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Every table cell, table by table and row by row.
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.tables.iter().flat_map(|t| t.cells())
    }

    /// Get the number of body paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Check if the document has neither paragraphs nor tables.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.tables.is_empty()
    }

    /// Full-text view: every paragraph with line breaks flattened to spaces,
    /// joined by a single space.
    ///
    /// Deterministic for a given document; callers that run several
    /// extractors compute it once and share the string.
    pub fn full_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| flatten_newlines(p.text()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
