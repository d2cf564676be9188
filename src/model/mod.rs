//! Document and record model types.
//!
//! [`Document`] is the loaded input (paragraphs and table grids) that the
//! extractors read; [`Record`] is the flat row they produce, and
//! [`FieldRegistry`] the batch-wide column set.

mod document;
mod paragraph;
mod record;
mod table;

pub use document::Document;
pub use paragraph::{flatten_newlines, Paragraph, TextRun};
pub use record::{fields, Collision, FieldRegistry, FieldValue, Record};
pub use table::{Table, TableCell, TableRow};
