//! # autmine
//!
//! Field extraction from Danish forensic autopsy reports.
//!
//! Every report in a folder is loaded into a [`Document`], a catalogue of
//! heuristic extractors turns it into one flat [`Record`] (identifiers,
//! demographics, organ measurements, cause-of-death flags, free-text
//! captures, lesions), and duplicate reports of the same case are merged
//! before export.
//!
//! ## Quick Start
//!
//! ```no_run
//! use autmine::export::{write_records_csv, CsvOptions};
//! use std::fs::File;
//!
//! fn main() -> autmine::Result<()> {
//!     let batch = autmine::extract_folder("reports")?;
//!     let file = File::create("output.csv")?;
//!     write_records_csv(&batch.records, &batch.registry, file, &CsvOptions::default())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Loaders**: `.docx` (body paragraphs and table cells) and plain text
//! - **Extractors**: identifiers, age and sex, organ weights and sizes,
//!   putrefaction, cause-of-death flags, narrative captures, lesions
//! - **Deduplication**: one record per case and report, with an audit log
//! - **Parallel processing**: Rayon across documents, deterministic output
//! - **Export**: quote-all CSV (UTF-8 or UTF-16 with BOM) and JSON

pub mod assemble;
pub mod dedup;
pub mod detect;
pub mod error;
pub mod export;
pub mod extract;
pub mod load;
pub mod model;
pub mod pipeline;
pub mod search;

// Re-export commonly used types
pub use assemble::{AssembledRecord, Assembler};
pub use dedup::{merge, AuditEntry, MergeOutcome, MergePolicy};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, SourceFormat};
pub use error::{Error, Result};
pub use export::{CsvEncoding, CsvOptions, JsonFormat};
pub use extract::{Diagnostic, Diagnostics, ExtractOptions, KeywordList, LesionLexicon};
pub use load::{DocumentLoader, DocxLoader, LoaderRegistry, TextLoader};
pub use model::{
    Collision, Document, FieldRegistry, FieldValue, Paragraph, Record, Table, TableCell,
    TableRow, TextRun,
};
pub use pipeline::{
    BatchOutput, NoProgress, Pipeline, PipelineOptions, ProgressSink, SkippedDocument,
};

use std::path::Path;

/// Load a single report.
///
/// # Example
///
/// ```no_run
/// let doc = autmine::load_file("reports/0001.docx").unwrap();
/// println!("{} paragraphs", doc.paragraph_count());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    LoaderRegistry::with_defaults().load(path.as_ref())
}

/// Load a single report and extract its record with default keywords.
///
/// # Example
///
/// ```no_run
/// let assembled = autmine::assemble_file("reports/0001.docx").unwrap();
/// for (name, value) in assembled.record.iter() {
///     println!("{}: {}", name, value.render());
/// }
/// ```
pub fn assemble_file<P: AsRef<Path>>(path: P) -> Result<AssembledRecord> {
    let doc = load_file(path)?;
    let assembler = Assembler::new(ExtractOptions::default())?;
    Ok(assembler.assemble(&doc))
}

/// Process every report under a folder with default options.
///
/// # Example
///
/// ```no_run
/// let batch = autmine::extract_folder("reports").unwrap();
/// println!("{} records, {} columns", batch.records.len(), batch.registry.len());
/// ```
pub fn extract_folder<P: AsRef<Path>>(folder: P) -> Result<BatchOutput> {
    Pipeline::new(ExtractOptions::default())?.run_folder(folder.as_ref(), &NoProgress)
}
