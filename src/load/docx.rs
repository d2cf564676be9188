//! DOCX loader: reads `word/document.xml` from the zip container.
//!
//! Body paragraphs become [`Document::paragraphs`]; top-level tables become
//! table grids whose cells hold their paragraphs joined by `\n`. Text boxes
//! and tables nested inside table cells are not read.

use super::DocumentLoader;
use crate::detect::is_docx_bytes;
use crate::error::{Error, Result};
use crate::model::{Document, Table, TableCell, TableRow, TextRun};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

/// Loader for Office Open XML word-processing documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxLoader;

impl DocxLoader {
    /// Create a new docx loader.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for DocxLoader {
    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<Document> {
        if !is_docx_bytes(bytes) {
            return Err(Error::UnknownFormat);
        }
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut xml = String::new();
        archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
        parse_document_xml(name, &xml)
    }
}

#[derive(Default)]
struct TableBuilder {
    table: Table,
    row: Vec<TableCell>,
    cell: Vec<String>,
}

#[derive(Default)]
struct BodyBuilder {
    doc: Document,
    table_depth: usize,
    table: Option<TableBuilder>,
    text_box_depth: usize,
    paragraph: Option<Vec<TextRun>>,
    run: Option<String>,
    in_text: bool,
}

impl BodyBuilder {
    fn new(name: &str) -> Self {
        Self {
            doc: Document::new(name),
            ..Self::default()
        }
    }

    fn start(&mut self, tag: &[u8]) {
        if tag == b"txbxContent" {
            self.text_box_depth += 1;
        }
        if self.text_box_depth > 0 {
            return;
        }
        match tag {
            b"tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table = Some(TableBuilder::default());
                }
            }
            b"p" => self.paragraph = Some(Vec::new()),
            b"r" => self.run = Some(String::new()),
            b"t" => self.in_text = true,
            b"tc" => self.start_cell(),
            b"tab" | b"br" | b"cr" => self.empty(tag),
            _ => {}
        }
    }

    fn empty(&mut self, tag: &[u8]) {
        if self.text_box_depth > 0 {
            return;
        }
        match tag {
            b"p" => {
                self.paragraph = Some(Vec::new());
                self.end_paragraph();
            }
            b"tab" => self.push_char('\t'),
            b"br" | b"cr" => self.push_char('\n'),
            b"tc" => {
                self.start_cell();
                self.end_cell();
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: &[u8]) {
        if self.text_box_depth > 0 {
            if tag == b"txbxContent" {
                self.text_box_depth -= 1;
            }
            return;
        }
        match tag {
            b"t" => self.in_text = false,
            b"r" => {
                if let (Some(text), Some(runs)) = (self.run.take(), self.paragraph.as_mut()) {
                    if !text.is_empty() {
                        runs.push(TextRun::new(text));
                    }
                }
            }
            b"p" => self.end_paragraph(),
            b"tc" => self.end_cell(),
            b"tr" => {
                if self.table_depth == 1 {
                    if let Some(table) = self.table.as_mut() {
                        let cells = std::mem::take(&mut table.row);
                        table.table.add_row(TableRow::new(cells));
                    }
                }
            }
            b"tbl" => {
                if self.table_depth == 1 {
                    if let Some(table) = self.table.take() {
                        self.doc.add_table(table.table);
                    }
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.text_box_depth == 0 && self.in_text {
            if let Some(run) = self.run.as_mut() {
                run.push_str(text);
            }
        }
    }

    fn push_char(&mut self, c: char) {
        if let Some(run) = self.run.as_mut() {
            run.push(c);
        }
    }

    fn start_cell(&mut self) {
        if self.table_depth == 1 {
            if let Some(table) = self.table.as_mut() {
                table.cell.clear();
            }
        }
    }

    fn end_cell(&mut self) {
        if self.table_depth == 1 {
            if let Some(table) = self.table.as_mut() {
                let paragraphs = std::mem::take(&mut table.cell);
                table.row.push(TableCell::from_paragraphs(&paragraphs));
            }
        }
    }

    fn end_paragraph(&mut self) {
        let Some(runs) = self.paragraph.take() else {
            return;
        };
        match self.table_depth {
            0 => self.doc.push_runs(runs),
            1 => {
                if let Some(table) = self.table.as_mut() {
                    table.cell.push(runs.into_iter().map(|r| r.text).collect());
                }
            }
            _ => {}
        }
    }
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Build a document from the markup of `word/document.xml`.
pub fn parse_document_xml(name: &str, xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    let mut body = BodyBuilder::new(name);

    loop {
        match reader.read_event()? {
            Event::Start(e) => body.start(e.local_name().as_ref()),
            Event::Empty(e) => body.empty(e.local_name().as_ref()),
            Event::End(e) => body.end(e.local_name().as_ref()),
            Event::Text(t) => {
                let text = t.decode().map_err(|e| Error::Xml(e.to_string()))?;
                body.text(&text);
            }
            Event::GeneralRef(r) => {
                let entity = r.decode().map_err(|e| Error::Xml(e.to_string()))?;
                match resolve_entity(&entity) {
                    Some(c) => body.text(c.encode_utf8(&mut [0; 4])),
                    None => log::debug!("Unknown entity &{}; in {}", entity, name),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    log::debug!(
        "Parsed {}: {} paragraphs, {} tables",
        name,
        body.doc.paragraph_count(),
        body.doc.tables().len()
    );
    Ok(body.doc)
}
