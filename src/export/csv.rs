//! CSV export.

use crate::dedup::AuditEntry;
use crate::error::{Error, Result};
use crate::model::{FieldRegistry, Record};
use std::io::{self, Write};

/// Header of the duplicates log.
pub const AUDIT_HEADER: [&str; 4] = ["File Name", "CPR Number", "aut_number", "Omitted"];

/// Character encoding of a CSV file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CsvEncoding {
    /// UTF-8 without a byte order mark
    Utf8,
    /// UTF-16 little endian with a byte order mark (opens cleanly in Excel)
    #[default]
    Utf16Le,
}

/// Options for CSV output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Output encoding
    pub encoding: CsvEncoding,

    /// Quote every field, not only those that need it
    pub quote_all: bool,
}

impl CsvOptions {
    /// Create the default record options: UTF-16LE, every field quoted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for the duplicates log: UTF-8, minimal quoting.
    pub fn audit() -> Self {
        Self {
            encoding: CsvEncoding::Utf8,
            quote_all: false,
        }
    }

    /// Set the output encoding.
    pub fn with_encoding(mut self, encoding: CsvEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Enable or disable quoting of every field.
    pub fn with_quote_all(mut self, quote_all: bool) -> Self {
        self.quote_all = quote_all;
        self
    }

    fn writer<W: Write>(&self, out: W) -> Result<::csv::Writer<Encoded<W>>> {
        let style = if self.quote_all {
            ::csv::QuoteStyle::Always
        } else {
            ::csv::QuoteStyle::Necessary
        };
        Ok(::csv::WriterBuilder::new()
            .quote_style(style)
            .terminator(::csv::Terminator::CRLF)
            .from_writer(Encoded::new(out, self.encoding)?))
    }
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            encoding: CsvEncoding::Utf16Le,
            quote_all: true,
        }
    }
}

/// Re-encodes the UTF-8 stream produced by the CSV writer as UTF-16LE,
/// starting with a byte order mark.
///
/// A multi-byte character split across two writes is held back until it is
/// complete.
struct Utf16LeWriter<W: Write> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> Utf16LeWriter<W> {
    fn new(mut inner: W) -> io::Result<Self> {
        inner.write_all(&[0xFF, 0xFE])?;
        Ok(Self {
            inner,
            pending: Vec::new(),
        })
    }

    fn into_inner(self) -> Result<W> {
        if !self.pending.is_empty() {
            return Err(Error::Csv("output ends inside a UTF-8 sequence".into()));
        }
        Ok(self.inner)
    }
}

impl<W: Write> Write for Utf16LeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        let complete = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        };
        let rest = self.pending.split_off(complete);
        let text = std::str::from_utf8(&self.pending)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        self.inner.write_all(&bytes)?;
        self.pending = rest;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Output sink in the configured encoding.
enum Encoded<W: Write> {
    Utf8(W),
    Utf16Le(Utf16LeWriter<W>),
}

impl<W: Write> Encoded<W> {
    fn new(out: W, encoding: CsvEncoding) -> Result<Self> {
        Ok(match encoding {
            CsvEncoding::Utf8 => Encoded::Utf8(out),
            CsvEncoding::Utf16Le => Encoded::Utf16Le(Utf16LeWriter::new(out)?),
        })
    }
}

impl<W: Write> Write for Encoded<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Encoded::Utf8(w) => w.write(buf),
            Encoded::Utf16Le(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Encoded::Utf8(w) => w.flush(),
            Encoded::Utf16Le(w) => w.flush(),
        }
    }
}

fn finish<W: Write>(csv: ::csv::Writer<Encoded<W>>) -> Result<()> {
    let encoded = csv.into_inner().map_err(|e| Error::Csv(e.to_string()))?;
    let mut out = match encoded {
        Encoded::Utf8(w) => w,
        Encoded::Utf16Le(w) => w.into_inner()?,
    };
    out.flush()?;
    Ok(())
}

/// Write records with one column per registered field.
pub fn write_records_csv<W: Write>(
    records: &[Record],
    registry: &FieldRegistry,
    writer: W,
    options: &CsvOptions,
) -> Result<()> {
    let mut csv = options.writer(writer)?;
    csv.write_record(registry.columns())?;
    for record in records {
        let cells: Vec<_> = registry.row(record).into_iter().map(|v| v.render()).collect();
        csv.write_record(cells.iter().map(|c| c.as_bytes()))?;
    }
    log::debug!(
        "Wrote {} records x {} columns",
        records.len(),
        registry.len()
    );
    finish(csv)
}

/// Write the duplicates log.
pub fn write_audit_csv<W: Write>(
    audit: &[AuditEntry],
    writer: W,
    options: &CsvOptions,
) -> Result<()> {
    let mut csv = options.writer(writer)?;
    csv.write_record(AUDIT_HEADER)?;
    for entry in audit {
        csv.write_record([
            entry.file_name.as_str(),
            entry.primary.as_str(),
            entry.secondary.as_str(),
            entry.omitted_label(),
        ])?;
    }
    finish(csv)
}
