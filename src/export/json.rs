//! JSON export of records.

use crate::error::Result;
use crate::model::{FieldRegistry, Record};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// A record padded to every registered column.
struct PaddedRow<'a> {
    registry: &'a FieldRegistry,
    record: &'a Record,
}

impl Serialize for PaddedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let columns = self.registry.columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for (name, value) in columns.iter().zip(self.registry.row(self.record)) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Convert records to a JSON array of objects keyed in registry order.
pub fn to_json(records: &[Record], registry: &FieldRegistry, format: JsonFormat) -> Result<String> {
    let rows: Vec<PaddedRow<'_>> = records
        .iter()
        .map(|record| PaddedRow { registry, record })
        .collect();

    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&rows)?,
        JsonFormat::Compact => serde_json::to_string(&rows)?,
    };
    Ok(json)
}
