//! Tabular and JSON export of records and the duplicates log.
//!
//! Column order always follows the [`FieldRegistry`](crate::model::FieldRegistry);
//! records missing a column get an empty cell (`null` in JSON).

mod csv;
mod json;

pub use self::csv::{write_audit_csv, write_records_csv, CsvEncoding, CsvOptions, AUDIT_HEADER};
pub use self::json::{to_json, JsonFormat};
