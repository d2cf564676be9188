//! Extracted records and the batch-wide field registry.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Cow;
use std::collections::HashSet;

/// Field names shared between the assembler, the merge engine and exporters.
pub mod fields {
    /// Source file name, also the merge tie-break key.
    pub const FILE_NAME: &str = "File Name";
    /// Person identifier, primary merge key.
    pub const CPR_NUMBER: &str = "CPR Number";
    /// Case/journal number, secondary merge key.
    pub const AUT_NUMBER: &str = "aut_number";
    /// Primary or supplementary report.
    pub const PRIM_STATUS: &str = "Prim_status";
    /// Autopsy date.
    pub const AUTOPSY_DATE: &str = "Autopsy Date";
    /// Age value.
    pub const AGE: &str = "Age";
    /// Age unit.
    pub const AGE_UNIT: &str = "Age unit";
    /// Sex (`M`/`K`).
    pub const SEX: &str = "Sex";
    /// Body height in cm.
    pub const HEIGHT: &str = "Højde";
    /// Body weight.
    pub const BODY_WEIGHT: &str = "Vægt";
    /// Body weight unit.
    pub const WEIGHT_UNIT: &str = "Vægtenhed";
    /// Putrefaction sentences.
    pub const PUTREFACTION: &str = "Putrefaction";
    /// Putrefaction severity.
    pub const PUTREFACTION_LEVEL: &str = "Putre_level";
    /// Autoerotic death mentioned.
    pub const AUTOEROTIC: &str = "Autoerot";
    /// Cause-of-death sentences.
    pub const COD_TEXT: &str = "COD tekst";
    /// Discovery narrative.
    pub const FINDING_TEXT: &str = "Finde tekst";
    /// Vaccination runs.
    pub const VACCINE_TEXT: &str = "Vaccine text";
    /// Foam fungus paragraphs.
    pub const FOAM_TEXT: &str = "Skumsvamp tekst";
    /// Strip test paragraphs.
    pub const STRIP_TEXT: &str = "Strip_text";
    /// Signs of disease.
    pub const DISEASE_SIGNS: &str = "TPS";
    /// Known conditions.
    pub const KNOWN_CONDITIONS: &str = "Kendte sygdomme";
    /// Heart description.
    pub const HEART_TEXT: &str = "Hjertebeskrivelse";
    /// Aorta description.
    pub const AORTA_TEXT: &str = "Aortabeskrivelse";
    /// Carotid description.
    pub const CAROTID_TEXT: &str = "Carotider_beskrivelse";
    /// Number of lesion paragraphs.
    pub const LESION_COUNT: &str = "lesion_count";
}

/// A single extracted value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Nothing found; rendered as an empty cell.
    Absent,
    /// Named "not found" sentinel, rendered as its label.
    NotFound(&'static str),
    /// Boolean flag.
    Flag(bool),
    /// Integer measurement or count.
    Int(i64),
    /// Decimal measurement.
    Float(f64),
    /// Free text.
    Text(String),
}

impl FieldValue {
    /// Text value, or `Absent` when the text is empty.
    pub fn text_or_absent(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            FieldValue::Absent
        } else {
            FieldValue::Text(text)
        }
    }

    /// Text value, or the given sentinel when missing.
    pub fn text_or(text: Option<String>, sentinel: &'static str) -> Self {
        match text {
            Some(t) => FieldValue::Text(t),
            None => FieldValue::NotFound(sentinel),
        }
    }

    /// Check if this is a "not found" sentinel.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FieldValue::NotFound(_))
    }

    /// Check if this is `Absent`.
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Borrow the text of a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Render the value for a tabular cell.
    ///
    /// Floats always carry a fractional digit (`12.0`), flags render as
    /// `True`/`False`.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Absent => Cow::Borrowed(""),
            FieldValue::NotFound(label) => Cow::Borrowed(label),
            FieldValue::Flag(true) => Cow::Borrowed("True"),
            FieldValue::Flag(false) => Cow::Borrowed("False"),
            FieldValue::Int(n) => Cow::Owned(n.to_string()),
            FieldValue::Float(f) => Cow::Owned(format_decimal(*f)),
            FieldValue::Text(t) => Cow::Borrowed(t),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Absent)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Absent => serializer.serialize_none(),
            FieldValue::NotFound(label) => serializer.serialize_str(label),
            FieldValue::Flag(b) => serializer.serialize_bool(*b),
            FieldValue::Int(n) => serializer.serialize_i64(*n),
            FieldValue::Float(f) => serializer.serialize_f64(*f),
            FieldValue::Text(t) => serializer.serialize_str(t),
        }
    }
}

fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// What [`Record::set`] does when the field already holds a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Keep the existing value and drop the new one.
    KeepFirst,
    /// Replace the value; the field keeps its original position.
    Overwrite,
}

/// One flat row of extracted fields, in first-set order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Returns `true` if the value was stored.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue, collision: Collision) -> bool {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => match collision {
                Collision::KeepFirst => false,
                Collision::Overwrite => {
                    slot.1 = value;
                    true
                }
            },
            None => {
                self.fields.push((name, value));
                true
            }
        }
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The source file name, if set.
    pub fn file_name(&self) -> Option<&str> {
        self.get(fields::FILE_NAME).and_then(FieldValue::as_text)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Ordered set of every field name produced during a batch.
///
/// Defines the export column order; names are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl FieldRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single field name. Returns `true` if it was new.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.names.push(name.to_string());
        true
    }

    /// Register every field of a record. Returns the number of new names.
    pub fn register(&mut self, record: &Record) -> usize {
        record.names().filter(|name| self.insert(name)).count()
    }

    /// Column names in first-seen order.
    pub fn columns(&self) -> &[String] {
        &self.names
    }

    /// Check if a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Values of a record in column order, `Absent` for fields it lacks.
    pub fn row<'a>(&self, record: &'a Record) -> Vec<&'a FieldValue> {
        const MISSING: &FieldValue = &FieldValue::Absent;
        self.names
            .iter()
            .map(|name| record.get(name).unwrap_or(MISSING))
            .collect()
    }
}
