//! Deduplication of records that describe the same case.
//!
//! Records are grouped by a primary identifier, then by a secondary one.
//! Within a sub-group sharing both, only the record with the greatest
//! tie-break value (the file name) is kept. Every record of a multi-record
//! primary group gets an audit entry saying whether it was omitted.

use crate::model::{fields, Record};
use std::collections::HashMap;

/// How records are grouped and which one survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePolicy {
    /// Field grouping records into cases
    pub primary: String,

    /// Field splitting a case into reports
    pub secondary: String,

    /// Field ordering duplicates; the greatest value survives
    pub tiebreak: String,

    /// Treat records without a primary identifier (sentinel or absent) as
    /// distinct cases instead of grouping them together
    pub isolate_unidentified: bool,
}

impl MergePolicy {
    /// Create the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary grouping field.
    pub fn with_primary(mut self, field: impl Into<String>) -> Self {
        self.primary = field.into();
        self
    }

    /// Set the secondary grouping field.
    pub fn with_secondary(mut self, field: impl Into<String>) -> Self {
        self.secondary = field.into();
        self
    }

    /// Set the tie-break field.
    pub fn with_tiebreak(mut self, field: impl Into<String>) -> Self {
        self.tiebreak = field.into();
        self
    }

    /// Enable or disable isolation of unidentified records.
    pub fn with_isolate_unidentified(mut self, isolate: bool) -> Self {
        self.isolate_unidentified = isolate;
        self
    }
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            primary: fields::CPR_NUMBER.to_string(),
            secondary: fields::AUT_NUMBER.to_string(),
            tiebreak: fields::FILE_NAME.to_string(),
            isolate_unidentified: true,
        }
    }
}

/// One line of the duplicates log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Tie-break value (file name) of the record
    pub file_name: String,
    /// Primary identifier of the group
    pub primary: String,
    /// Secondary identifier of the sub-group
    pub secondary: String,
    /// Whether the record was dropped
    pub omitted: bool,
}

impl AuditEntry {
    /// `Yes` or `No`.
    pub fn omitted_label(&self) -> &'static str {
        if self.omitted {
            "Yes"
        } else {
            "No"
        }
    }
}

/// Surviving records and the audit log.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Records kept, grouped by primary identifier in first-seen order
    pub records: Vec<Record>,
    /// One entry per record of every multi-record group
    pub audit: Vec<AuditEntry>,
}

impl MergeOutcome {
    /// Number of records dropped.
    pub fn omitted(&self) -> usize {
        self.audit.iter().filter(|a| a.omitted).count()
    }
}

fn key(record: &Record, field: &str) -> String {
    record
        .get(field)
        .map(|v| v.render().into_owned())
        .unwrap_or_default()
}

fn unidentified(record: &Record, field: &str) -> bool {
    record
        .get(field)
        .map_or(true, |v| v.is_not_found() || v.is_absent())
}

/// Group `items` by `key_of`, keeping first-seen group order and input
/// order within groups.
fn group_by<K: Eq + std::hash::Hash>(items: Vec<usize>, key_of: impl Fn(usize) -> K) -> Vec<Vec<usize>> {
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for item in items {
        let slot = *index.entry(key_of(item)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(item);
    }
    groups
}

/// Remove duplicate reports.
pub fn merge(records: Vec<Record>, policy: &MergePolicy) -> MergeOutcome {
    let primary_groups = group_by((0..records.len()).collect(), |i| {
        let record = &records[i];
        if policy.isolate_unidentified && unidentified(record, &policy.primary) {
            (key(record, &policy.primary), Some(i))
        } else {
            (key(record, &policy.primary), None)
        }
    });

    let mut keep: Vec<usize> = Vec::with_capacity(records.len());
    let mut audit = Vec::new();
    for group in primary_groups {
        if group.len() == 1 {
            keep.extend(group);
            continue;
        }
        let primary = key(&records[group[0]], &policy.primary);
        for mut sub in group_by(group, |i| key(&records[i], &policy.secondary)) {
            let secondary = key(&records[sub[0]], &policy.secondary);
            sub.sort_by_cached_key(|&i| key(&records[i], &policy.tiebreak));
            let last = sub.len() - 1;
            for (pos, &i) in sub.iter().enumerate() {
                audit.push(AuditEntry {
                    file_name: key(&records[i], &policy.tiebreak),
                    primary: primary.clone(),
                    secondary: secondary.clone(),
                    omitted: pos != last,
                });
            }
            keep.push(sub[last]);
        }
    }

    let mut slots: Vec<Option<Record>> = records.into_iter().map(Some).collect();
    let records: Vec<Record> = keep.into_iter().filter_map(|i| slots[i].take()).collect();
    let outcome = MergeOutcome { records, audit };
    log::info!(
        "Merged duplicates: {} kept, {} omitted",
        outcome.records.len(),
        outcome.omitted()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Collision, FieldValue};

    fn record(file: &str, cpr: FieldValue, aut: &str) -> Record {
        let mut r = Record::new();
        r.set(fields::FILE_NAME, FieldValue::Text(file.into()), Collision::Overwrite);
        r.set(fields::CPR_NUMBER, cpr, Collision::Overwrite);
        r.set(fields::AUT_NUMBER, FieldValue::Text(aut.into()), Collision::Overwrite);
        r
    }

    fn cpr(s: &str) -> FieldValue {
        FieldValue::Text(s.into())
    }

    fn names(outcome: &MergeOutcome) -> Vec<&str> {
        outcome.records.iter().filter_map(Record::file_name).collect()
    }

    #[test]
    fn test_same_case_keeps_greatest_file_name() {
        let records = vec![
            record("b.docx", cpr("010190-1234"), "J1"),
            record("a.docx", cpr("010190-1234"), "J1"),
            record("c.docx", cpr("020290-1234"), "J2"),
        ];
        let outcome = merge(records, &MergePolicy::default());
        assert_eq!(names(&outcome), ["b.docx", "c.docx"]);
        assert_eq!(
            outcome.audit,
            [
                AuditEntry {
                    file_name: "a.docx".into(),
                    primary: "010190-1234".into(),
                    secondary: "J1".into(),
                    omitted: true
                },
                AuditEntry {
                    file_name: "b.docx".into(),
                    primary: "010190-1234".into(),
                    secondary: "J1".into(),
                    omitted: false
                },
            ]
        );
        assert_eq!(outcome.omitted(), 1);
    }

    #[test]
    fn test_different_case_numbers_all_kept() {
        let records = vec![
            record("a.docx", cpr("010190-1234"), "J1"),
            record("b.docx", cpr("010190-1234"), "J2"),
        ];
        let outcome = merge(records, &MergePolicy::default());
        assert_eq!(names(&outcome), ["a.docx", "b.docx"]);
        assert_eq!(outcome.audit.len(), 2);
        assert!(outcome.audit.iter().all(|a| !a.omitted));
        assert_eq!(outcome.audit[1].omitted_label(), "No");
    }

    #[test]
    fn test_singletons_have_no_audit() {
        let records = vec![
            record("a.docx", cpr("1"), "J1"),
            record("b.docx", cpr("2"), "J1"),
        ];
        let outcome = merge(records, &MergePolicy::default());
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.audit.is_empty());
    }

    #[test]
    fn test_unidentified_records_isolated_by_default() {
        let records = vec![
            record("a.docx", FieldValue::NotFound("No CPR match"), "No match"),
            record("b.docx", FieldValue::NotFound("No CPR match"), "No match"),
        ];
        let outcome = merge(records.clone(), &MergePolicy::default());
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.audit.is_empty());

        let grouped = MergePolicy::default().with_isolate_unidentified(false);
        let outcome = merge(records, &grouped);
        assert_eq!(names(&outcome), ["b.docx"]);
        assert_eq!(outcome.audit.len(), 2);
        assert_eq!(outcome.audit[0].primary, "No CPR match");
    }

    #[test]
    fn test_group_order_is_first_seen() {
        let records = vec![
            record("z.docx", cpr("2"), "J"),
            record("a.docx", cpr("1"), "J"),
            record("y.docx", cpr("2"), "J"),
        ];
        let outcome = merge(records, &MergePolicy::default());
        assert_eq!(names(&outcome), ["z.docx", "a.docx"]);
    }

    #[test]
    fn test_empty_input() {
        let outcome = merge(Vec::new(), &MergePolicy::default());
        assert!(outcome.records.is_empty());
        assert!(outcome.audit.is_empty());
    }
}
