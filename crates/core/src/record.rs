//! The in-progress documentation record.
//!
//! A [`DocumentationRecord`] is a flat map from internal field name to [`FieldValue`]. Every
//! field declared by a section is always present, holding either a meaningful value or the
//! empty representation for its [`FieldKind`], so hosts can bind controlled inputs without
//! special-casing missing keys.

use crate::constants::IS_COMPLETE_FIELD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shape of a declared field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// A measurement. Held as a number, or as the text the clinician typed until it is one.
    Numeric,
    /// A yes/no attestation.
    Flag,
}

/// A single field value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// The empty representation for a field of `kind`.
    pub fn empty(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text | FieldKind::Numeric => FieldValue::Text(String::new()),
            FieldKind::Flag => FieldValue::Flag(false),
        }
    }

    /// True for blank text and `false` flags. Numbers are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Flag(flag) => !flag,
            FieldValue::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }
}

impl FieldKind {
    /// Whether a value of this shape may be stored in a field of this kind.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Text, FieldValue::Text(_))
                | (FieldKind::Numeric, FieldValue::Text(_))
                | (FieldKind::Numeric, FieldValue::Number(_))
                | (FieldKind::Flag, FieldValue::Flag(_))
        )
    }
}

/// Declaration of one documentation field.
///
/// `name` is the engine's internal name, `column` is the persisted record's field name.
/// `min_length` is presentation guidance only; it never gates completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    pub min_length: Option<usize>,
}

impl FieldSpec {
    pub const fn text(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Text,
            min_length: None,
        }
    }

    pub const fn numeric(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Numeric,
            min_length: None,
        }
    }

    pub const fn flag(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Flag,
            min_length: None,
        }
    }

    pub const fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    /// Whether `value` meets this field's minimum-length guidance.
    pub fn meets_guidance(&self, value: &FieldValue) -> bool {
        match (self.min_length, value) {
            (Some(min), FieldValue::Text(text)) => text.trim().chars().count() >= min,
            _ => true,
        }
    }
}

/// Fields that belong to the record itself rather than to any section.
pub const RECORD_FIELDS: &[FieldSpec] = &[FieldSpec::flag(
    IS_COMPLETE_FIELD,
    crate::constants::IS_COMPLETE_COLUMN,
)];

/// The mutable draft being authored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentationRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl DocumentationRecord {
    /// A record holding the empty representation of every field in `specs`.
    pub fn blank<'a>(specs: impl IntoIterator<Item = &'a FieldSpec>) -> Self {
        let mut record = Self::default();
        record.fill_missing(specs);
        record
    }

    /// Inserts the empty representation for any field in `specs` that is absent.
    pub fn fill_missing<'a>(&mut self, specs: impl IntoIterator<Item = &'a FieldSpec>) {
        for spec in specs {
            self.fields
                .entry(spec.name.to_string())
                .or_insert_with(|| FieldValue::empty(spec.kind));
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Sets a field, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(name.into(), value)
    }

    /// Text content of a field, or `""` when absent or not text.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).and_then(FieldValue::as_text).unwrap_or("")
    }

    /// Flag value of a field, or `false` when absent or not a flag.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(FieldValue::as_flag).unwrap_or(false)
    }

    pub fn is_complete(&self) -> bool {
        self.flag(IS_COMPLETE_FIELD)
    }

    pub fn set_complete(&mut self, complete: bool) {
        self.set(IS_COMPLETE_FIELD, FieldValue::Flag(complete));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[FieldSpec] = &[
        FieldSpec::text("chiefComplaint", "chief_complaint").with_min_length(10),
        FieldSpec::numeric("heartRate", "heart_rate"),
        FieldSpec::flag("strokeCase", "is_stroke_case"),
    ];

    #[test]
    fn blank_record_has_every_declared_field() {
        let record = DocumentationRecord::blank(SPECS);
        assert_eq!(record.len(), 3);
        assert_eq!(
            record.get("chiefComplaint"),
            Some(&FieldValue::Text(String::new()))
        );
        assert_eq!(record.get("heartRate"), Some(&FieldValue::Text(String::new())));
        assert_eq!(record.get("strokeCase"), Some(&FieldValue::Flag(false)));
    }

    #[test]
    fn fill_missing_keeps_existing_values() {
        let mut record = DocumentationRecord::default();
        record.set("chiefComplaint", FieldValue::Text("Headache".into()));
        record.fill_missing(SPECS);
        assert_eq!(record.text("chiefComplaint"), "Headache");
        assert!(!record.flag("strokeCase"));
    }

    #[test]
    fn kind_accepts_matching_shapes_only() {
        assert!(FieldKind::Text.accepts(&FieldValue::Text("x".into())));
        assert!(!FieldKind::Text.accepts(&FieldValue::Flag(true)));
        assert!(FieldKind::Numeric.accepts(&FieldValue::Number(72.0)));
        assert!(FieldKind::Numeric.accepts(&FieldValue::Text("72".into())));
        assert!(!FieldKind::Flag.accepts(&FieldValue::Text("true".into())));
    }

    #[test]
    fn guidance_is_a_hint_on_trimmed_length() {
        let spec = SPECS[0];
        assert!(!spec.meets_guidance(&FieldValue::Text("  short  ".into())));
        assert!(spec.meets_guidance(&FieldValue::Text("persistent headache".into())));
        assert!(SPECS[1].meets_guidance(&FieldValue::Text(String::new())));
    }

    #[test]
    fn complete_flag_round_trips() {
        let mut record = DocumentationRecord::blank(RECORD_FIELDS);
        assert!(!record.is_complete());
        record.set_complete(true);
        assert!(record.is_complete());
    }

    #[test]
    fn untagged_values_serialize_as_plain_json() {
        let mut record = DocumentationRecord::blank(SPECS);
        record.set("heartRate", FieldValue::Number(72.0));
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["heartRate"], serde_json::json!(72.0));
        assert_eq!(json["strokeCase"], serde_json::json!(false));
        assert_eq!(json["chiefComplaint"], serde_json::json!(""));
    }
}
