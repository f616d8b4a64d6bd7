//! Translation between the engine's record and the persisted record shape.
//!
//! The persistence layer stores one column per field under its own naming. The mapper owns
//! the bidirectional name table and normalises values on the way out:
//!
//! - text is trimmed, and blank-after-trim text is written as an explicit `null`
//! - flags are always written as booleans
//! - every mapped column is written, never omitted
//!
//! On the way in, absent or `null` columns become the empty representation of the field's
//! kind, and values of the wrong JSON shape are coerced rather than rejected.

use crate::record::{DocumentationRecord, FieldKind, FieldSpec, FieldValue};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// The persisted shape of a record: column name to JSON value.
pub type ExternalRecord = Map<String, Value>;

/// Bidirectional field-name table plus value normalisation.
#[derive(Clone, Debug)]
pub struct FieldMapper {
    specs: Vec<FieldSpec>,
    by_name: HashMap<&'static str, usize>,
    by_column: HashMap<&'static str, usize>,
}

impl FieldMapper {
    pub fn new(specs: impl IntoIterator<Item = FieldSpec>) -> Self {
        let specs: Vec<FieldSpec> = specs.into_iter().collect();
        let by_name = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name, i))
            .collect();
        let by_column = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.column, i))
            .collect();

        Self {
            specs,
            by_name,
            by_column,
        }
    }

    pub fn column_for(&self, name: &str) -> Option<&'static str> {
        self.by_name.get(name).map(|&i| self.specs[i].column)
    }

    pub fn name_for(&self, column: &str) -> Option<&'static str> {
        self.by_column.get(column).map(|&i| self.specs[i].name)
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    /// Engine record to persisted record.
    ///
    /// Fields the record holds that are not in the table are not written.
    pub fn to_external(&self, record: &DocumentationRecord) -> ExternalRecord {
        let mut external = ExternalRecord::new();
        for spec in &self.specs {
            let value = record.get(spec.name);
            external.insert(spec.column.to_string(), write_value(spec.kind, value));
        }

        for (name, _) in record.iter() {
            if !self.by_name.contains_key(name) {
                tracing::debug!("field {} has no persisted column and was not written", name);
            }
        }

        external
    }

    /// Persisted record to engine record, with every mapped field present.
    pub fn to_internal(&self, external: &ExternalRecord) -> DocumentationRecord {
        let mut record = DocumentationRecord::default();
        for spec in &self.specs {
            record.set(spec.name, read_value(spec.kind, external.get(spec.column)));
        }
        record
    }
}

/// Normalise a field value for writing.
pub fn write_value(kind: FieldKind, value: Option<&FieldValue>) -> Value {
    match (kind, value) {
        (FieldKind::Flag, Some(FieldValue::Flag(flag))) => Value::Bool(*flag),
        (FieldKind::Flag, _) => Value::Bool(false),
        (_, Some(FieldValue::Number(n))) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        (_, Some(FieldValue::Text(text))) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::String(trimmed.to_string())
            }
        }
        (_, Some(FieldValue::Flag(flag))) => Value::String(flag.to_string()),
        (_, None) => Value::Null,
    }
}

/// Default a persisted value for reading. Never fails.
pub fn read_value(kind: FieldKind, value: Option<&Value>) -> FieldValue {
    match kind {
        FieldKind::Flag => FieldValue::Flag(match value {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(s)) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "yes" | "1"
            ),
            _ => false,
        }),
        FieldKind::Numeric => match value {
            Some(Value::Number(n)) => n
                .as_f64()
                .map(FieldValue::Number)
                .unwrap_or_else(|| FieldValue::empty(kind)),
            Some(Value::String(s)) => FieldValue::Text(s.trim().to_string()),
            _ => FieldValue::empty(kind),
        },
        FieldKind::Text => match value {
            Some(Value::String(s)) => FieldValue::Text(s.trim().to_string()),
            Some(Value::Number(n)) => FieldValue::Text(n.to_string()),
            Some(Value::Bool(b)) => FieldValue::Text(b.to_string()),
            _ => FieldValue::empty(kind),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::SectionRegistry;
    use serde_json::json;

    const SPECS: &[FieldSpec] = &[
        FieldSpec::text("chiefComplaint", "chief_complaint"),
        FieldSpec::numeric("heartRate", "heart_rate"),
        FieldSpec::flag("strokeCase", "is_stroke_case"),
    ];

    fn mapper() -> FieldMapper {
        FieldMapper::new(SPECS.iter().copied())
    }

    #[test]
    fn names_map_both_ways() {
        let mapper = mapper();
        assert_eq!(mapper.column_for("heartRate"), Some("heart_rate"));
        assert_eq!(mapper.name_for("is_stroke_case"), Some("strokeCase"));
        assert_eq!(mapper.column_for("nope"), None);
    }

    #[test]
    fn write_trims_and_marks_blank_text_as_null() {
        let mut record = DocumentationRecord::blank(SPECS);
        record.set("chiefComplaint", FieldValue::Text("  chest pain \n".into()));
        let external = mapper().to_external(&record);
        assert_eq!(external["chief_complaint"], json!("chest pain"));
        assert_eq!(external["heart_rate"], Value::Null);
        assert_eq!(external["is_stroke_case"], json!(false));

        record.set("chiefComplaint", FieldValue::Text("   ".into()));
        let external = mapper().to_external(&record);
        assert_eq!(external["chief_complaint"], Value::Null);
    }

    #[test]
    fn write_emits_every_column_even_when_record_is_empty() {
        let external = mapper().to_external(&DocumentationRecord::default());
        assert_eq!(external.len(), SPECS.len());
        assert_eq!(external["is_stroke_case"], json!(false));
    }

    #[test]
    fn read_defaults_absent_and_null_by_kind() {
        let mut external = ExternalRecord::new();
        external.insert("chief_complaint".into(), Value::Null);
        let record = mapper().to_internal(&external);
        assert_eq!(record.get("chiefComplaint"), Some(&FieldValue::Text(String::new())));
        assert_eq!(record.get("heartRate"), Some(&FieldValue::Text(String::new())));
        assert_eq!(record.get("strokeCase"), Some(&FieldValue::Flag(false)));
    }

    #[test]
    fn read_coerces_wrong_shapes() {
        let external = json!({
            "chief_complaint": 42,
            "heart_rate": " 88 ",
            "is_stroke_case": "Yes",
        });
        let Value::Object(external) = external else {
            unreachable!()
        };
        let record = mapper().to_internal(&external);
        assert_eq!(record.text("chiefComplaint"), "42");
        assert_eq!(record.text("heartRate"), "88");
        assert!(record.flag("strokeCase"));
    }

    #[test]
    fn round_trip_preserves_empty_text_and_false_flags() {
        let registry = SectionRegistry::standard();
        let mapper = registry.field_mapper();

        let blank = registry.blank_record();
        assert_eq!(mapper.to_internal(&mapper.to_external(&blank)), blank);

        let mut filled = registry.blank_record();
        filled.set("chiefComplaint", FieldValue::Text("Fever for three days".into()));
        filled.set("heartRate", FieldValue::Number(96.0));
        filled.set("bloodPressure", FieldValue::Text("120/80".into()));
        filled.set("temperature", FieldValue::Text("38.2".into()));
        filled.set("strokeCase", FieldValue::Flag(true));
        filled.set("noKnownAllergies", FieldValue::Flag(false));
        assert_eq!(mapper.to_internal(&mapper.to_external(&filled)), filled);
    }
}
