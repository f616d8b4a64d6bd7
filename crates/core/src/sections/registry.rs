//! Ordered catalog of documentation sections.

use super::catalog::standard_sections;
use super::{SectionDescriptor, SectionId};
use crate::error::{WizardError, WizardResult};
use crate::field_mapper::FieldMapper;
use crate::record::{DocumentationRecord, FieldSpec, RECORD_FIELDS};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

static STANDARD: LazyLock<Arc<SectionRegistry>> = LazyLock::new(|| {
    Arc::new(SectionRegistry {
        sections: standard_sections(),
    })
});

/// Static, ordered catalog of sections.
///
/// Registry order is presentation order. A registry never changes after construction.
#[derive(Debug)]
pub struct SectionRegistry {
    sections: Vec<SectionDescriptor>,
}

impl SectionRegistry {
    /// Builds a registry from `sections`, in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::InvalidRegistry`] if a section id is registered twice, or if two
    /// fields (including record-level fields) share an internal name or a persisted column.
    pub fn new(sections: Vec<SectionDescriptor>) -> WizardResult<Self> {
        let mut ids = HashSet::new();
        for section in &sections {
            if !ids.insert(section.id) {
                return Err(WizardError::InvalidRegistry(format!(
                    "section {} is registered twice",
                    section.id
                )));
            }
        }

        let mut names = HashSet::new();
        let mut columns = HashSet::new();
        let all_fields = sections
            .iter()
            .flat_map(|s| s.fields.iter())
            .chain(RECORD_FIELDS.iter());
        for spec in all_fields {
            if !names.insert(spec.name) {
                return Err(WizardError::InvalidRegistry(format!(
                    "field {} is declared twice",
                    spec.name
                )));
            }
            if !columns.insert(spec.column) {
                return Err(WizardError::InvalidRegistry(format!(
                    "column {} is mapped twice",
                    spec.column
                )));
            }
        }

        Ok(Self { sections })
    }

    /// The standard clinic encounter catalog.
    pub fn standard() -> Arc<Self> {
        STANDARD.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionDescriptor> {
        self.sections.iter()
    }

    pub fn get(&self, id: SectionId) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SectionId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Every declared field: section fields in registry order, then record-level fields.
    pub fn declared_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.sections
            .iter()
            .flat_map(|s| s.fields.iter())
            .chain(RECORD_FIELDS.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.declared_fields().find(|spec| spec.name == name)
    }

    /// The section declaring `name`, with its field spec. Record-level fields have no section.
    pub fn section_field(&self, name: &str) -> Option<(&SectionDescriptor, &FieldSpec)> {
        self.sections.iter().find_map(|section| {
            section
                .fields
                .iter()
                .find(|spec| spec.name == name)
                .map(|spec| (section, spec))
        })
    }

    /// A record with every declared field at its empty representation.
    pub fn blank_record(&self) -> DocumentationRecord {
        DocumentationRecord::blank(self.declared_fields())
    }

    /// Field mapper over every declared field.
    pub fn field_mapper(&self) -> FieldMapper {
        FieldMapper::new(self.declared_fields().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::IS_COMPLETE_FIELD;
    use crate::sections::always;

    const A_FIELDS: &[FieldSpec] = &[FieldSpec::text("a", "col_a")];
    const CLASHING_NAME: &[FieldSpec] = &[FieldSpec::text("a", "col_b")];
    const CLASHING_COLUMN: &[FieldSpec] = &[FieldSpec::text("b", "col_a")];

    fn section(id: SectionId, fields: &'static [FieldSpec]) -> SectionDescriptor {
        SectionDescriptor {
            id,
            title: "T",
            short_title: "T",
            icon: "",
            description: "",
            fields,
            applicability: always,
        }
    }

    #[test]
    fn standard_catalog_is_valid_and_complete() {
        let registry =
            SectionRegistry::new(standard_sections()).expect("standard catalog should validate");
        let ids: Vec<SectionId> = registry.iter().map(|s| s.id).collect();
        assert_eq!(ids, SectionId::ALL.to_vec());
        assert_eq!(SectionRegistry::standard().len(), SectionId::ALL.len());
    }

    #[test]
    fn rejects_duplicate_section_ids() {
        let err = SectionRegistry::new(vec![
            section(SectionId::Plan, &[]),
            section(SectionId::Plan, &[]),
        ])
        .expect_err("duplicate ids");
        assert!(matches!(err, WizardError::InvalidRegistry(_)));
    }

    #[test]
    fn rejects_duplicate_field_names_and_columns() {
        assert!(SectionRegistry::new(vec![
            section(SectionId::ChiefComplaint, A_FIELDS),
            section(SectionId::Plan, CLASHING_NAME),
        ])
        .is_err());
        assert!(SectionRegistry::new(vec![
            section(SectionId::ChiefComplaint, A_FIELDS),
            section(SectionId::Plan, CLASHING_COLUMN),
        ])
        .is_err());
    }

    #[test]
    fn declared_fields_include_record_level_flag() {
        let registry =
            SectionRegistry::new(vec![section(SectionId::ChiefComplaint, A_FIELDS)]).expect("ok");
        let names: Vec<&str> = registry.declared_fields().map(|f| f.name).collect();
        assert_eq!(names, vec!["a", IS_COMPLETE_FIELD]);
        assert_eq!(registry.blank_record().len(), 2);
    }

    #[test]
    fn empty_registry_is_allowed() {
        let registry = SectionRegistry::new(Vec::new()).expect("empty is valid");
        assert!(registry.is_empty());
        assert!(registry.get(SectionId::Plan).is_none());
    }
}
