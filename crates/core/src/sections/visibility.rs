//! Section applicability rules and the visible-section resolver.

use super::catalog::STROKE_CASE_FIELD;
use super::{SectionDescriptor, SectionRegistry};
use crate::patient::{PatientDescriptor, RecordedSex};
use crate::record::DocumentationRecord;

/// Applies to every encounter.
pub fn always(_patient: &PatientDescriptor, _record: &DocumentationRecord) -> bool {
    true
}

/// Reproductive history is only clinically relevant for female patients.
pub fn reproductive_history_applies(
    patient: &PatientDescriptor,
    _record: &DocumentationRecord,
) -> bool {
    patient.recorded_sex() == RecordedSex::Female
}

/// Developmental history applies to pediatric patients and to stroke-flagged records, where
/// pre-morbid function has to be documented.
pub fn developmental_history_applies(
    patient: &PatientDescriptor,
    record: &DocumentationRecord,
) -> bool {
    patient.is_pediatric() || record.flag(STROKE_CASE_FIELD)
}

/// The sections that apply to this patient and record, in registry order.
pub fn visible_sections<'r>(
    registry: &'r SectionRegistry,
    patient: &PatientDescriptor,
    record: &DocumentationRecord,
) -> Vec<&'r SectionDescriptor> {
    registry
        .iter()
        .filter(|section| section.is_applicable(patient, record))
        .collect()
}
