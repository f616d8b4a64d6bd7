use super::WizardPhase;
use crate::patient::PatientDescriptor;
use crate::progress::WorkflowProgress;
use crate::record::{DocumentationRecord, FieldKind, FieldSpec};
use crate::sections::{SectionDescriptor, SectionId};
use casenote_ids::RecordId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One field of a section as a host renders it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub name: &'static str,
    pub kind: FieldKind,
    pub min_length: Option<usize>,
    /// False when the current text is shorter than the field's guidance. Advisory only.
    pub meets_guidance: bool,
}

impl FieldSummary {
    fn new(spec: &FieldSpec, record: &DocumentationRecord) -> Self {
        Self {
            name: spec.name,
            kind: spec.kind,
            min_length: spec.min_length,
            meets_guidance: record
                .get(spec.name)
                .map_or(true, |value| spec.meets_guidance(value)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSummary {
    pub id: SectionId,
    pub title: &'static str,
    pub short_title: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub completed: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub fields: Vec<FieldSummary>,
}

impl SectionSummary {
    pub fn new(
        section: &SectionDescriptor,
        progress: &WorkflowProgress,
        record: &DocumentationRecord,
    ) -> Self {
        let entry = progress.section(section.id);
        Self {
            id: section.id,
            title: section.title,
            short_title: section.short_title,
            icon: section.icon,
            description: section.description,
            completed: entry.is_some_and(|p| p.completed),
            last_saved_at: entry.and_then(|p| p.last_saved_at),
            fields: section
                .fields
                .iter()
                .map(|spec| FieldSummary::new(spec, record))
                .collect(),
        }
    }
}

/// Visible sections with their completion, and the derived percentage.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionState {
    pub visible_sections: Vec<SectionSummary>,
    pub progress_percent: u8,
}

/// Read-only snapshot of a wizard for hosts and transports.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub record_id: Option<RecordId>,
    pub phase: WizardPhase,
    pub patient: PatientDescriptor,
    #[serde(flatten)]
    pub completion: CompletionState,
    pub current_section: Option<SectionId>,
    pub current_index: Option<usize>,
    /// Historical marker from the stored blob. The derived percentage is authoritative.
    pub completion_marker: Option<u8>,
    pub is_complete: bool,
    pub dirty: bool,
    pub delete_requested: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub record: DocumentationRecord,
}
