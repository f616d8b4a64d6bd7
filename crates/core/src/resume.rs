//! Choosing where to land when a draft is reopened.

use crate::patient::PatientDescriptor;
use crate::progress::WorkflowProgress;
use crate::record::DocumentationRecord;
use crate::sections::{visible_sections, SectionDescriptor, SectionRegistry};

/// The section to resume on, or `None` when every visible section is complete.
///
/// In order of preference:
/// 1. the stored `current_section`, if it is still visible
/// 2. the first visible section not marked complete
///
/// A stored pointer to a section that is no longer visible is ignored.
pub fn resume_section<'r>(
    progress: &WorkflowProgress,
    registry: &'r SectionRegistry,
    patient: &PatientDescriptor,
    record: &DocumentationRecord,
) -> Option<&'r SectionDescriptor> {
    let visible = visible_sections(registry, patient, record);

    if let Some(current) = progress.current_section() {
        if let Some(section) = visible.iter().find(|s| s.id == current) {
            return Some(*section);
        }
        tracing::debug!("stored section {} is no longer visible", current);
    }

    visible
        .into_iter()
        .find(|section| !progress.is_completed(section.id))
}

/// [`resume_section`], falling back to the last visible section when everything is complete.
///
/// Returns `None` only when no section is visible.
pub fn landing_section<'r>(
    progress: &WorkflowProgress,
    registry: &'r SectionRegistry,
    patient: &PatientDescriptor,
    record: &DocumentationRecord,
) -> Option<&'r SectionDescriptor> {
    resume_section(progress, registry, patient, record)
        .or_else(|| visible_sections(registry, patient, record).last().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::mark_section_complete;
    use crate::sections::{always, reproductive_history_applies, SectionId};
    use chrono::Utc;

    fn section(id: SectionId, applicability: crate::sections::Applicability) -> SectionDescriptor {
        SectionDescriptor {
            id,
            title: id.as_str(),
            short_title: id.as_str(),
            icon: "",
            description: "",
            fields: &[],
            applicability,
        }
    }

    fn registry() -> SectionRegistry {
        SectionRegistry::new(vec![
            section(SectionId::ChiefComplaint, always),
            section(SectionId::GynecologicalHistory, reproductive_history_applies),
            section(SectionId::Plan, always),
        ])
        .expect("valid registry")
    }

    fn patient(gender: &str) -> PatientDescriptor {
        PatientDescriptor::new("Sam", "Roe", Some(gender.into()), Some(30))
    }

    fn complete(progress: &WorkflowProgress, id: SectionId) -> WorkflowProgress {
        mark_section_complete(progress, id, true, progress.current_section(), Utc::now())
    }

    #[test]
    fn resumes_on_stored_section_when_visible() {
        let registry = registry();
        let record = registry.blank_record();
        let mut progress = complete(&WorkflowProgress::new(), SectionId::ChiefComplaint);
        progress.set_current_section(Some(SectionId::ChiefComplaint));

        let landed = resume_section(&progress, &registry, &patient("Female"), &record);
        assert_eq!(landed.map(|s| s.id), Some(SectionId::ChiefComplaint));
    }

    #[test]
    fn stale_pointer_falls_back_to_first_incomplete() {
        let registry = registry();
        let record = registry.blank_record();
        let mut progress = WorkflowProgress::new();
        progress.set_current_section(Some(SectionId::GynecologicalHistory));

        let landed = resume_section(&progress, &registry, &patient("Male"), &record);
        assert_eq!(landed.map(|s| s.id), Some(SectionId::ChiefComplaint));

        let progress = complete(&progress, SectionId::ChiefComplaint);
        let landed = resume_section(&progress, &registry, &patient("Male"), &record);
        assert_eq!(landed.map(|s| s.id), Some(SectionId::Plan));
    }

    #[test]
    fn all_complete_returns_none_and_landing_is_last_visible() {
        let registry = registry();
        let record = registry.blank_record();
        let progress = complete(&WorkflowProgress::new(), SectionId::ChiefComplaint);
        let progress = complete(&progress, SectionId::Plan);

        assert!(resume_section(&progress, &registry, &patient("Male"), &record).is_none());
        let landed = landing_section(&progress, &registry, &patient("Male"), &record);
        assert_eq!(landed.map(|s| s.id), Some(SectionId::Plan));
    }

    #[test]
    fn empty_registry_lands_nowhere() {
        let registry = SectionRegistry::new(Vec::new()).expect("empty");
        let record = registry.blank_record();
        assert!(landing_section(&WorkflowProgress::new(), &registry, &patient("F"), &record)
            .is_none());
    }
}
