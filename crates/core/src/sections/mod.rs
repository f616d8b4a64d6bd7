//! Documentation sections.
//!
//! A section is one unit of structured note-taking (chief complaint, vital signs, ...). Each
//! section is described once by a [`SectionDescriptor`] and registered in a
//! [`SectionRegistry`]; the wizard looks sections up by [`SectionId`] and never switches on
//! individual sections itself.

mod catalog;
mod registry;
mod visibility;

pub use catalog::STROKE_CASE_FIELD;
pub use registry::SectionRegistry;
pub use visibility::{
    always, developmental_history_applies, reproductive_history_applies, visible_sections,
};

use crate::patient::PatientDescriptor;
use crate::record::{DocumentationRecord, FieldSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a documentation section.
///
/// The serialized token is persisted inside stored progress, so renaming a variant is a
/// storage migration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    ChiefComplaint,
    PresentIllness,
    PastMedicalHistory,
    Medications,
    Allergies,
    GynecologicalHistory,
    DevelopmentalHistory,
    FamilyHistory,
    SocialHistory,
    ReviewOfSystems,
    VitalSigns,
    PhysicalExamination,
    Investigations,
    Assessment,
    Plan,
}

impl SectionId {
    pub const ALL: [SectionId; 15] = [
        SectionId::ChiefComplaint,
        SectionId::PresentIllness,
        SectionId::PastMedicalHistory,
        SectionId::Medications,
        SectionId::Allergies,
        SectionId::GynecologicalHistory,
        SectionId::DevelopmentalHistory,
        SectionId::FamilyHistory,
        SectionId::SocialHistory,
        SectionId::ReviewOfSystems,
        SectionId::VitalSigns,
        SectionId::PhysicalExamination,
        SectionId::Investigations,
        SectionId::Assessment,
        SectionId::Plan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::ChiefComplaint => "chief_complaint",
            SectionId::PresentIllness => "present_illness",
            SectionId::PastMedicalHistory => "past_medical_history",
            SectionId::Medications => "medications",
            SectionId::Allergies => "allergies",
            SectionId::GynecologicalHistory => "gynecological_history",
            SectionId::DevelopmentalHistory => "developmental_history",
            SectionId::FamilyHistory => "family_history",
            SectionId::SocialHistory => "social_history",
            SectionId::ReviewOfSystems => "review_of_systems",
            SectionId::VitalSigns => "vital_signs",
            SectionId::PhysicalExamination => "physical_examination",
            SectionId::Investigations => "investigations",
            SectionId::Assessment => "assessment",
            SectionId::Plan => "plan",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = crate::WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| crate::WizardError::UnknownSection(s.to_string()))
    }
}

/// Applicability rule of a section.
///
/// Rules are plain functions of the patient and the record: no captured state and no I/O,
/// so visibility is always reproducible from those two inputs.
pub type Applicability = fn(&PatientDescriptor, &DocumentationRecord) -> bool;

/// Immutable description of one section, defined once at process start.
#[derive(Clone, Copy, Debug)]
pub struct SectionDescriptor {
    pub id: SectionId,
    pub title: &'static str,
    pub short_title: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    /// Fields this section renders and may change through its host.
    pub fields: &'static [FieldSpec],
    pub applicability: Applicability,
}

impl SectionDescriptor {
    pub fn is_applicable(&self, patient: &PatientDescriptor, record: &DocumentationRecord) -> bool {
        (self.applicability)(patient, record)
    }

    pub fn declares(&self, field: &str) -> bool {
        self.fields.iter().any(|spec| spec.name == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_id_tokens_parse_back() {
        for id in SectionId::ALL {
            assert_eq!(id.as_str().parse::<SectionId>().expect("parse"), id);
        }
    }

    #[test]
    fn section_id_serde_matches_as_str() {
        for id in SectionId::ALL {
            let json = serde_json::to_string(&id).expect("serialize");
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }

    #[test]
    fn unknown_token_is_rejected() {
        let err = "obstetrics".parse::<SectionId>().expect_err("unknown");
        assert!(matches!(err, crate::WizardError::UnknownSection(_)));
    }
}
