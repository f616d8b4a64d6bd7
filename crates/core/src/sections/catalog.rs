//! The standard clinic encounter catalog, in presentation order.

use super::visibility::{always, developmental_history_applies, reproductive_history_applies};
use super::{SectionDescriptor, SectionId};
use crate::record::FieldSpec;

/// Internal name of the flag that marks a pre-morbid/stroke presentation.
pub const STROKE_CASE_FIELD: &str = "strokeCase";

const CHIEF_COMPLAINT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("chiefComplaint", "chief_complaint").with_min_length(10),
    FieldSpec::text("complaintDuration", "complaint_duration"),
    FieldSpec::flag(STROKE_CASE_FIELD, "is_stroke_case"),
];

const PRESENT_ILLNESS_FIELDS: &[FieldSpec] = &[FieldSpec::text(
    "presentIllness",
    "history_of_present_illness",
)
.with_min_length(20)];

const PAST_MEDICAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("pastMedicalHistory", "past_medical_history"),
    FieldSpec::text("previousSurgeries", "previous_surgeries"),
];

const MEDICATION_FIELDS: &[FieldSpec] =
    &[FieldSpec::text("currentMedications", "current_medications")];

const ALLERGY_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("allergies", "allergies"),
    FieldSpec::flag("noKnownAllergies", "nkda"),
];

const GYNECOLOGICAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("menstrualHistory", "menstrual_history"),
    FieldSpec::text("obstetricHistory", "obstetric_history"),
    FieldSpec::text("lastMenstrualPeriod", "lmp"),
    FieldSpec::flag("isPregnant", "is_pregnant"),
];

const DEVELOPMENTAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("birthHistory", "birth_history"),
    FieldSpec::text("developmentalMilestones", "developmental_milestones"),
    FieldSpec::text("premorbidFunction", "premorbid_function"),
];

const FAMILY_FIELDS: &[FieldSpec] = &[FieldSpec::text("familyHistory", "family_history")];

const SOCIAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("smokingStatus", "smoking_status"),
    FieldSpec::text("alcoholUse", "alcohol_use"),
    FieldSpec::text("occupation", "occupation"),
];

const REVIEW_OF_SYSTEMS_FIELDS: &[FieldSpec] =
    &[FieldSpec::text("reviewOfSystems", "review_of_systems")];

const VITAL_SIGN_FIELDS: &[FieldSpec] = &[
    FieldSpec::numeric("temperature", "temperature_c"),
    FieldSpec::numeric("heartRate", "heart_rate"),
    FieldSpec::text("bloodPressure", "blood_pressure"),
    FieldSpec::numeric("respiratoryRate", "respiratory_rate"),
    FieldSpec::numeric("oxygenSaturation", "spo2"),
    FieldSpec::numeric("weight", "weight_kg"),
    FieldSpec::numeric("height", "height_cm"),
];

const EXAMINATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("generalExamination", "general_examination"),
    FieldSpec::text("systemicExamination", "systemic_examination"),
];

const INVESTIGATION_FIELDS: &[FieldSpec] =
    &[FieldSpec::text("investigationNotes", "investigation_notes")];

const ASSESSMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("diagnosis", "diagnosis").with_min_length(3),
    FieldSpec::text("differentialDiagnosis", "differential_diagnosis"),
];

const PLAN_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("treatmentPlan", "treatment_plan").with_min_length(10),
    FieldSpec::text("followUp", "follow_up"),
    FieldSpec::text("referral", "referral"),
];

pub(crate) fn standard_sections() -> Vec<SectionDescriptor> {
    vec![
        SectionDescriptor {
            id: SectionId::ChiefComplaint,
            title: "Chief Complaint",
            short_title: "Complaint",
            icon: "message-circle",
            description: "The main reason for the visit, in the patient's words.",
            fields: CHIEF_COMPLAINT_FIELDS,
            applicability: always,
        },
        SectionDescriptor {
            id: SectionId::PresentIllness,
            title: "History of Present Illness",
            short_title: "HPI",
            icon: "file-text",
            description: "Onset, course and character of the current problem.",
            fields: PRESENT_ILLNESS_FIELDS,
            applicability: always,
        },
        SectionDescriptor {
            id: SectionId::PastMedicalHistory,
            title: "Past Medical History",
            short_title: "PMH",
            icon: "history",
            description: "Chronic conditions, previous admissions and surgeries.",
            fields: PAST_MEDICAL_FIELDS,
            applicability: always,
        },
        SectionDescriptor {
            id: SectionId::Medications,
            title: "Medications",
            short_title: "Meds",
            icon: "pill",
            description: "Current prescriptions and over-the-counter medicines.",
            fields: MEDICATION_FIELDS,
            applicability: always,
        },
        SectionDescriptor {
            id: SectionId::Allergies,
            title: "Allergies",
            short_title: "Allergies",
            icon: "alert-triangle",
            description: "Known drug, food and environmental allergies.",
            fields: ALLERGY_FIELDS,
            applicability: always,
        },
        SectionDescriptor {
            id: SectionId::GynecologicalHistory,
            title: "Gynecological & Obstetric History",
            short_title: "Gyne",
            icon: "baby",
            description: "Menstrual, obstetric and pregnancy history.",
            fields: GYNECOLOGICAL_FIELDS,
            applicability: reproductive_history_applies,
        },
        SectionDescriptor {
            id: SectionId::DevelopmentalHistory,
            title: "Developmental History",
            short_title: "Development",
            icon: "trending-up",
            description: "Birth history, milestones and pre-morbid function.",
            fields: DEVELOPMENTAL_FIELDS,
            applicability: developmental_history_applies,
        },
        SectionDescriptor {
            id: SectionId::FamilyHistory,
            title: "Family History",
            short_title: "Family",
            icon: "users",
            description: "Conditions running in first-degree relatives.",
            fields: FAMILY_FIELDS,
            applicability: always,
        },
        SectionDescriptor {
            id: SectionId::SocialHistory,
            title: "Social History",
            short_title: "Social",
            icon: "home",
            description: "Smoking, alcohol, occupation and living situation.",
            fields: SOCIAL_FIELDS,
            applicability: always,
        },
        SectionDescriptor {
            id: SectionId::ReviewOfSystems,
            title: "Review of Systems",
            short_title: "ROS",
            icon: "list-checks",
            description: "Systematic screen for symptoms outside the presenting complaint.",
            fields: REVIEW_OF_SYSTEMS_FIELDS,
            applicability: always,
        },
        SectionDescriptor {
            id: SectionId::VitalSigns,
            title: "Vital Signs",
            short_title: "Vitals",
            icon: "heart-pulse",
            description: "Temperature, heart rate, blood pressure and anthropometrics.",
            fields: VITAL_SIGN_FIELDS,
            applicability: always,
        },
        SectionDescriptor {
            id: SectionId::PhysicalExamination,
            title: "Physical Examination",
            short_title: "Exam",
            icon: "stethoscope",
            description: "General and system-specific examination findings.",
            fields: EXAMINATION_FIELDS,
            applicability: always,
        },
        SectionDescriptor {
            id: SectionId::Investigations,
            title: "Investigations",
            short_title: "Labs",
            icon: "flask-conical",
            description: "Laboratory and imaging requests and results.",
            fields: INVESTIGATION_FIELDS,
            applicability: always,
        },
        SectionDescriptor {
            id: SectionId::Assessment,
            title: "Assessment & Diagnosis",
            short_title: "Diagnosis",
            icon: "clipboard-check",
            description: "Working diagnosis and differentials.",
            fields: ASSESSMENT_FIELDS,
            applicability: always,
        },
        SectionDescriptor {
            id: SectionId::Plan,
            title: "Plan",
            short_title: "Plan",
            icon: "calendar-check",
            description: "Treatment, follow-up and referrals.",
            fields: PLAN_FIELDS,
            applicability: always,
        },
    ]
}
