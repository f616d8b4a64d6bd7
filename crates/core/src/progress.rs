//! Per-section completion tracking.
//!
//! [`WorkflowProgress`] is persisted next to the record as an opaque JSON blob. The store does
//! not interpret it; the engine parses it defensively on load, because losing resumability is
//! acceptable but losing access to the record is not.

use crate::constants::FINALIZED_COMPLETION_MARKER;
use crate::patient::PatientDescriptor;
use crate::record::DocumentationRecord;
use crate::sections::{visible_sections, SectionId, SectionRegistry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Completion state of one section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgress {
    pub completed: bool,
    #[serde(default)]
    pub last_saved_at: Option<DateTime<Utc>>,
}

/// Per-section completion map plus the last-visited section pointer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowProgress {
    sections: BTreeMap<SectionId, SectionProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_section: Option<SectionId>,
    /// Aggregate written at finalize time. Historical only, never used for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    completion_marker: Option<u8>,
}

/// Loose shape used to read stored blobs without failing on individual bad entries.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProgress {
    #[serde(default)]
    sections: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    current_section: Option<serde_json::Value>,
    #[serde(default)]
    completion_marker: Option<serde_json::Value>,
}

impl WorkflowProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, id: SectionId) -> Option<&SectionProgress> {
        self.sections.get(&id)
    }

    pub fn is_completed(&self, id: SectionId) -> bool {
        self.sections.get(&id).is_some_and(|p| p.completed)
    }

    pub fn sections(&self) -> impl Iterator<Item = (SectionId, &SectionProgress)> {
        self.sections.iter().map(|(id, p)| (*id, p))
    }

    pub fn current_section(&self) -> Option<SectionId> {
        self.current_section
    }

    pub fn set_current_section(&mut self, id: Option<SectionId>) {
        self.current_section = id;
    }

    pub fn completion_marker(&self) -> Option<u8> {
        self.completion_marker
    }

    /// Records the finalize-time aggregate.
    pub fn mark_finalized(&mut self) {
        self.completion_marker = Some(FINALIZED_COMPLETION_MARKER);
    }

    pub fn to_blob(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parses a stored blob.
    ///
    /// Unparseable blobs yield empty progress. Entries naming sections that are not in
    /// `registry`, and entries with a malformed shape, are dropped one by one so the rest of
    /// the map survives.
    pub fn from_blob(blob: Option<&str>, registry: &SectionRegistry) -> Self {
        let Some(blob) = blob.map(str::trim).filter(|b| !b.is_empty()) else {
            return Self::default();
        };

        let stored: StoredProgress = match serde_json::from_str(blob) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("stored workflow progress is unreadable, starting empty: {}", e);
                return Self::default();
            }
        };

        let known = |token: &str| {
            token
                .parse::<SectionId>()
                .ok()
                .filter(|id| registry.contains(*id))
        };

        let mut progress = Self::default();
        for (token, raw) in stored.sections {
            let Some(id) = known(&token) else {
                tracing::warn!("dropping progress for unknown section '{}'", token);
                continue;
            };
            match serde_json::from_value::<SectionProgress>(raw) {
                Ok(entry) => {
                    progress.sections.insert(id, entry);
                }
                Err(e) => tracing::warn!("dropping malformed progress for {}: {}", id, e),
            }
        }

        progress.current_section = stored
            .current_section
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .and_then(known);

        progress.completion_marker = stored
            .completion_marker
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u8::try_from(v).ok())
            .filter(|v| *v <= 100);

        progress
    }
}

/// Sets `completed` and a fresh timestamp for `section`, and checkpoints `current_section`.
pub fn mark_section_complete(
    progress: &WorkflowProgress,
    section: SectionId,
    completed: bool,
    current_section: Option<SectionId>,
    now: DateTime<Utc>,
) -> WorkflowProgress {
    let mut next = progress.clone();
    next.sections.insert(
        section,
        SectionProgress {
            completed,
            last_saved_at: Some(now),
        },
    );
    next.current_section = current_section;
    next
}

/// Percentage of currently visible sections marked complete, rounded to the nearest integer.
///
/// Always derived from the live visible set. Zero visible sections yields 0.
pub fn progress_percent(
    progress: &WorkflowProgress,
    registry: &SectionRegistry,
    patient: &PatientDescriptor,
    record: &DocumentationRecord,
) -> u8 {
    let visible = visible_sections(registry, patient, record);
    if visible.is_empty() {
        return 0;
    }

    let completed = visible
        .iter()
        .filter(|section| progress.is_completed(section.id))
        .count();

    let percent = (100.0 * completed as f64 / visible.len() as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{always, reproductive_history_applies, SectionDescriptor};
    use chrono::TimeZone;

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

    fn complaint_gyne_plan() -> SectionRegistry {
        SectionRegistry::new(vec![
            section(SectionId::ChiefComplaint, always),
            section(SectionId::GynecologicalHistory, reproductive_history_applies),
            section(SectionId::Plan, always),
        ])
        .expect("valid registry")
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn male() -> PatientDescriptor {
        PatientDescriptor::new("John", "Doe", Some("Male".into()), Some(45))
    }

    #[test]
    fn marking_one_of_two_visible_sections_is_fifty_percent() {
        let registry = complaint_gyne_plan();
        let record = registry.blank_record();
        let progress = mark_section_complete(
            &WorkflowProgress::new(),
            SectionId::ChiefComplaint,
            true,
            Some(SectionId::ChiefComplaint),
            at(0),
        );
        assert_eq!(progress_percent(&progress, &registry, &male(), &record), 50);
    }

    #[test]
    fn hidden_completed_sections_do_not_count() {
        let registry = complaint_gyne_plan();
        let record = registry.blank_record();
        let progress = mark_section_complete(
            &WorkflowProgress::new(),
            SectionId::GynecologicalHistory,
            true,
            None,
            at(0),
        );
        assert_eq!(progress_percent(&progress, &registry, &male(), &record), 0);
    }

    #[test]
    fn zero_visible_sections_is_zero_percent() {
        let registry = SectionRegistry::new(Vec::new()).expect("empty");
        let record = registry.blank_record();
        assert_eq!(
            progress_percent(&WorkflowProgress::new(), &registry, &male(), &record),
            0
        );
    }

    #[test]
    fn percent_is_monotonic_and_bounded() {
        let registry = SectionRegistry::standard();
        let record = registry.blank_record();
        let patient = male();
        let visible: Vec<SectionId> = visible_sections(&registry, &patient, &record)
            .iter()
            .map(|s| s.id)
            .collect();

        let mut progress = WorkflowProgress::new();
        let mut last = progress_percent(&progress, &registry, &patient, &record);
        assert_eq!(last, 0);
        for (i, id) in visible.iter().enumerate() {
            progress = mark_section_complete(&progress, *id, true, Some(*id), at(i as i64));
            let now = progress_percent(&progress, &registry, &patient, &record);
            assert!(now >= last);
            assert!(now <= 100);
            last = now;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn mark_section_complete_is_pure_and_checkpoints_position() {
        let original = WorkflowProgress::new();
        let next = mark_section_complete(
            &original,
            SectionId::Plan,
            true,
            Some(SectionId::ChiefComplaint),
            at(5),
        );
        assert_eq!(original, WorkflowProgress::new());
        assert!(next.is_completed(SectionId::Plan));
        assert_eq!(next.section(SectionId::Plan).unwrap().last_saved_at, Some(at(5)));
        assert_eq!(next.current_section(), Some(SectionId::ChiefComplaint));

        let undone = mark_section_complete(&next, SectionId::Plan, false, None, at(6));
        assert!(!undone.is_completed(SectionId::Plan));
        assert_eq!(undone.current_section(), None);
    }

    #[test]
    fn blob_round_trips() {
        let registry = SectionRegistry::standard();
        let mut progress = mark_section_complete(
            &WorkflowProgress::new(),
            SectionId::VitalSigns,
            true,
            Some(SectionId::Allergies),
            at(1),
        );
        progress.mark_finalized();
        let blob = progress.to_blob().expect("serialize");
        assert_eq!(WorkflowProgress::from_blob(Some(&blob), &registry), progress);
    }

    #[test]
    fn unreadable_blob_yields_empty_progress() {
        let registry = SectionRegistry::standard();
        for blob in [None, Some(""), Some("{not json"), Some("[1,2,3]"), Some("42")] {
            assert_eq!(
                WorkflowProgress::from_blob(blob, &registry),
                WorkflowProgress::default()
            );
        }
    }

    #[test]
    fn unknown_and_malformed_entries_are_dropped_individually() {
        let registry = complaint_gyne_plan();
        let blob = r#"{
            "sections": {
                "chief_complaint": {"completed": true, "lastSavedAt": "2026-01-01T10:00:00Z"},
                "vital_signs": {"completed": true},
                "telepathy": {"completed": true},
                "plan": {"completed": "sort of"}
            },
            "currentSection": "vital_signs",
            "completionMarker": 250
        }"#;
        let progress = WorkflowProgress::from_blob(Some(blob), &registry);

        assert!(progress.is_completed(SectionId::ChiefComplaint));
        assert!(progress.section(SectionId::VitalSigns).is_none());
        assert!(progress.section(SectionId::Plan).is_none());
        assert_eq!(progress.current_section(), None);
        assert_eq!(progress.completion_marker(), None);
    }

    #[test]
    fn current_section_survives_when_registered() {
        let registry = complaint_gyne_plan();
        let blob = r#"{"sections":{},"currentSection":"gynecological_history"}"#;
        let progress = WorkflowProgress::from_blob(Some(blob), &registry);
        assert_eq!(
            progress.current_section(),
            Some(SectionId::GynecologicalHistory)
        );
    }
}
