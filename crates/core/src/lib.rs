//! # Casenote Core
//!
//! Engine for adaptive clinical documentation of a single patient encounter.
//!
//! The crate decides which documentation sections apply to a patient, tracks per-section
//! completion, resumes a clinician where they left off, maps records to and from their
//! persisted shape, and debounces autosave. The [`wizard`] module ties these together.
//!
//! **No storage or transport concerns**: persistence is a [`store::RecordStore`] supplied by
//! the host (see `casenote-store`), and HTTP lives in `api-rest`.

pub mod autosave;
pub mod config;
pub mod constants;
pub mod error;
pub mod field_mapper;
pub mod patient;
pub mod progress;
pub mod record;
pub mod resume;
pub mod sections;
pub mod store;
pub mod wizard;

#[cfg(test)]
mod test_support;

pub use autosave::{AutosaveScheduler, SaveTrigger};
pub use config::CoreConfig;
pub use error::{StoreError, StoreResult, WizardError, WizardResult};
pub use field_mapper::{ExternalRecord, FieldMapper};
pub use patient::{PatientDescriptor, RecordedSex};
pub use progress::{mark_section_complete, progress_percent, SectionProgress, WorkflowProgress};
pub use record::{DocumentationRecord, FieldKind, FieldSpec, FieldValue};
pub use resume::{landing_section, resume_section};
pub use sections::{visible_sections, SectionDescriptor, SectionId, SectionRegistry};
pub use store::{RecordStore, StoredDraft};
pub use wizard::{WizardController, WizardEvent, WizardPhase, WizardSession, WizardView};

pub use casenote_ids::RecordId;
