use crate::autosave::SaveTrigger;
use casenote_ids::RecordId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Notifications for the host, drained with
/// [`WizardController::drain_events`](super::WizardController::drain_events).
///
/// Failures reported here are recoverable: the wizard stays in a continuable state.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    Loaded {
        record_id: RecordId,
    },
    LoadFailed {
        record_id: RecordId,
        message: String,
    },
    Saved {
        trigger: SaveTrigger,
        at: DateTime<Utc>,
    },
    SaveFailed {
        trigger: SaveTrigger,
        message: String,
    },
    /// The record was finalized and saved; the host may close the wizard.
    Finalized {
        record_id: RecordId,
    },
    DeleteRequested {
        record_id: RecordId,
    },
    DeleteCancelled {
        record_id: RecordId,
    },
    DeleteFailed {
        record_id: RecordId,
        message: String,
    },
    /// The record is gone; the host should leave the wizard.
    Exited {
        record_id: RecordId,
    },
}

impl WizardEvent {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            WizardEvent::LoadFailed { .. }
                | WizardEvent::SaveFailed { .. }
                | WizardEvent::DeleteFailed { .. }
        )
    }
}
