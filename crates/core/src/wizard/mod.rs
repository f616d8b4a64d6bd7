//! The documentation wizard.
//!
//! [`WizardController`] owns the draft for one encounter and exposes the engine's public
//! surface: loading, editing, completion marking, navigation, finalization and deletion.
//! All transitions are plain methods on an explicit state object; the only awaits are the
//! calls into the [`RecordStore`](crate::store::RecordStore). [`WizardSession`] wraps a
//! controller with the background task that fires debounced autosaves.
//!
//! ```text
//! Loading ──▶ Editing ⇄ Saving ──▶ Finalized
//!    │           │
//!    ▼           └── request_delete + confirm_delete ──▶ Deleted
//! LoadFailed
//! ```

mod controller;
mod events;
mod host;
mod session;
mod view;

pub use controller::WizardController;
pub use events::WizardEvent;
pub use host::SectionHost;
pub use session::WizardSession;
pub use view::{CompletionState, FieldSummary, SectionSummary, WizardView};

use serde::Serialize;
use std::fmt;

/// Lifecycle phase of a wizard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardPhase {
    /// No record yet, or a load is in flight.
    Loading,
    /// The last load failed. Nothing is editable until a load succeeds.
    LoadFailed,
    Editing,
    /// A save is in flight.
    Saving,
    /// Finalized in this session. Still editable.
    Finalized,
    /// Deleted. Absorbing.
    Deleted,
}

impl fmt::Display for WizardPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardPhase::Loading => "loading",
            WizardPhase::LoadFailed => "load failed",
            WizardPhase::Editing => "editing",
            WizardPhase::Saving => "saving",
            WizardPhase::Finalized => "finalized",
            WizardPhase::Deleted => "deleted",
        };
        f.write_str(name)
    }
}
