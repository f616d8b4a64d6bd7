//! In-memory [`RecordStore`] with scripted failures and a call log.

use crate::config::CoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::patient::PatientDescriptor;
use crate::sections::SectionRegistry;
use crate::store::{RecordStore, StoredDraft};
use crate::wizard::WizardController;
use casenote_ids::RecordId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StoreCall {
    Load(RecordId),
    Save(RecordId),
    DeleteDependents(RecordId),
    DeleteRecord(RecordId),
}

#[derive(Default)]
struct State {
    drafts: HashMap<RecordId, StoredDraft>,
    calls: Vec<StoreCall>,
    saves: Vec<(Instant, StoredDraft)>,
    fail_load: bool,
    fail_save: bool,
    fail_delete_dependents: bool,
    fail_delete_record: bool,
}

#[derive(Default)]
pub(crate) struct ScriptedStore {
    state: Mutex<State>,
}

impl ScriptedStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("store state lock")
    }

    pub(crate) fn insert(&self, id: RecordId, draft: StoredDraft) {
        self.state().drafts.insert(id, draft);
    }

    pub(crate) fn draft(&self, id: RecordId) -> Option<StoredDraft> {
        self.state().drafts.get(&id).cloned()
    }

    pub(crate) fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    /// Every save issued, with the instant it arrived.
    pub(crate) fn saves(&self) -> Vec<(Instant, StoredDraft)> {
        self.state().saves.clone()
    }

    pub(crate) fn fail_load(&self, fail: bool) {
        self.state().fail_load = fail;
    }

    pub(crate) fn fail_save(&self, fail: bool) {
        self.state().fail_save = fail;
    }

    pub(crate) fn fail_delete_dependents(&self, fail: bool) {
        self.state().fail_delete_dependents = fail;
    }

    pub(crate) fn fail_delete_record(&self, fail: bool) {
        self.state().fail_delete_record = fail;
    }
}

#[async_trait::async_trait]
impl RecordStore for ScriptedStore {
    async fn load(&self, id: RecordId) -> StoreResult<StoredDraft> {
        let mut state = self.state();
        state.calls.push(StoreCall::Load(id));
        if state.fail_load {
            return Err(StoreError::Backend("scripted load failure".into()));
        }
        state.drafts.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, id: RecordId, draft: &StoredDraft) -> StoreResult<()> {
        let mut state = self.state();
        state.calls.push(StoreCall::Save(id));
        if state.fail_save {
            return Err(StoreError::Backend("scripted save failure".into()));
        }
        state.saves.push((Instant::now(), draft.clone()));
        state.drafts.insert(id, draft.clone());
        Ok(())
    }

    async fn delete_record(&self, id: RecordId) -> StoreResult<()> {
        let mut state = self.state();
        state.calls.push(StoreCall::DeleteRecord(id));
        if state.fail_delete_record {
            return Err(StoreError::Backend("scripted delete failure".into()));
        }
        state.drafts.remove(&id);
        Ok(())
    }

    async fn delete_dependents(&self, id: RecordId) -> StoreResult<()> {
        let mut state = self.state();
        state.calls.push(StoreCall::DeleteDependents(id));
        if state.fail_delete_dependents {
            return Err(StoreError::Backend("scripted dependents failure".into()));
        }
        Ok(())
    }
}

/// Controller over the standard catalog with the default debounce.
pub(crate) fn controller(store: Arc<ScriptedStore>) -> WizardController {
    WizardController::new(
        Arc::new(CoreConfig::default()),
        SectionRegistry::standard(),
        store,
    )
}

pub(crate) fn adult_male() -> PatientDescriptor {
    PatientDescriptor::new("John", "Smith", Some("Male".into()), Some(45))
}

pub(crate) fn adult_female() -> PatientDescriptor {
    PatientDescriptor::new("Jane", "Doe", Some("Female".into()), Some(32))
}
