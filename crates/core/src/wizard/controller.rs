use super::events::WizardEvent;
use super::host::SectionHost;
use super::view::{CompletionState, SectionSummary, WizardView};
use super::WizardPhase;
use crate::autosave::{AutosaveScheduler, SaveTrigger};
use crate::config::CoreConfig;
use crate::error::{StoreError, WizardError, WizardResult};
use crate::field_mapper::FieldMapper;
use crate::patient::PatientDescriptor;
use crate::progress::{mark_section_complete, progress_percent, WorkflowProgress};
use crate::record::{DocumentationRecord, FieldValue};
use crate::resume::landing_section;
use crate::sections::{visible_sections, SectionDescriptor, SectionId, SectionRegistry};
use crate::store::{RecordStore, StoredDraft};
use casenote_ids::RecordId;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::time::Instant;

/// State machine for documenting one encounter.
///
/// The controller is the single writer of its draft. It trusts its local state after a
/// successful save and never refetches, so in-progress edits are never clobbered by a
/// server round-trip.
pub struct WizardController {
    cfg: Arc<CoreConfig>,
    registry: Arc<SectionRegistry>,
    store: Arc<dyn RecordStore>,
    mapper: FieldMapper,
    record_id: Option<RecordId>,
    patient: PatientDescriptor,
    record: DocumentationRecord,
    progress: WorkflowProgress,
    phase: WizardPhase,
    dirty: bool,
    delete_requested: bool,
    autosave: AutosaveScheduler,
    last_saved_at: Option<DateTime<Utc>>,
    events: VecDeque<WizardEvent>,
}

impl WizardController {
    pub fn new(
        cfg: Arc<CoreConfig>,
        registry: Arc<SectionRegistry>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        let mapper = registry.field_mapper();
        let record = registry.blank_record();
        let autosave = AutosaveScheduler::new(cfg.autosave_debounce());

        Self {
            cfg,
            registry,
            store,
            mapper,
            record_id: None,
            patient: PatientDescriptor::default(),
            record,
            progress: WorkflowProgress::default(),
            phase: WizardPhase::Loading,
            dirty: false,
            delete_requested: false,
            autosave,
            last_saved_at: None,
            events: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn patient(&self) -> &PatientDescriptor {
        &self.patient
    }

    pub fn record(&self) -> &DocumentationRecord {
        &self.record
    }

    pub fn progress(&self) -> &WorkflowProgress {
        &self.progress
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_delete_requested(&self) -> bool {
        self.delete_requested
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// When the pending autosave is due, if one is armed.
    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    /// True once a record is loaded and until it is deleted.
    pub fn is_loaded(&self) -> bool {
        matches!(
            self.phase,
            WizardPhase::Editing | WizardPhase::Saving | WizardPhase::Finalized
        )
    }

    pub fn drain_events(&mut self) -> Vec<WizardEvent> {
        self.events.drain(..).collect()
    }

    /// Replaces the patient descriptor. Visibility follows on the next read.
    pub fn set_patient(&mut self, patient: PatientDescriptor) {
        self.patient = patient;
    }

    pub fn visible_sections(&self) -> Vec<&SectionDescriptor> {
        visible_sections(&self.registry, &self.patient, &self.record)
    }

    pub fn progress_percent(&self) -> u8 {
        progress_percent(&self.progress, &self.registry, &self.patient, &self.record)
    }

    /// The section the clinician is on.
    ///
    /// This is the stored pointer while it is visible. If visibility changed underneath it,
    /// the resume rules pick a visible section instead. `None` only when nothing is visible.
    pub fn current_section(&self) -> Option<&SectionDescriptor> {
        if let Some(current) = self.progress.current_section() {
            if let Some(section) = self.visible_sections().into_iter().find(|s| s.id == current) {
                return Some(section);
            }
        }
        landing_section(&self.progress, &self.registry, &self.patient, &self.record)
    }

    /// Position of [`current_section`](Self::current_section) in the visible list.
    pub fn current_index(&self) -> Option<usize> {
        let current = self.current_section()?.id;
        self.visible_sections().iter().position(|s| s.id == current)
    }

    pub fn completion_state(&self) -> CompletionState {
        CompletionState {
            visible_sections: self
                .visible_sections()
                .into_iter()
                .map(|section| SectionSummary::new(section, &self.progress, &self.record))
                .collect(),
            progress_percent: self.progress_percent(),
        }
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            record_id: self.record_id,
            phase: self.phase,
            patient: self.patient.clone(),
            completion: self.completion_state(),
            current_section: self.current_section().map(|s| s.id),
            current_index: self.current_index(),
            completion_marker: self.progress.completion_marker(),
            is_complete: self.record.is_complete(),
            dirty: self.dirty,
            delete_requested: self.delete_requested,
            last_saved_at: self.last_saved_at,
            record: self.record.clone(),
        }
    }

    /// Loads `id` for editing.
    ///
    /// Reopening the record that is already loaded only refreshes the patient descriptor; it
    /// never refetches, so edits in flight are kept. Opening a different record first saves
    /// pending edits of the current one and fails without switching if that save fails.
    ///
    /// # Errors
    ///
    /// - [`WizardError::Save`] if pending edits of the previous record could not be saved.
    /// - [`WizardError::Load`] if the store cannot produce the record. The wizard is then
    ///   [`WizardPhase::LoadFailed`] and holds no partial state.
    pub async fn open(&mut self, id: RecordId, patient: PatientDescriptor) -> WizardResult<()> {
        if self.record_id == Some(id) && self.is_loaded() {
            tracing::debug!("record {} already loaded, refreshing patient only", id);
            self.patient = patient;
            return Ok(());
        }

        self.flush_before_switch().await?;
        self.reset(id, patient);

        match self.store.load(id).await {
            Ok(draft) => {
                self.record = self.mapper.to_internal(&draft.record);
                self.progress =
                    WorkflowProgress::from_blob(draft.workflow_progress.as_deref(), &self.registry);
                self.land();
                self.phase = WizardPhase::Editing;
                tracing::info!("loaded record {}", id);
                self.events.push_back(WizardEvent::Loaded { record_id: id });
                Ok(())
            }
            Err(e) => {
                self.phase = WizardPhase::LoadFailed;
                tracing::error!("failed to load record {}: {}", id, e);
                self.events.push_back(WizardEvent::LoadFailed {
                    record_id: id,
                    message: e.to_string(),
                });
                Err(WizardError::Load(e))
            }
        }
    }

    /// Starts a new encounter under `id` with a blank record. Nothing is written until the
    /// first save.
    pub async fn begin_new(&mut self, id: RecordId, patient: PatientDescriptor) -> WizardResult<()> {
        self.flush_before_switch().await?;
        self.reset(id, patient);
        self.land();
        self.phase = WizardPhase::Editing;
        tracing::info!("started new record {}", id);
        self.events.push_back(WizardEvent::Loaded { record_id: id });
        Ok(())
    }

    /// Merges a field value into the record and arms the autosave timer.
    ///
    /// Setting a field to the value it already holds is a no-op.
    ///
    /// # Errors
    ///
    /// - [`WizardError::UnknownField`] if no section declares `name`.
    /// - [`WizardError::InvalidInput`] if `value` does not fit the field's kind.
    pub fn update_field(&mut self, name: &str, value: FieldValue, now: Instant) -> WizardResult<()> {
        self.ensure_editable("edit a field")?;

        let (_, spec) = self
            .registry
            .section_field(name)
            .ok_or_else(|| WizardError::UnknownField(name.to_string()))?;
        if !spec.kind.accepts(&value) {
            return Err(WizardError::InvalidInput(format!(
                "field {} does not accept {:?}",
                name, value
            )));
        }

        if self.record.get(name) == Some(&value) {
            return Ok(());
        }

        self.record.set(name, value);
        self.mark_dirty(now);
        Ok(())
    }

    /// Sets the completion flag of `section`, checkpointing the current position.
    pub fn mark_complete(
        &mut self,
        section: SectionId,
        completed: bool,
        now: Instant,
    ) -> WizardResult<()> {
        self.ensure_editable("mark a section complete")?;
        if !self.registry.contains(section) {
            return Err(WizardError::UnknownSection(section.to_string()));
        }

        let current = self.current_section().map(|s| s.id);
        self.progress =
            mark_section_complete(&self.progress, section, completed, current, Utc::now());
        self.mark_dirty(now);
        Ok(())
    }

    /// Host contract for one visible section.
    pub fn host(&mut self, section: SectionId) -> WizardResult<SectionHost<'_>> {
        self.ensure_editable("host a section")?;
        let descriptor = *self
            .registry
            .get(section)
            .ok_or_else(|| WizardError::UnknownSection(section.to_string()))?;
        if !descriptor.is_applicable(&self.patient, &self.record) {
            return Err(WizardError::InvalidInput(format!(
                "section {} does not apply to this encounter",
                section
            )));
        }
        Ok(SectionHost::new(self, descriptor))
    }

    /// Saves immediately, cancelling any pending autosave.
    pub async fn save(&mut self) -> WizardResult<()> {
        self.ensure_editable("save")?;
        self.flush(SaveTrigger::Manual).await
    }

    /// Fires the autosave if its quiet interval has elapsed at `now`.
    ///
    /// Returns whether a save was attempted. A failed autosave leaves the record dirty; the
    /// next edit re-arms the timer.
    pub async fn run_due_autosave(&mut self, now: Instant) -> WizardResult<bool> {
        if !self.is_loaded() {
            self.autosave.cancel();
            return Ok(false);
        }
        if !self.autosave.take_due(now) || !self.dirty {
            return Ok(false);
        }
        self.persist(SaveTrigger::Autosave).await?;
        Ok(true)
    }

    /// Moves to the next visible section. Returns the new section, or `None` at the end.
    pub async fn go_next(&mut self) -> WizardResult<Option<SectionId>> {
        self.ensure_editable("navigate")?;
        let visible = self.visible_ids();
        let target = match self.current_index() {
            Some(i) => visible.get(i + 1).copied(),
            None => visible.first().copied(),
        };
        self.navigate_to(target).await
    }

    /// Moves to the previous visible section. Returns the new section, or `None` at the start.
    pub async fn go_previous(&mut self) -> WizardResult<Option<SectionId>> {
        self.ensure_editable("navigate")?;
        let visible = self.visible_ids();
        let target = self
            .current_index()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| visible.get(i).copied());
        self.navigate_to(target).await
    }

    /// Jumps to `section`, which must currently be visible.
    pub async fn go_to_section(&mut self, section: SectionId) -> WizardResult<Option<SectionId>> {
        self.ensure_editable("navigate")?;
        if !self.registry.contains(section) {
            return Err(WizardError::UnknownSection(section.to_string()));
        }
        if !self.visible_ids().contains(&section) {
            return Err(WizardError::InvalidInput(format!(
                "section {} does not apply to this encounter",
                section
            )));
        }
        self.navigate_to(Some(section)).await
    }

    /// Marks the record complete and saves it.
    ///
    /// Finalizing an already finalized record with no further edits does nothing. The record
    /// stays editable afterwards.
    pub async fn finalize(&mut self) -> WizardResult<()> {
        self.ensure_editable("finalize")?;
        if self.phase == WizardPhase::Finalized && !self.dirty {
            tracing::debug!("record is already finalized with no pending edits");
            return Ok(());
        }

        self.record.set_complete(true);
        self.progress.mark_finalized();
        self.dirty = true;
        self.flush(SaveTrigger::Finalize).await?;

        self.phase = WizardPhase::Finalized;
        if let Some(id) = self.record_id {
            tracing::info!("finalized record {}", id);
            self.events.push_back(WizardEvent::Finalized { record_id: id });
        }
        Ok(())
    }

    /// First step of deletion. Nothing is removed until [`confirm_delete`](Self::confirm_delete).
    pub fn request_delete(&mut self) -> WizardResult<()> {
        let id = self.deletable_record()?;
        self.delete_requested = true;
        self.events
            .push_back(WizardEvent::DeleteRequested { record_id: id });
        Ok(())
    }

    /// Withdraws a pending delete request. Returns whether one was pending.
    pub fn cancel_delete(&mut self) -> bool {
        let was_requested = std::mem::take(&mut self.delete_requested);
        if let (true, Some(id)) = (was_requested, self.record_id) {
            self.events
                .push_back(WizardEvent::DeleteCancelled { record_id: id });
        }
        was_requested
    }

    /// Second step of deletion: removes dependents, then the record.
    ///
    /// If either step fails the wizard stays on the record and the request is withdrawn, so
    /// deletion has to be requested again.
    pub async fn confirm_delete(&mut self) -> WizardResult<()> {
        if !std::mem::take(&mut self.delete_requested) {
            return Err(WizardError::DeleteNotRequested);
        }
        let id = self.deletable_record()?;

        if let Err(e) = self.store.delete_dependents(id).await {
            tracing::error!("failed to delete dependents of record {}: {}", id, e);
            self.events.push_back(WizardEvent::DeleteFailed {
                record_id: id,
                message: e.to_string(),
            });
            return Err(WizardError::DeleteDependents(e));
        }

        if let Err(e) = self.store.delete_record(id).await {
            tracing::error!("failed to delete record {}: {}", id, e);
            self.events.push_back(WizardEvent::DeleteFailed {
                record_id: id,
                message: e.to_string(),
            });
            return Err(WizardError::DeleteRecord(e));
        }

        self.autosave.cancel();
        self.dirty = false;
        self.phase = WizardPhase::Deleted;
        tracing::info!("deleted record {}", id);
        self.events.push_back(WizardEvent::Exited { record_id: id });
        Ok(())
    }

    /// Cancels any pending autosave and saves now.
    pub(crate) async fn flush(&mut self, trigger: SaveTrigger) -> WizardResult<()> {
        self.autosave.cancel();
        self.persist(trigger).await
    }

    async fn navigate_to(&mut self, target: Option<SectionId>) -> WizardResult<Option<SectionId>> {
        let Some(target) = target else {
            return Ok(None);
        };

        self.progress.set_current_section(Some(target));
        self.dirty = true;
        if let Err(e) = self.flush(SaveTrigger::Navigation).await {
            tracing::warn!("moved to {} with unsaved changes: {}", target, e);
        }
        Ok(Some(target))
    }

    async fn persist(&mut self, trigger: SaveTrigger) -> WizardResult<()> {
        let id = self.record_id.ok_or(WizardError::NotLoaded)?;
        let workflow_progress = self
            .progress
            .to_blob()
            .map_err(|e| WizardError::Save(StoreError::Serialization(e)))?;
        let draft = StoredDraft {
            record: self.mapper.to_external(&self.record),
            workflow_progress: Some(workflow_progress),
        };

        let resume_phase = self.phase;
        self.phase = WizardPhase::Saving;
        let result = self.store.save(id, &draft).await;
        self.phase = resume_phase;

        match result {
            Ok(()) => {
                let at = Utc::now();
                self.dirty = false;
                self.last_saved_at = Some(at);
                tracing::info!("saved record {} ({})", id, trigger);
                self.events.push_back(WizardEvent::Saved { trigger, at });
                Ok(())
            }
            Err(e) => {
                tracing::warn!("{} of record {} failed: {}", trigger, id, e);
                self.events.push_back(WizardEvent::SaveFailed {
                    trigger,
                    message: e.to_string(),
                });
                Err(WizardError::Save(e))
            }
        }
    }

    async fn flush_before_switch(&mut self) -> WizardResult<()> {
        if self.is_loaded() && self.dirty {
            self.flush(SaveTrigger::RecordSwitch).await?;
        }
        Ok(())
    }

    fn reset(&mut self, id: RecordId, patient: PatientDescriptor) {
        self.phase = WizardPhase::Loading;
        self.record_id = Some(id);
        self.patient = patient;
        self.record = self.registry.blank_record();
        self.progress = WorkflowProgress::default();
        self.dirty = false;
        self.delete_requested = false;
        self.last_saved_at = None;
        self.autosave.cancel();
    }

    /// Points progress at the section the clinician should land on.
    fn land(&mut self) {
        let landing = landing_section(&self.progress, &self.registry, &self.patient, &self.record)
            .map(|s| s.id);
        self.progress.set_current_section(landing);
    }

    fn mark_dirty(&mut self, now: Instant) {
        self.dirty = true;
        self.autosave.note_edit(now);
    }

    fn visible_ids(&self) -> Vec<SectionId> {
        self.visible_sections().iter().map(|s| s.id).collect()
    }

    fn ensure_editable(&self, action: &'static str) -> WizardResult<()> {
        match self.phase {
            WizardPhase::Editing | WizardPhase::Finalized => Ok(()),
            WizardPhase::Loading | WizardPhase::LoadFailed => Err(WizardError::NotLoaded),
            phase => Err(WizardError::InvalidTransition { phase, action }),
        }
    }

    fn deletable_record(&self) -> WizardResult<RecordId> {
        match self.phase {
            WizardPhase::Editing => self.record_id.ok_or(WizardError::NotLoaded),
            WizardPhase::Loading | WizardPhase::LoadFailed => Err(WizardError::NotLoaded),
            phase => Err(WizardError::InvalidTransition {
                phase,
                action: "delete",
            }),
        }
    }
}

impl std::fmt::Debug for WizardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardController")
            .field("record_id", &self.record_id)
            .field("phase", &self.phase)
            .field("dirty", &self.dirty)
            .field("delete_requested", &self.delete_requested)
            .field("current_section", &self.progress.current_section())
            .finish_non_exhaustive()
    }
}
