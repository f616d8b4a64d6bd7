use super::controller::WizardController;
use crate::autosave::SaveTrigger;
use crate::error::WizardResult;
use crate::patient::PatientDescriptor;
use crate::record::FieldValue;
use crate::sections::SectionId;
use casenote_ids::RecordId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A [`WizardController`] with a background task that fires debounced autosaves.
///
/// The task sleeps until the controller's autosave deadline and is woken whenever an edit
/// moves it. Dropping the session stops the task after any save already in flight; use
/// [`close`](Self::close) to also flush pending edits.
pub struct WizardSession {
    controller: Arc<Mutex<WizardController>>,
    wake: Arc<Notify>,
    closed: Arc<AtomicBool>,
    driver: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl WizardSession {
    /// Wraps `controller` and starts the autosave task on the current runtime.
    pub fn spawn(controller: WizardController) -> Self {
        let session = Self {
            controller: Arc::new(Mutex::new(controller)),
            wake: Arc::new(Notify::new()),
            closed: Arc::new(AtomicBool::new(false)),
            driver: std::sync::Mutex::new(None),
        };
        session.start_driver();
        session
    }

    fn start_driver(&self) {
        let driver = tokio::spawn(drive_autosave(
            self.controller.clone(),
            self.wake.clone(),
            self.closed.clone(),
        ));
        match self.driver.lock() {
            Ok(mut guard) => *guard = Some(driver),
            Err(poisoned) => *poisoned.into_inner() = Some(driver),
        }
    }

    /// Exclusive access to the controller.
    ///
    /// Call [`touch`](Self::touch) after editing through the guard so the autosave task sees
    /// the new deadline.
    pub async fn lock(&self) -> MutexGuard<'_, WizardController> {
        self.controller.lock().await
    }

    /// Wakes the autosave task to re-read the deadline.
    pub fn touch(&self) {
        self.wake.notify_one();
    }

    pub async fn open(&self, id: RecordId, patient: PatientDescriptor) -> WizardResult<()> {
        let result = self.lock().await.open(id, patient).await;
        self.touch();
        result
    }

    pub async fn update_field(&self, name: &str, value: FieldValue) -> WizardResult<()> {
        let result = self.lock().await.update_field(name, value, Instant::now());
        self.touch();
        result
    }

    pub async fn mark_complete(&self, section: SectionId, completed: bool) -> WizardResult<()> {
        let result = self
            .lock()
            .await
            .mark_complete(section, completed, Instant::now());
        self.touch();
        result
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops the autosave task and saves pending edits.
    ///
    /// If the final save fails the session stays open: the autosave task is restarted and the
    /// edits remain pending for the next save.
    pub async fn close(&self) -> WizardResult<()> {
        self.closed.store(true, Ordering::Release);
        self.touch();

        let driver = match self.driver.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(driver) = driver {
            if let Err(e) = driver.await {
                tracing::warn!("autosave task ended abnormally: {}", e);
            }
        }

        let mut controller = self.lock().await;
        if controller.is_loaded() && controller.is_dirty() {
            if let Err(e) = controller.flush(SaveTrigger::Close).await {
                drop(controller);
                self.closed.store(false, Ordering::Release);
                self.start_driver();
                return Err(e);
            }
        }
        Ok(())
    }
}

impl Drop for WizardSession {
    fn drop(&mut self) {
        // The task notices on its next wake-up; a save in flight is left to finish.
        self.closed.store(true, Ordering::Release);
        self.wake.notify_one();
    }
}

async fn drive_autosave(
    controller: Arc<Mutex<WizardController>>,
    wake: Arc<Notify>,
    closed: Arc<AtomicBool>,
) {
    loop {
        if closed.load(Ordering::Acquire) {
            break;
        }

        let deadline = controller.lock().await.autosave_deadline();
        match deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => {
                        let mut controller = controller.lock().await;
                        if let Err(e) = controller.run_due_autosave(Instant::now()).await {
                            tracing::warn!("autosave failed: {}", e);
                        }
                    }
                    _ = wake.notified() => {}
                }
            }
            None => wake.notified().await,
        }
    }
    tracing::debug!("autosave task stopped");
}
