use casenote_core::{CoreConfig, RecordStore, SectionRegistry, WizardController, WizardSession};
use casenote_ids::RecordId;
use casenote_store::InvestigationsService;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state for the REST API server
///
/// Holds the engine's collaborators and the wizard sessions currently open, keyed by record.
/// Cloning is cheap; all clones share the same sessions.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    registry: Arc<SectionRegistry>,
    store: Arc<dyn RecordStore>,
    investigations: InvestigationsService,
    sessions: Arc<RwLock<HashMap<RecordId, Arc<WizardSession>>>>,
}

impl AppState {
    pub fn new(
        cfg: Arc<CoreConfig>,
        registry: Arc<SectionRegistry>,
        store: Arc<dyn RecordStore>,
        investigations: InvestigationsService,
    ) -> Self {
        Self {
            cfg,
            registry,
            store,
            investigations,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn investigations(&self) -> &InvestigationsService {
        &self.investigations
    }

    /// A fresh session with its own controller. Not registered until [`insert`](Self::insert).
    pub(crate) fn new_session(&self) -> Arc<WizardSession> {
        let controller =
            WizardController::new(self.cfg.clone(), self.registry.clone(), self.store.clone());
        Arc::new(WizardSession::spawn(controller))
    }

    pub(crate) async fn session(&self, id: RecordId) -> Option<Arc<WizardSession>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub(crate) async fn insert(&self, id: RecordId, session: Arc<WizardSession>) {
        self.sessions.write().await.insert(id, session);
    }

    /// The session registered for `id`, registering a fresh one if there is none.
    ///
    /// Lookup and insert happen under one write lock, so concurrent callers share a session.
    pub(crate) async fn session_or_insert(&self, id: RecordId) -> Arc<WizardSession> {
        self.sessions
            .write()
            .await
            .entry(id)
            .or_insert_with(|| self.new_session())
            .clone()
    }

    /// Unregisters `session` if it is still the one for `id` and never loaded a record.
    pub(crate) async fn remove_unopened(&self, id: RecordId, session: &Arc<WizardSession>) {
        let mut sessions = self.sessions.write().await;
        let registered = sessions
            .get(&id)
            .is_some_and(|current| Arc::ptr_eq(current, session));
        if registered && !session.lock().await.is_loaded() {
            sessions.remove(&id);
        }
    }

    pub(crate) async fn remove(&self, id: RecordId) -> Option<Arc<WizardSession>> {
        self.sessions.write().await.remove(&id)
    }

    /// Closes every open session, saving pending edits. Failures are logged, not returned.
    pub async fn close_all(&self) {
        let sessions: Vec<_> = self.sessions.write().await.drain().collect();
        for (id, session) in sessions {
            if let Err(e) = session.close().await {
                tracing::warn!("unsaved edits for record {} on shutdown: {}", id, e);
            }
        }
    }

    pub async fn open_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}
