//! Editor session: one open project with its document, history and event bus.
//!
//! The session is the composition root. It owns the only [`HistoryService`]
//! and [`EventBus`] of the project and hands out references to them; nothing
//! is reached through globals.

use std::collections::HashMap;
use std::sync::Arc;

use mapkit_core::{
    AppEvent, Capability, EventBus, EventBusConfig, HistoryKey, HistoryOperation,
    NotificationEvent,
};
use mapkit_document::{Document, DocumentState};
use mapkit_history::{BoxedChangeset, HistoryConfig, HistoryError, HistoryService};
use mapkit_settings::Config;

use crate::error::Result;

/// An open project.
pub struct EditorSession {
    config: Config,
    bus: Arc<EventBus>,
    document: Document,
    history: HistoryService,
}

impl EditorSession {
    /// Build a session with an empty document.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let bus = Arc::new(EventBus::with_config(EventBusConfig {
            channel_capacity: config.event_bus.channel_capacity,
            enable_history: config.event_bus.enable_history,
            max_history_size: config.event_bus.max_history_size,
            ..Default::default()
        }));

        let history_config = HistoryConfig {
            max_depth: config.history.max_depth,
            overrides: config.history.overrides().collect::<HashMap<_, _>>(),
        };
        let history = HistoryService::new(history_config, bus.clone());

        tracing::info!(
            "Editor session started (history depth {})",
            config.history.max_depth
        );

        Ok(Self {
            config,
            bus,
            document: Document::new(),
            history,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Event bus observers subscribe to.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Handle to the document; changesets are built against it.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &HistoryService {
        &self.history
    }

    /// Apply and record an edit on `key`.
    pub async fn execute(&self, key: HistoryKey, changeset: BoxedChangeset) -> Result<()> {
        self.history
            .execute(key, changeset)
            .await
            .map_err(|err| self.notify_failure(HistoryOperation::Register, err))
    }

    /// Record an edit that was already applied.
    pub async fn register(&self, key: HistoryKey, changeset: BoxedChangeset) {
        self.history.register(key, changeset).await;
    }

    pub async fn undo(&self, key: HistoryKey) -> Result<()> {
        self.history
            .undo(key)
            .await
            .map_err(|err| self.notify_failure(HistoryOperation::Undo, err))
    }

    pub async fn redo(&self, key: HistoryKey) -> Result<()> {
        self.history
            .redo(key)
            .await
            .map_err(|err| self.notify_failure(HistoryOperation::Redo, err))
    }

    pub fn can_undo(&self, key: HistoryKey) -> bool {
        self.history.can_undo(key)
    }

    pub fn can_redo(&self, key: HistoryKey) -> bool {
        self.history.can_redo(key)
    }

    pub fn capability(&self, key: HistoryKey) -> Capability {
        self.history.capability(key)
    }

    /// Replace the document with a loaded project.
    ///
    /// Every timeline is discarded first: the old changesets refer to
    /// entities that no longer exist. Returns how many were discarded.
    pub async fn load_project(&self, state: DocumentState) -> usize {
        let discarded = self.history.clean(None).await;
        self.document.replace_state(state);
        tracing::info!("Project loaded ({} history entries discarded)", discarded);
        discarded
    }

    /// Start over with an empty document.
    pub async fn reset(&self) -> usize {
        self.load_project(DocumentState::default()).await
    }

    /// Release every changeset before the session is dropped.
    pub async fn shutdown(&self) {
        let discarded = self.history.clean(None).await;
        tracing::info!("Editor session closed ({} history entries discarded)", discarded);
    }

    /// Tell the user an action failed, then hand the error back.
    fn notify_failure(&self, operation: HistoryOperation, err: HistoryError) -> crate::Error {
        // An empty stack means the control should already be disabled
        if !err.is_empty_history() {
            let message = match operation {
                HistoryOperation::Register => "The edit could not be applied",
                HistoryOperation::Undo => "Undo failed",
                HistoryOperation::Redo => "Redo failed",
            };
            let _ = self
                .bus
                .publish(AppEvent::Notification(NotificationEvent::error(message)));
        }
        err.into()
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("document", &self.document)
            .field("history", &self.history)
            .finish()
    }
}
