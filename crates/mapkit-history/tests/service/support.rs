//! Shared fixtures: a list-of-names document and changesets over it.

use async_trait::async_trait;
use mapkit_core::{AppEvent, EventBus, EventFilter};
use mapkit_history::{Changeset, ChangesetError, ChangesetResult, HistoryConfig, HistoryService};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub type Names = Arc<Mutex<Vec<String>>>;

pub fn names() -> Names {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn contents(doc: &Names) -> Vec<String> {
    doc.lock().clone()
}

pub struct Harness {
    pub service: Arc<HistoryService>,
    pub events: Arc<Mutex<Vec<AppEvent>>>,
}

pub fn harness(config: HistoryConfig) -> Harness {
    let bus = Arc::new(EventBus::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    bus.subscribe(EventFilter::All, move |event| sink.lock().push(event));
    Harness {
        service: Arc::new(HistoryService::new(config, bus)),
        events,
    }
}

/// Appends a name; undo removes it again.
pub struct Insert {
    pub doc: Names,
    pub name: String,
    pub disposed: Option<Arc<AtomicUsize>>,
}

impl Insert {
    pub fn new(doc: &Names, name: &str) -> Self {
        Self {
            doc: doc.clone(),
            name: name.to_string(),
            disposed: None,
        }
    }

    pub fn counting(doc: &Names, name: &str, disposed: &Arc<AtomicUsize>) -> Self {
        Self {
            disposed: Some(disposed.clone()),
            ..Self::new(doc, name)
        }
    }
}

#[async_trait]
impl Changeset for Insert {
    fn name(&self) -> &str {
        "Insert"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.doc.lock().push(self.name.clone());
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        let mut doc = self.doc.lock();
        let index = doc
            .iter()
            .rposition(|n| n == &self.name)
            .ok_or_else(|| ChangesetError::not_found("name", &self.name))?;
        doc.remove(index);
        Ok(())
    }

    async fn dispose(&mut self) -> ChangesetResult {
        if let Some(disposed) = &self.disposed {
            disposed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Renames one entry in place.
pub struct Rename {
    pub doc: Names,
    pub from: String,
    pub to: String,
}

impl Rename {
    pub fn new(doc: &Names, from: &str, to: &str) -> Self {
        Self {
            doc: doc.clone(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    fn swap(&self, from: &str, to: &str) -> ChangesetResult {
        let mut doc = self.doc.lock();
        let entry = doc
            .iter_mut()
            .find(|n| n.as_str() == from)
            .ok_or_else(|| ChangesetError::not_found("name", from))?;
        *entry = to.to_string();
        Ok(())
    }
}

#[async_trait]
impl Changeset for Rename {
    fn name(&self) -> &str {
        "Rename"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.swap(&self.from, &self.to)
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.swap(&self.to, &self.from)
    }
}

/// Succeeds until `broken` is set, then fails in both directions.
pub struct Fragile {
    pub broken: Arc<AtomicBool>,
}

#[async_trait]
impl Changeset for Fragile {
    fn name(&self) -> &str {
        "Fragile"
    }

    async fn apply(&mut self) -> ChangesetResult {
        if self.broken.load(Ordering::SeqCst) {
            return Err(ChangesetError::StateDrift("apply".to_string()));
        }
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        if self.broken.load(Ordering::SeqCst) {
            return Err(ChangesetError::StateDrift("undo".to_string()));
        }
        Ok(())
    }
}
