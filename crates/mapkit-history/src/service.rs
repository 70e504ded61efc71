//! History service: the registry of timelines and the public entry point.
//!
//! One service exists per editor session and is passed by reference (or
//! `Arc`) to whoever produces changesets. There is no global instance.

use std::collections::HashMap;
use std::sync::Arc;

use mapkit_core::{
    thread_safe_rw_map, Capability, EventBus, HistoryEvent, HistoryKey, HistoryOperation,
    ThreadSafeRwMap,
};
use tokio::sync::Mutex;

use crate::capability::{CapabilityPublisher, CapabilityState};
use crate::changeset::BoxedChangeset;
use crate::error::{HistoryError, HistoryResult};
use crate::timeline::Timeline;

/// Depth limits for the timelines a service creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Backward depth used for keys without an override.
    pub max_depth: usize,
    /// Per-key depth limits.
    pub overrides: HashMap<HistoryKey, usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            overrides: HashMap::new(),
        }
    }
}

impl HistoryConfig {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            overrides: HashMap::new(),
        }
    }

    /// Set a depth limit for one key (builder style).
    pub fn with_override(mut self, key: HistoryKey, max_depth: usize) -> Self {
        self.overrides.insert(key, max_depth);
        self
    }

    pub fn depth_for(&self, key: HistoryKey) -> usize {
        self.overrides.get(&key).copied().unwrap_or(self.max_depth)
    }
}

type SharedTimeline = Arc<Mutex<Timeline>>;

/// Registry of per-key timelines.
///
/// Each timeline sits behind its own async mutex, held for the whole of an
/// operation: calls on the same key run one at a time, calls on different
/// keys interleave freely.
pub struct HistoryService {
    config: HistoryConfig,
    timelines: ThreadSafeRwMap<HistoryKey, SharedTimeline>,
    publisher: CapabilityPublisher,
}

impl HistoryService {
    pub fn new(config: HistoryConfig, bus: Arc<EventBus>) -> Self {
        Self {
            config,
            timelines: thread_safe_rw_map(),
            publisher: CapabilityPublisher::new(bus),
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Record a changeset the caller has already applied.
    pub async fn register(&self, key: HistoryKey, changeset: BoxedChangeset) {
        let timeline = self.timeline(key);
        let mut timeline = timeline.lock().await;

        let name = changeset.name().to_string();
        timeline.register(changeset).await;
        tracing::debug!(
            "History {}: registered '{}' (depth {})",
            key,
            name,
            timeline.undo_depth()
        );
        self.publisher.publish(key, &timeline);
    }

    /// Apply a freshly built changeset and record it.
    ///
    /// If the apply fails nothing is recorded.
    pub async fn execute(&self, key: HistoryKey, mut changeset: BoxedChangeset) -> HistoryResult<()> {
        let timeline = self.timeline(key);
        let mut timeline = timeline.lock().await;

        if let Err(source) = changeset.apply().await {
            let err = HistoryError::ChangesetApplyFailed {
                key,
                changeset: changeset.name().to_string(),
                source,
            };
            self.publisher.publish(key, &timeline);
            return Err(self.report(key, HistoryOperation::Register, err));
        }

        let name = changeset.name().to_string();
        timeline.register(changeset).await;
        tracing::debug!(
            "History {}: executed '{}' (depth {})",
            key,
            name,
            timeline.undo_depth()
        );
        self.publisher.publish(key, &timeline);
        Ok(())
    }

    /// Reverse the most recent changeset on `key`.
    pub async fn undo(&self, key: HistoryKey) -> HistoryResult<()> {
        let timeline = self.timeline(key);
        let mut timeline = timeline.lock().await;

        let result = timeline.undo().await;
        self.publisher.publish(key, &timeline);

        match result {
            Ok(()) => {
                tracing::debug!("History {}: undo ({})", key, timeline.capability());
                Ok(())
            }
            Err(err) => Err(self.report(key, HistoryOperation::Undo, err)),
        }
    }

    /// Replay the most recently undone changeset on `key`.
    pub async fn redo(&self, key: HistoryKey) -> HistoryResult<()> {
        let timeline = self.timeline(key);
        let mut timeline = timeline.lock().await;

        let result = timeline.redo().await;
        self.publisher.publish(key, &timeline);

        match result {
            Ok(()) => {
                tracing::debug!("History {}: redo ({})", key, timeline.capability());
                Ok(())
            }
            Err(err) => Err(self.report(key, HistoryOperation::Redo, err)),
        }
    }

    /// Last published undo availability for `key`.
    pub fn can_undo(&self, key: HistoryKey) -> bool {
        self.publisher.get(key).can_undo
    }

    /// Last published redo availability for `key`.
    pub fn can_redo(&self, key: HistoryKey) -> bool {
        self.publisher.get(key).can_redo
    }

    pub fn capability(&self, key: HistoryKey) -> Capability {
        self.publisher.get(key)
    }

    /// Every key's last published capability.
    pub fn capabilities(&self) -> HashMap<HistoryKey, Capability> {
        self.publisher.snapshot()
    }

    /// Read-only capability handle for observers.
    pub fn capability_state(&self) -> CapabilityState {
        self.publisher.state()
    }

    /// Discard one timeline, or every timeline when `key` is `None`.
    ///
    /// Changesets are disposed without being undone. Returns the number of
    /// changesets discarded.
    pub async fn clean(&self, key: Option<HistoryKey>) -> usize {
        let targets: Vec<(HistoryKey, SharedTimeline)> = match key {
            // Created if missing, so the reset happens under the key's lock
            Some(key) => vec![(key, self.timeline(key))],
            None => {
                let map = self.timelines.read();
                let mut targets: Vec<_> = map
                    .iter()
                    .map(|(key, timeline)| (*key, timeline.clone()))
                    .collect();
                targets.sort_by_key(|(key, _)| *key);
                targets
            }
        };

        let mut discarded = 0;
        for (key, timeline) in targets {
            let mut timeline = timeline.lock().await;
            let count = timeline.clear().await;
            self.publisher.publish(key, &timeline);
            tracing::debug!("History {}: cleared {} changeset(s)", key, count);
            self.publisher.emit(HistoryEvent::Cleared { key });
            discarded += count;
        }
        discarded
    }

    /// Current `(undo, redo)` stack depths for `key`.
    pub async fn depths(&self, key: HistoryKey) -> (usize, usize) {
        let timeline = self.timelines.read().get(&key).cloned();
        match timeline {
            Some(timeline) => {
                let timeline = timeline.lock().await;
                (timeline.undo_depth(), timeline.redo_depth())
            }
            None => (0, 0),
        }
    }

    /// Get or lazily create the timeline for `key`.
    fn timeline(&self, key: HistoryKey) -> SharedTimeline {
        if let Some(timeline) = self.timelines.read().get(&key) {
            return timeline.clone();
        }

        let mut map = self.timelines.write();
        map.entry(key)
            .or_insert_with(|| {
                tracing::debug!("History {}: creating timeline", key);
                Arc::new(Mutex::new(Timeline::new(key, self.config.depth_for(key))))
            })
            .clone()
    }

    /// Log a failure and tell observers about it before handing it back.
    fn report(&self, key: HistoryKey, operation: HistoryOperation, err: HistoryError) -> HistoryError {
        if err.is_empty_history() {
            tracing::warn!("{}", err);
        } else {
            tracing::error!("{}", err);
        }
        self.publisher.emit(HistoryEvent::OperationFailed {
            key,
            operation,
            message: err.to_string(),
        });
        err
    }
}

impl std::fmt::Debug for HistoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryService")
            .field("config", &self.config)
            .field("timelines", &self.timelines.read().len())
            .finish()
    }
}
