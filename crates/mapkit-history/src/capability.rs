//! Capability projection published to the presentation layer.
//!
//! The publisher keeps no state of its own beyond the last value it handed
//! out: every publish recomputes `{can_undo, can_redo}` from the timeline.

use std::collections::HashMap;
use std::sync::Arc;

use mapkit_core::{
    thread_safe_rw_map, AppEvent, Capability, EventBus, HistoryEvent, HistoryKey, ThreadSafeRwMap,
};

use crate::timeline::Timeline;

/// Derives capability records and pushes them to observers.
pub struct CapabilityPublisher {
    bus: Arc<EventBus>,
    snapshot: ThreadSafeRwMap<HistoryKey, Capability>,
}

impl CapabilityPublisher {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            snapshot: thread_safe_rw_map(),
        }
    }

    /// Recompute the capability of `timeline`, store it under `key` and
    /// notify observers if it changed.
    pub fn publish(&self, key: HistoryKey, timeline: &Timeline) -> Capability {
        self.store(key, timeline.capability())
    }

    /// Last published capability for `key`; keys never used read as disabled.
    pub fn get(&self, key: HistoryKey) -> Capability {
        self.snapshot.read().get(&key).copied().unwrap_or_default()
    }

    /// Every key's last published capability, for bootstrapping a UI.
    pub fn snapshot(&self) -> HashMap<HistoryKey, Capability> {
        let map = self.snapshot.read();
        HistoryKey::ALL
            .into_iter()
            .map(|key| (key, map.get(&key).copied().unwrap_or_default()))
            .collect()
    }

    /// Read-only handle that observers can hold without seeing the service.
    pub fn state(&self) -> CapabilityState {
        CapabilityState {
            snapshot: self.snapshot.clone(),
        }
    }

    /// Publish a history event, ignoring the absence of observers.
    pub fn emit(&self, event: HistoryEvent) {
        // No subscribers is the normal headless case
        let _ = self.bus.publish(AppEvent::History(event));
    }

    fn store(&self, key: HistoryKey, capability: Capability) -> Capability {
        let previous = {
            let mut map = self.snapshot.write();
            map.insert(key, capability)
        };

        if previous.unwrap_or_default() != capability {
            tracing::debug!("History {}: {}", key, capability);
            self.emit(HistoryEvent::CapabilityChanged { key, capability });
        }
        capability
    }
}

impl std::fmt::Debug for CapabilityPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityPublisher")
            .field("snapshot", &*self.snapshot.read())
            .finish()
    }
}

/// Cloneable read-only view of the published capabilities.
#[derive(Clone)]
pub struct CapabilityState {
    snapshot: ThreadSafeRwMap<HistoryKey, Capability>,
}

impl CapabilityState {
    pub fn get(&self, key: HistoryKey) -> Capability {
        self.snapshot.read().get(&key).copied().unwrap_or_default()
    }

    pub fn can_undo(&self, key: HistoryKey) -> bool {
        self.get(key).can_undo
    }

    pub fn can_redo(&self, key: HistoryKey) -> bool {
        self.get(key).can_redo
    }
}

impl std::fmt::Debug for CapabilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CapabilityState")
            .field(&*self.snapshot.read())
            .finish()
    }
}
