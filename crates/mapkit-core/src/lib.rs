//! # MapKit Core
//!
//! Core types, traits, and utilities for MapKit.
//! Provides the history key space shared by every editing surface, the
//! undo/redo capability record, and the event bus the presentation layer
//! observes.

pub mod data;
pub mod event_bus;
pub mod types;

pub use data::{Capability, HistoryKey};

pub use event_bus::{
    AppEvent, EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter, HistoryEvent,
    HistoryOperation, NotificationEvent, NotificationLevel, SubscriptionId,
};

pub use types::{thread_safe_rw, thread_safe_rw_map, ThreadSafeRw, ThreadSafeRwMap};
