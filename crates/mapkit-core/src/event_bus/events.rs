//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable for logging/replay. History events
//! describe stack capability only; they never carry changeset contents.

use serde::{Deserialize, Serialize};

use crate::data::{Capability, HistoryKey};

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Undo/redo timeline changes
    History(HistoryEvent),
    /// Non-blocking user notifications
    Notification(NotificationEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::History(_) => EventCategory::History,
            AppEvent::Notification(_) => EventCategory::Notification,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::History(e) => e.description(),
            AppEvent::Notification(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Undo/redo timeline events.
    History,
    /// User notification events.
    Notification,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::History => write!(f, "History"),
            EventCategory::Notification => write!(f, "Notification"),
        }
    }
}

/// Timeline operation that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryOperation {
    /// A new changeset was recorded
    Register,
    /// The most recent changeset was reversed
    Undo,
    /// The most recently undone changeset was replayed
    Redo,
}

impl std::fmt::Display for HistoryOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryOperation::Register => write!(f, "register"),
            HistoryOperation::Undo => write!(f, "undo"),
            HistoryOperation::Redo => write!(f, "redo"),
        }
    }
}

/// Undo/redo timeline events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// The capability of a timeline differs from its last published value.
    CapabilityChanged {
        /// Editing surface whose timeline changed.
        key: HistoryKey,
        /// Freshly derived capability.
        capability: Capability,
    },
    /// A timeline was discarded (project load or reset).
    Cleared {
        /// Editing surface whose timeline was discarded.
        key: HistoryKey,
    },
    /// A timeline operation failed; the stacks were left untouched.
    OperationFailed {
        /// Editing surface the operation targeted.
        key: HistoryKey,
        /// Operation that failed.
        operation: HistoryOperation,
        /// Error message for diagnostics.
        message: String,
    },
}

impl HistoryEvent {
    fn description(&self) -> String {
        match self {
            HistoryEvent::CapabilityChanged { key, capability } => {
                format!("History {}: {}", key, capability)
            }
            HistoryEvent::Cleared { key } => format!("History {} cleared", key),
            HistoryEvent::OperationFailed {
                key,
                operation,
                message,
            } => format!("History {} {} failed: {}", key, operation, message),
        }
    }
}

/// Severity of a user notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationLevel {
    /// Informational message.
    Info,
    /// Something the user may want to check.
    Warning,
    /// An action failed.
    Error,
}

/// A non-blocking notification (toast) for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Severity.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub message: String,
}

impl NotificationEvent {
    /// Create an error-level notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// Create an info-level notification.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    fn description(&self) -> String {
        format!("{:?}: {}", self.level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_categories() {
        let event = AppEvent::History(HistoryEvent::Cleared {
            key: HistoryKey::Layout,
        });
        assert_eq!(event.category(), EventCategory::History);

        let event = AppEvent::Notification(NotificationEvent::error("Undo failed"));
        assert_eq!(event.category(), EventCategory::Notification);
    }

    #[test]
    fn test_event_descriptions() {
        let event = AppEvent::History(HistoryEvent::CapabilityChanged {
            key: HistoryKey::MainMap,
            capability: Capability::from_depths(1, 0),
        });
        assert_eq!(event.description(), "History main-map: undo=true redo=false");

        let event = AppEvent::History(HistoryEvent::OperationFailed {
            key: HistoryKey::SharedViews,
            operation: HistoryOperation::Undo,
            message: "view missing".to_string(),
        });
        assert_eq!(
            event.description(),
            "History shared-views undo failed: view missing"
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::History(HistoryEvent::CapabilityChanged {
            key: HistoryKey::Export,
            capability: Capability::from_depths(0, 3),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"export\""));
        let back: AppEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
