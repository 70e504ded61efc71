//! Publish/subscribe bus for history and notification events.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};
use crate::types::{thread_safe_rw_map, ThreadSafeRwMap};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0.simple())
    }
}

/// Which events a handler wants to see.
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Every event.
    #[default]
    All,
    /// Events in any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

/// Bus tuning, usually filled from the `event_bus` settings section.
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Buffer size of the async broadcast channel.
    pub channel_capacity: usize,
    /// Keep a log of recently published events.
    pub enable_history: bool,
    /// Upper bound on logged events.
    pub max_history_size: usize,
    /// Logged events older than this are dropped.
    pub history_retention: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            enable_history: false,
            max_history_size: 1000,
            history_retention: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    /// Neither a handler nor an async receiver is attached.
    #[error("No active subscribers")]
    NoSubscribers,
}

struct Subscriber {
    filter: EventFilter,
    handler: Box<dyn Fn(AppEvent) + Send + Sync>,
}

/// Log of recent events, bounded by count and by age.
struct RecentEvents {
    entries: VecDeque<(Instant, AppEvent)>,
    max_len: usize,
    retention: Duration,
}

impl RecentEvents {
    fn record(&mut self, event: AppEvent) {
        let now = Instant::now();
        self.entries.push_back((now, event));

        let cutoff = now.checked_sub(self.retention);
        while let Some((at, _)) = self.entries.front() {
            let expired = cutoff.is_some_and(|cutoff| *at < cutoff);
            if !expired && self.entries.len() <= self.max_len {
                break;
            }
            self.entries.pop_front();
        }
    }

    fn since(&self, since: Option<Instant>) -> Vec<AppEvent> {
        self.entries
            .iter()
            .filter(|(at, _)| since.is_none_or(|since| *at >= since))
            .map(|(_, event)| event.clone())
            .collect()
    }
}

/// Event bus shared by every publisher of one editor session.
///
/// Synchronous handlers run on the publishing thread; async observers take a
/// [`broadcast::Receiver`] from [`EventBus::receiver`].
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    subscribers: ThreadSafeRwMap<SubscriptionId, Subscriber>,
    /// `None` unless recording is enabled.
    recent: Option<Mutex<RecentEvents>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        let recent = config.enable_history.then(|| {
            Mutex::new(RecentEvents {
                entries: VecDeque::new(),
                max_len: config.max_history_size,
                retention: config.history_retention,
            })
        });
        Self {
            sender,
            subscribers: thread_safe_rw_map(),
            recent,
        }
    }

    /// Deliver `event` to matching handlers and to every async receiver.
    ///
    /// Returns the number of async receivers reached. Fails only when nobody
    /// at all is attached.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        tracing::trace!("Publishing {}", event.description());

        if let Some(recent) = &self.recent {
            recent.lock().record(event.clone());
        }

        let has_handlers = {
            let subscribers = self.subscribers.read();
            for subscriber in subscribers.values() {
                if subscriber.filter.matches(&event) {
                    (subscriber.handler)(event.clone());
                }
            }
            !subscribers.is_empty()
        };

        match self.sender.send(event) {
            Ok(receivers) => Ok(receivers),
            Err(_) if has_handlers => Ok(0),
            Err(_) => Err(EventBusError::NoSubscribers),
        }
    }

    /// Register a synchronous handler.
    ///
    /// The handler must return quickly and must not publish on the same bus.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.write().insert(
            id,
            Subscriber {
                filter,
                handler: Box::new(handler),
            },
        );
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Receiver for an async observer running in a tokio task.
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Recorded events, oldest first; empty when recording is off.
    pub fn history(&self, since: Option<Instant>) -> Vec<AppEvent> {
        self.recent
            .as_ref()
            .map(|recent| recent.lock().since(since))
            .unwrap_or_default()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.read().len())
            .field("recording", &self.recent.is_some())
            .finish()
    }
}
