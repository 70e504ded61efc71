//! # Event Bus Module
//!
//! Provides the event bus used for decoupled communication between the
//! history engine and the presentation layer.
//!
//! ## Overview
//!
//! - Publishers emit typed events without knowing subscribers
//! - Subscribers filter and receive events of interest
//! - Supports both sync handlers and async receivers
//!
//! There is no global instance: the application builds one bus at startup and
//! hands an `Arc<EventBus>` to each publisher.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mapkit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter, HistoryEvent};
//!
//! let bus = Arc::new(EventBus::new());
//!
//! // Keep the undo/redo buttons in sync
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::History]),
//!     |event| {
//!         if let AppEvent::History(HistoryEvent::CapabilityChanged { key, capability }) = event {
//!             println!("{}: {}", key, capability);
//!         }
//!     },
//! );
//!
//! // Unsubscribe when the panel closes
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
