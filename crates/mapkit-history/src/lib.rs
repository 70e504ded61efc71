//! # MapKit History
//!
//! Multi-timeline undo/redo engine. Every editing surface (main map, print
//! layout, shared views, export) owns an isolated [`Timeline`] addressed by a
//! [`HistoryKey`](mapkit_core::HistoryKey); the [`HistoryService`] is the single
//! entry point for producers (UI actions) and consumers (undo/redo controls).
//!
//! ## Architecture
//!
//! ```text
//! UI action ──► Changeset::new (captures "before" state)
//!          └──► HistoryService::execute(key, changeset)
//!                 ├── Timeline[key]  (single-flight per key)
//!                 │     ├── backward: [c1, c2, c3]   ◄── undo() pops c3
//!                 │     └── forward:  []             ◄── redo() replays c3
//!                 └── CapabilityPublisher ──► EventBus / CapabilityState
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let history = HistoryService::new(HistoryConfig::default(), bus.clone());
//! history.execute(HistoryKey::MainMap, AddLayer::new(&doc, layer, None).boxed()).await?;
//! assert!(history.can_undo(HistoryKey::MainMap));
//! history.undo(HistoryKey::MainMap).await?;
//! ```

pub mod capability;
pub mod changeset;
pub mod error;
pub mod service;
pub mod timeline;

pub use capability::{CapabilityPublisher, CapabilityState};
pub use changeset::{BoxedChangeset, Changeset, ChangesetError, ChangesetResult, CompositeChangeset};
pub use error::{HistoryError, HistoryResult};
pub use service::{HistoryConfig, HistoryService};
pub use timeline::Timeline;
