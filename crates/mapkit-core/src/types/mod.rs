//! Type aliases for commonly used shared-state types.
//!
//! Nested wrappers such as `Arc<RwLock<HashMap<K, V>>>` appear in every crate
//! that shares state between the history engine, the document model and the
//! presentation layer. The aliases give those shapes one name each.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mapkit_core::types::*;
//!
//! // Instead of: Arc<RwLock<DocumentState>>
//! let state: ThreadSafeRw<DocumentState> = thread_safe_rw(DocumentState::default());
//! ```

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A thread-safe reader-writer lock wrapper for read-heavy workloads.
///
/// The document model and the capability snapshot are read far more often
/// than they are written. Uses `parking_lot::RwLock`, which never poisons.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

/// A thread-safe reader-writer hash map.
pub type ThreadSafeRwMap<K, V> = Arc<RwLock<HashMap<K, V>>>;

/// Wrap a value in [`ThreadSafeRw`].
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}

/// Create an empty [`ThreadSafeRwMap`].
pub fn thread_safe_rw_map<K, V>() -> ThreadSafeRwMap<K, V> {
    Arc::new(RwLock::new(HashMap::new()))
}
