//! Type aliases for commonly used shared-ownership types.
//!
//! The editing engine runs on the host's UI thread, so most shared state is
//! `Rc<RefCell<T>>`. State touched by background persistence tasks uses
//! a `parking_lot` lock behind an `Arc`.
//!
//! ## Usage
//!
//! ```rust
//! use fieldkit_core::types::{shared, Shared};
//!
//! let counter: Shared<u32> = shared(0);
//! *counter.borrow_mut() += 1;
//! assert_eq!(*counter.borrow(), 1);
//! ```

use parking_lot::RwLock;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

// =============================================================================
// SINGLE-THREADED SHARED TYPES (Rc<RefCell<T>>)
// =============================================================================

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
///
/// Used for state shared between host callbacks on the UI thread, such as the
/// polygon registry wired to map pointer events.
pub type Shared<T> = Rc<RefCell<T>>;

// =============================================================================
// THREAD-SAFE SHARED TYPES (Arc<RwLock<T>>)
// =============================================================================

/// A thread-safe reader-writer hash map, shared with persistence tasks.
pub type ThreadSafeRwMap<K, V> = Arc<RwLock<HashMap<K, V>>>;

// =============================================================================
// CALLBACK TYPES
// =============================================================================

/// A UI-thread callback receiving a single parameter.
pub type UiDataCallback<T> = Box<dyn Fn(T)>;

// =============================================================================
// CONSTRUCTOR HELPERS
// =============================================================================

/// Create a new `Shared<T>` from a value.
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Create a new empty `ThreadSafeRwMap<K, V>`.
#[inline]
pub fn thread_safe_rw_map<K, V>() -> ThreadSafeRwMap<K, V> {
    Arc::new(RwLock::new(HashMap::new()))
}
