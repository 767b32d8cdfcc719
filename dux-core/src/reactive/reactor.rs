//! Reactor handles.
//!
//! A Reactor is a callback that runs when the value at a watched path
//! changes. Reactors are identified by id, not by the closure they wrap, so
//! one handle can be registered under several paths and removed from all of
//! them in a single call.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::state::Value;

/// Unique identifier for a reactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReactorId(u64);

impl ReactorId {
    /// Generate a new unique reactor ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ReactorId {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered (or registrable) state reactor.
///
/// Cloning is cheap and keeps the same id.
#[derive(Clone)]
pub struct Reactor {
    id: ReactorId,
    /// Invoked with the new value at the watched path.
    callback: Arc<dyn Fn(&Value) + Send + Sync>,
}

impl Reactor {
    /// Create a reactor from a callback that receives the new value.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Self {
            id: ReactorId::new(),
            callback: Arc::new(callback),
        }
    }

    /// Create a reactor whose callback takes no value.
    ///
    /// Used for "something happened" listeners that fire on every action.
    pub fn listener<F>(callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::new(move |_| callback())
    }

    pub fn id(&self) -> ReactorId {
        self.id
    }

    /// Invoke the callback.
    pub fn call(&self, value: &Value) {
        (self.callback)(value);
    }
}

impl PartialEq for Reactor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Reactor {}

impl fmt::Debug for Reactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactor").field("id", &self.id).finish()
    }
}
