//! Dispatcher
//!
//! Given the state before and after an action, decide which reactors fire
//! and with what value.
//!
//! # How It Works
//!
//! 1. For each scope (root first, then every live fork), take a read lock on
//!    its registry and build a firing plan:
//!    a. whole-state entries always fire with the new state
//!    b. other paths are resolved against both snapshots and fire only when
//!       the two values are not loosely equal
//!    c. toplevel reactors fire last, with no value
//!
//! 2. Release the lock, then invoke the plan in order. Reactors are free to
//!    call back into the store while they run.
//!
//! # Nested actions
//!
//! An action applied from inside a reactor is not dispatched immediately.
//! Its transition goes on the [`DispatchQueue`] and the thread that is
//! already draining the queue dispatches it once the current transition is
//! done. Every transition is dispatched exactly once, in the order the
//! reducer produced it.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::reactor::Reactor;
use super::registry::Registry;
use super::scope::Scope;
use crate::error::StoreError;
use crate::state::{resolve, Value};

/// A group of reactors to invoke with one value.
#[derive(Debug, Clone)]
pub struct Firing {
    pub value: Value,
    pub reactors: Vec<Reactor>,
}

/// Build the firing plan for one registry.
pub fn plan(registry: &Registry, old: &Value, new: &Value) -> Vec<Firing> {
    let mut firings = Vec::new();

    for (path, reactors) in registry.entries() {
        if path.is_whole() {
            firings.push(Firing {
                value: new.clone(),
                reactors: reactors.to_vec(),
            });
            continue;
        }

        let before = resolve(old, path);
        let after = resolve(new, path);
        if !before.loosely_eq(&after) {
            firings.push(Firing {
                value: after,
                reactors: reactors.to_vec(),
            });
        }
    }

    if !registry.toplevel().is_empty() {
        firings.push(Firing {
            value: Value::Undefined,
            reactors: registry.toplevel().to_vec(),
        });
    }

    firings
}

/// Dispatch one transition against one scope. Returns how many reactor
/// invocations were made.
pub fn dispatch_scope(scope: &Scope, old: &Value, new: &Value) -> usize {
    if !scope.is_live() {
        return 0;
    }

    let firings = plan(&scope.registry().read(), old, new);

    let mut fired = 0;
    for firing in &firings {
        for reactor in &firing.reactors {
            reactor.call(&firing.value);
            fired += 1;
        }
    }

    tracing::trace!(scope = ?scope.id(), fired, "dispatched transition");
    fired
}

/// Dispatch one transition to every scope, in order.
pub fn dispatch(scopes: &[Arc<Scope>], old: &Value, new: &Value) -> usize {
    scopes
        .iter()
        .map(|scope| dispatch_scope(scope, old, new))
        .sum()
}

/// A state change waiting to be dispatched.
#[derive(Debug, Clone)]
pub struct Transition {
    pub old: Value,
    pub new: Value,
}

#[derive(Debug, Default)]
struct QueueState {
    draining: bool,
    pending: VecDeque<Transition>,
}

/// FIFO of transitions with a single drainer at a time.
#[derive(Debug)]
pub struct DispatchQueue {
    state: Mutex<QueueState>,
    limit: usize,
}

impl DispatchQueue {
    /// Create a queue that holds at most `limit` transitions while a drain
    /// is in progress.
    pub fn new(limit: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            limit,
        }
    }

    /// Enqueue a transition.
    ///
    /// Returns `Ok(Some(guard))` when the caller must drain the queue (no one
    /// else is draining), `Ok(None)` when an active drain will pick it up.
    /// Fails without enqueuing when the queue is full.
    pub fn push(&self, transition: Transition) -> Result<Option<DrainGuard<'_>>, StoreError> {
        let mut state = self.state.lock();

        if state.draining && state.pending.len() >= self.limit {
            return Err(StoreError::QueueOverflow { limit: self.limit });
        }

        state.pending.push_back(transition);

        if state.draining {
            Ok(None)
        } else {
            state.draining = true;
            Ok(Some(DrainGuard {
                queue: self,
                finished: false,
            }))
        }
    }

    pub fn is_draining(&self) -> bool {
        self.state.lock().draining
    }

    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive right to drain a [`DispatchQueue`].
///
/// Dropping an unfinished guard, as happens during a panic in a reactor,
/// releases the drain and discards anything still queued. Once
/// [`DrainGuard::next`] has returned `None` the guard no longer owns the
/// drain and its drop leaves the queue alone.
pub struct DrainGuard<'a> {
    queue: &'a DispatchQueue,
    finished: bool,
}

impl DrainGuard<'_> {
    /// Pop the next transition, or `None` once the queue is empty.
    ///
    /// Returning `None` also ends the drain, so a transition pushed after
    /// this point starts a new one.
    pub fn next(&mut self) -> Option<Transition> {
        if self.finished {
            return None;
        }
        let mut state = self.queue.state.lock();
        let next = state.pending.pop_front();
        if next.is_none() {
            state.draining = false;
            self.finished = true;
        }
        next
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // Only reachable when unwinding out of a reactor.
        let mut state = self.queue.state.lock();
        if state.draining {
            state.draining = false;
            state.pending.clear();
        }
    }
}
