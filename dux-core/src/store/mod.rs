//! Store and Forks
//!
//! The store is the only place state changes. It pairs the current snapshot
//! with a reducer and the root reactor scope, and hands out forks that add
//! scopes of their own.
//!
//! # Applying an action
//!
//! 1. The reducer computes the next snapshot from the current one. If it
//!    fails, the action is traced and nothing else happens.
//! 2. The `(old, new)` pair is queued for dispatch. If the queue is full the
//!    action is dropped untraced.
//! 3. If tracing is on, the action is appended to the trace, and the new
//!    snapshot replaces the old one.
//! 4. Whoever owns the drain dispatches queued pairs to the root scope and
//!    then to every live fork, in creation order.
//!
//! Steps 1 to 3 happen under the state lock, so concurrent callers are
//! serialized and their transitions are dispatched in the order they were
//! applied. A caller that finds a drain already running returns once its
//! pair is queued; the running drain dispatches it.
//!
//! # Forks
//!
//! A fork never owns state. It reads and acts through its store, optionally
//! under a path prefix, and owns only its reactors. Destroying a fork drops
//! its reactors for good and leaves the state and other forks alone.
//!
//! # Tracing
//!
//! With tracing on, the store keeps the state it had when tracing started and
//! every action since. [`Store::eventlog`] replays those actions through the
//! reducer to rebuild each intermediate state, without touching the live one.

mod fork;
mod root;
mod trace;

pub use fork::Fork;
pub use root::{create_store, reducer, Reducer, Store};
pub use trace::{Action, Trace, TraceRecord};
