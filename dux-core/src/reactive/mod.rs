//! Reactor Dispatch
//!
//! This module implements the change-notification half of the store:
//! reactors, the registries they live in, and the dispatcher that decides
//! which of them fire after an action.
//!
//! # Concepts
//!
//! ## Reactors
//!
//! A Reactor is a callback attached to a path in the state tree. After every
//! action the value at that path is read from the old and the new snapshot;
//! if the two differ, the reactor runs with the new value. Reactors attached
//! to the whole-state path run after every action. Toplevel reactors run
//! after every action too, but without a value.
//!
//! ## Scopes
//!
//! Reactors are grouped into scopes. The root store has one, and each fork
//! adds another with its own registry and optional path prefix. All scopes
//! see the same old/new pair for a given action. Destroying a fork kills its
//! scope; dispatch never reaches it again.
//!
//! # Implementation Notes
//!
//! Change detection is shallow on purpose: it is O(1) per watched path and
//! never diffs subtrees. Reducers must therefore replace any container they
//! change (see [`crate::state::Value::with_path`]).

mod dispatch;
mod reactor;
mod registry;
mod scope;

pub use dispatch::{dispatch, dispatch_scope, plan, DispatchQueue, DrainGuard, Firing, Transition};
pub use reactor::{Reactor, ReactorId};
pub use registry::Registry;
pub use scope::{Scope, ScopeId};
