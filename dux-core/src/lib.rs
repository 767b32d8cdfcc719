//! Dux Core
//!
//! A minimal reactive state container. It provides:
//!
//! - A single current state, replaced wholesale by a pure reducer on every
//!   action
//! - Reactors that run when the value at a path in the state changes
//! - Forks: child scopes with their own reactors, optionally rooted at a
//!   path prefix, that can be torn down in one call
//! - An optional action trace that can be replayed against the reducer
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `state`: state values and paths into them
//! - `reactive`: reactors, registries, and the dispatcher
//! - `store`: the store, forks, and action tracing
//!
//! # Example
//!
//! ```rust,ignore
//! use dux_core::{create_store, Value};
//!
//! let store = create_store(
//!     |state, kind, payload| match kind {
//!         "inc" => {
//!             let n = state.get("n").as_f64().unwrap_or(0.0);
//!             Ok(state.with("n", n + payload.as_f64().unwrap_or(1.0)))
//!         }
//!         _ => Ok(state.clone()),
//!     },
//!     Value::map().with("n", 0),
//! );
//!
//! // Runs right away with 0, then after every change to `n`.
//! store.react("n", |n| println!("n = {n:?}"));
//!
//! store.act("inc", 5)?;
//! // Prints: "n = 5"
//! ```

pub mod config;
pub mod error;
pub mod reactive;
pub mod state;
pub mod store;

pub use config::StoreConfig;
pub use error::{BoxError, StoreError};
pub use reactive::{Reactor, ReactorId};
pub use state::{resolve, Path, Value};
pub use store::{create_store, reducer, Action, Fork, Reducer, Store, Trace, TraceRecord};
