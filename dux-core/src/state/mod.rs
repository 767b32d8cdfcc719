//! State Tree
//!
//! The data a store holds: immutable snapshots made of [`Value`] nodes, and
//! [`Path`]s that address locations inside them.
//!
//! # Snapshots
//!
//! Every action produces a new snapshot. Reducers never mutate the old one;
//! they call the copy-on-write helpers on [`Value`] which rebuild only the
//! containers along the written path. Untouched subtrees keep their identity,
//! which is what the dispatcher relies on to decide that nothing below them
//! changed.
//!
//! # Path resolution
//!
//! [`resolve`] walks a path segment by segment and stops at the first falsy
//! value. It is an approximation of "read this location", not a has-path
//! test: a zero or empty string part-way down is returned as-is.

mod path;
mod value;

pub use path::{resolve, Path};
pub use value::{Map, Value};
