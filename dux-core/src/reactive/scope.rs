//! Reactor scopes.
//!
//! A scope owns one [`Registry`] and the path prefix its reactors are
//! registered under. The root store has a scope with the whole-state prefix;
//! every fork gets a scope of its own. Scopes never hold state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;

use super::registry::Registry;
use crate::state::Path;

/// Unique identifier for a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A private registry plus the prefix its paths are rewritten under.
#[derive(Debug)]
pub struct Scope {
    id: ScopeId,
    prefix: Path,
    registry: RwLock<Registry>,
    /// Cleared on destroy. A dead scope is skipped by dispatch even if a
    /// snapshot of the fork list still references it.
    live: AtomicBool,
}

impl Scope {
    pub fn new(prefix: Path) -> Self {
        Self {
            id: ScopeId::new(),
            prefix,
            registry: RwLock::new(Registry::new()),
            live: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Rewrite a scope-relative path into a store path.
    pub fn qualify(&self, path: &Path) -> Path {
        self.prefix.join(path)
    }

    pub fn registry(&self) -> &RwLock<Registry> {
        &self.registry
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Mark the scope dead and discard its registrations.
    pub fn kill(&self) {
        self.live.store(false, Ordering::SeqCst);
        self.registry.write().clear();
    }
}
