//! Reactor Registry
//!
//! Maps each watched path to the reactors registered under it, in
//! registration order, plus a separate list of toplevel reactors that fire
//! on every action without a value.
//!
//! The registry is plain data. It does not invoke anything itself; the
//! dispatcher reads it to build a firing plan and the store invokes
//! reactors once its locks are released.

use indexmap::IndexMap;

use super::reactor::{Reactor, ReactorId};
use crate::state::Path;

/// Path-keyed reactor lists for one scope (the root store or a fork).
#[derive(Debug, Default)]
pub struct Registry {
    /// Distinct paths in first-registration order.
    reactors: IndexMap<Path, Vec<Reactor>>,
    /// Fire once per action, after path reactors, with no value.
    toplevel: Vec<Reactor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `reactor` to the list for `path`, creating the list if needed.
    pub fn register(&mut self, path: Path, reactor: Reactor) {
        self.reactors.entry(path).or_default().push(reactor);
    }

    /// Add a reactor that fires on every action.
    pub fn register_toplevel(&mut self, reactor: Reactor) {
        self.toplevel.push(reactor);
    }

    /// Remove the reactor with `id` from every list it appears in.
    ///
    /// Within one list only the first occurrence is removed. Paths whose list
    /// becomes empty are dropped so dispatch never visits them again.
    /// Returns whether anything was removed.
    pub fn unregister(&mut self, id: ReactorId) -> bool {
        let mut removed = remove_first(&mut self.toplevel, id);

        self.reactors.retain(|_, list| {
            removed |= remove_first(list, id);
            !list.is_empty()
        });

        removed
    }

    /// Registered paths, in first-registration order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.reactors.keys()
    }

    /// Path entries with their reactors, in first-registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&Path, &[Reactor])> {
        self.reactors.iter().map(|(p, list)| (p, list.as_slice()))
    }

    pub fn toplevel(&self) -> &[Reactor] {
        &self.toplevel
    }

    /// Total number of registrations, toplevel included.
    pub fn len(&self) -> usize {
        self.toplevel.len() + self.reactors.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration.
    pub fn clear(&mut self) {
        self.reactors.clear();
        self.toplevel.clear();
    }
}

fn remove_first(list: &mut Vec<Reactor>, id: ReactorId) -> bool {
    match list.iter().position(|r| r.id() == id) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reactor() -> Reactor {
        Reactor::new(|_| {})
    }

    #[test]
    fn register_keeps_insertion_order() {
        let mut registry = Registry::new();
        let a = reactor();
        let b = reactor();
        let c = reactor();

        registry.register("x".into(), a.clone());
        registry.register("y".into(), b.clone());
        registry.register("x".into(), c.clone());

        let paths: Vec<_> = registry.paths().cloned().collect();
        assert_eq!(paths, vec![Path::from("x"), Path::from("y")]);

        let (_, x) = registry.entries().next().unwrap();
        assert_eq!(x, [a, c].as_slice());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn unregister_removes_from_every_path() {
        let mut registry = Registry::new();
        let shared = reactor();
        let other = reactor();

        registry.register("a".into(), shared.clone());
        registry.register("b".into(), shared.clone());
        registry.register("b".into(), other.clone());

        assert!(registry.unregister(shared.id()));

        // "a" became empty and was dropped; "b" keeps the other reactor.
        let paths: Vec<_> = registry.paths().cloned().collect();
        assert_eq!(paths, vec![Path::from("b")]);
        assert_eq!(registry.len(), 1);

        assert!(!registry.unregister(shared.id()));
    }

    #[test]
    fn unregister_removes_first_duplicate_only() {
        let mut registry = Registry::new();
        let r = reactor();

        registry.register("a".into(), r.clone());
        registry.register("a".into(), r.clone());

        assert!(registry.unregister(r.id()));
        assert_eq!(registry.len(), 1);
        assert!(registry.unregister(r.id()));
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_toplevel() {
        let mut registry = Registry::new();
        let r = reactor();

        registry.register_toplevel(r.clone());
        assert_eq!(registry.toplevel().len(), 1);

        assert!(registry.unregister(r.id()));
        assert!(registry.toplevel().is_empty());
    }

    #[test]
    fn unregister_unknown_is_false() {
        let mut registry = Registry::new();
        registry.register(Path::whole(), reactor());
        assert!(!registry.unregister(reactor().id()));
        assert_eq!(registry.len(), 1);
    }
}
