//! Forks: child scopes over a store.
//!
//! A fork shares the store's state and reducer but keeps its reactors in a
//! registry of its own, so a whole group of reactors can be dropped in one
//! call to [`Store::destroy`]. A fork created with a prefix sees the store
//! through that prefix: `get("name")` on a fork at `"user"` reads
//! `"user.name"`, and reactors are registered the same way.

use std::fmt;
use std::sync::Arc;

use super::root::Store;
use super::trace::TraceRecord;
use crate::error::Result;
use crate::reactive::{Reactor, Scope, ScopeId};
use crate::state::{Path, Value};

/// A handle to a fork. Cloning it yields another handle to the same fork.
#[derive(Clone)]
pub struct Fork {
    store: Store,
    scope: Arc<Scope>,
}

impl Fork {
    pub(crate) fn new(store: Store, scope: Arc<Scope>) -> Self {
        Self { store, scope }
    }

    pub fn id(&self) -> ScopeId {
        self.scope.id()
    }

    /// The path every fork-relative path is resolved under.
    pub fn prefix(&self) -> &Path {
        self.scope.prefix()
    }

    /// The store this fork was created from.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// False once the fork has been destroyed.
    pub fn is_live(&self) -> bool {
        self.scope.is_live()
    }

    /// The value at `prefix.path`.
    pub fn get(&self, path: impl Into<Path>) -> Value {
        self.store.get(self.scope.qualify(&path.into()))
    }

    /// The value at the fork's prefix.
    pub fn state(&self) -> Value {
        self.get(Path::whole())
    }

    /// Apply an action on the parent store.
    pub fn act(&self, kind: impl Into<String>, payload: impl Into<Value>) -> Result<Value> {
        self.store.act(kind, payload)
    }

    /// Alias of [`Fork::act`].
    pub fn event(&self, kind: impl Into<String>, payload: impl Into<Value>) -> Result<Value> {
        self.store.act(kind, payload)
    }

    /// Run `f` whenever the value at `prefix.path` changes.
    ///
    /// Like [`Store::react`], `f` runs once right away with the current value.
    pub fn react<F>(&self, path: impl Into<Path>, f: F) -> Reactor
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.store.register(&self.scope, path.into(), Reactor::new(f))
    }

    /// Run `f` with the fork's view after every action.
    ///
    /// On an unprefixed fork this fires on every action. On a prefixed fork
    /// the prefix is a real path, so it fires when the value under the
    /// prefix changes.
    pub fn react_all<F>(&self, f: F) -> Reactor
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.react(Path::whole(), f)
    }

    /// Register an existing reactor under another fork-relative path.
    pub fn react_with(&self, path: impl Into<Path>, reactor: &Reactor) -> Reactor {
        self.store.register(&self.scope, path.into(), reactor.clone())
    }

    /// Run `f` after every action, after all path reactors of this fork.
    pub fn on_action<F>(&self, f: F) -> Reactor
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.store.register_listener(&self.scope, Reactor::listener(f))
    }

    /// Remove `reactor` from this fork's registry.
    pub fn unreact(&self, reactor: &Reactor) -> bool {
        self.scope.registry().write().unregister(reactor.id())
    }

    /// Alias of [`Fork::unreact`].
    pub fn clear(&self, reactor: &Reactor) -> bool {
        self.unreact(reactor)
    }

    /// Create a sibling fork with the same prefix.
    pub fn fork(&self) -> Fork {
        self.store.fork_at(self.scope.prefix().clone())
    }

    /// Create a fork at `prefix.sub`.
    pub fn fork_at(&self, sub: impl Into<Path>) -> Fork {
        self.store.fork_at(self.scope.qualify(&sub.into()))
    }

    /// Destroy `fork` on the parent store.
    pub fn destroy(&self, fork: &Fork) -> bool {
        self.store.destroy(fork)
    }

    /// See [`Store::eventlog`].
    pub fn eventlog<F>(&self, f: F)
    where
        F: FnMut(Result<TraceRecord>),
    {
        self.store.eventlog(f)
    }
}

impl PartialEq for Fork {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Fork {}

impl fmt::Debug for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fork")
            .field("id", &self.id())
            .field("prefix", &self.prefix().to_string())
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicI32, Ordering};

    fn store() -> Store {
        Store::new(
            |state, kind, payload| Ok(state.with_path(kind, payload.clone())),
            Value::from(json!({"a": 1, "b": 2, "user": {"name": "ann", "age": 30}})),
        )
    }

    fn counter() -> (Arc<AtomicI32>, impl Fn(&Value) + Send + Sync + 'static) {
        let count = Arc::new(AtomicI32::new(0));
        let count_clone = count.clone();
        (count, move |_: &Value| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn fork_reacts_to_its_paths_only() {
        let store = store();
        let fork = store.fork();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        fork.react("a", move |v| seen_clone.lock().push(v.clone()));
        assert_eq!(*seen.lock(), vec![Value::from(1)]);

        store.act("b", 5).unwrap();
        assert_eq!(seen.lock().len(), 1);

        store.act("a", 7).unwrap();
        assert_eq!(*seen.lock(), vec![Value::from(1), Value::from(7)]);
    }

    #[test]
    fn fork_and_root_both_fire() {
        let store = store();
        let fork = store.fork();
        let (root_count, root_fn) = counter();
        let (fork_count, fork_fn) = counter();

        store.react("a", root_fn);
        fork.react("a", fork_fn);

        fork.act("a", 2).unwrap();
        assert_eq!(root_count.load(Ordering::SeqCst), 2);
        assert_eq!(fork_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn prefixed_fork_reads_and_reacts_under_prefix() {
        let store = store();
        let user = store.fork_at("user");

        assert_eq!(user.get("name"), Value::from("ann"));
        assert_eq!(user.state().get("age"), Value::from(30));
        assert_eq!(user.prefix(), &Path::from("user"));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        user.react("name", move |v| seen_clone.lock().push(v.clone()));

        store.act("user.age", 31).unwrap();
        store.act("user.name", "bo").unwrap();
        assert_eq!(*seen.lock(), vec![Value::from("ann"), Value::from("bo")]);
    }

    #[test]
    fn nested_prefixes_compose() {
        let store = store();
        let user = store.fork_at("user");
        let nested = user.fork_at("name");

        assert_eq!(nested.prefix(), &Path::from("user.name"));
        assert_eq!(nested.state(), Value::from("ann"));
        assert_eq!(user.fork().prefix(), &Path::from("user"));
        assert_eq!(store.fork_count(), 3);
    }

    #[test]
    fn destroyed_fork_stops_firing() {
        let store = store();
        let fork = store.fork();
        let (count, f) = counter();

        fork.react("a", f);
        assert!(store.destroy(&fork));
        assert!(!fork.is_live());
        assert_eq!(store.fork_count(), 0);

        store.act("a", 9).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn destroy_unknown_fork_is_noop() {
        let other = store().fork();
        let store = store();
        let fork = store.fork();

        assert!(!store.destroy(&other));
        assert!(store.destroy(&fork));
        assert!(!store.destroy(&fork));
        assert_eq!(store.fork_count(), 0);
    }

    #[test]
    fn destroying_a_fork_leaves_others() {
        let store = store();
        let keep = store.fork();
        let drop_me = store.fork();
        let (keep_count, keep_fn) = counter();
        let (drop_count, drop_fn) = counter();

        keep.react("a", keep_fn);
        drop_me.react("a", drop_fn);
        keep.destroy(&drop_me);

        store.act("a", 3).unwrap();
        assert_eq!(keep_count.load(Ordering::SeqCst), 2);
        assert_eq!(drop_count.load(Ordering::SeqCst), 1);
        assert_eq!(store.get("a"), Value::from(3));
    }

    #[test]
    fn unreact_is_scoped_to_the_fork() {
        let store = store();
        let fork = store.fork();
        let (count, f) = counter();

        let reactor = store.react("a", f);
        // Not registered on the fork.
        assert!(!fork.unreact(&reactor));

        fork.react_with("b", &reactor);
        assert!(fork.unreact(&reactor));
        assert!(store.unreact(&reactor));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fork_destroyed_mid_dispatch_is_skipped() {
        let store = store();
        let fork = store.fork();
        let (count, f) = counter();
        fork.react("a", f);

        let handle = store.clone();
        let victim = fork.clone();
        store.react("a", move |v| {
            if v.as_f64() == Some(2.0) {
                handle.destroy(&victim);
            }
        });
        assert!(fork.is_live());

        // Root reactors run first and destroy the fork before its turn.
        store.act("a", 2).unwrap();
        assert!(!fork.is_live());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fork_on_action() {
        let store = store();
        let fork = store.fork_at("user");
        let calls = Arc::new(AtomicI32::new(0));
        let calls_clone = calls.clone();

        fork.on_action(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        store.act("a", 1).unwrap();
        store.act("b", 1).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
