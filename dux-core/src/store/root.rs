//! The root store.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use super::fork::Fork;
use super::trace::{Action, Trace, TraceRecord};
use crate::config::StoreConfig;
use crate::error::{BoxError, Result, StoreError};
use crate::reactive::{dispatch, DispatchQueue, Reactor, Scope, Transition};
use crate::state::{resolve, Path, Value};

/// A pure state transition: `(state, action type, payload) -> new state`.
pub type Reducer = Arc<dyn Fn(&Value, &str, &Value) -> Result<Value, BoxError> + Send + Sync>;

/// Wrap a closure as a [`Reducer`].
pub fn reducer<F>(f: F) -> Reducer
where
    F: Fn(&Value, &str, &Value) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Create a store with the default configuration.
pub fn create_store<F>(reducer: F, initial_state: impl Into<Value>) -> Store
where
    F: Fn(&Value, &str, &Value) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    Store::new(reducer, initial_state)
}

struct Inner {
    state: RwLock<Value>,
    reducer: Reducer,
    root: Arc<Scope>,
    /// Live fork scopes, in creation order.
    forks: RwLock<Vec<Arc<Scope>>>,
    queue: DispatchQueue,
    trace: Mutex<Option<Trace>>,
}

/// Holds the current state, applies actions through the reducer, and
/// notifies reactors.
///
/// Cloning a `Store` yields another handle to the same store.
///
/// # Example
///
/// ```rust,ignore
/// let store = create_store(
///     |state, kind, payload| match kind {
///         "rename" => Ok(state.with_path("user.name", payload.clone())),
///         _ => Ok(state.clone()),
///     },
///     Value::map(),
/// );
///
/// store.react("user.name", |name| println!("name is now {name:?}"));
/// store.act("rename", "ann")?;
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Store {
    pub fn new<F>(reducer: F, initial_state: impl Into<Value>) -> Self
    where
        F: Fn(&Value, &str, &Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::with_config(reducer, initial_state, StoreConfig::default())
    }

    pub fn with_config<F>(reducer: F, initial_state: impl Into<Value>, config: StoreConfig) -> Self
    where
        F: Fn(&Value, &str, &Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::from_reducer(Arc::new(reducer), initial_state, config)
    }

    /// Build a store around an already shared reducer.
    pub fn from_reducer(reducer: Reducer, initial_state: impl Into<Value>, config: StoreConfig) -> Self {
        let state = initial_state.into();
        let trace = config.trace.then(|| Trace::new(state.clone()));

        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                reducer,
                root: Arc::new(Scope::new(Path::whole())),
                forks: RwLock::new(Vec::new()),
                queue: DispatchQueue::new(config.max_pending),
                trace: Mutex::new(trace),
            }),
        }
    }

    /// The whole current state.
    pub fn state(&self) -> Value {
        self.inner.state.read().clone()
    }

    /// The value at `path` in the current state. The whole-state path
    /// returns the entire state.
    pub fn get(&self, path: impl Into<Path>) -> Value {
        resolve(&self.inner.state.read(), &path.into())
    }

    /// Apply an action and dispatch the change.
    ///
    /// The reducer runs once; if it fails the error is returned and the state
    /// is left as it was. On success every reactor whose path changed runs
    /// before this returns, unless a dispatch is already in progress. That is
    /// the case for a call from inside a reactor, and also for a call from
    /// another thread while this store is draining. Such a call applies the
    /// new state, queues its dispatch behind the one in progress, and returns
    /// before its reactors run.
    ///
    /// At most [`StoreConfig::max_pending`] dispatches can wait behind an
    /// active drain. Past that the call fails with
    /// [`StoreError::QueueOverflow`], the state is left as it was and the
    /// action is not traced.
    pub fn act(&self, kind: impl Into<String>, payload: impl Into<Value>) -> Result<Value> {
        let action = Action::new(kind, payload);
        let inner = &*self.inner;

        let (new, drain) = {
            let mut state = inner.state.write();
            let record = || {
                if let Some(trace) = inner.trace.lock().as_mut() {
                    trace.record(action.clone());
                }
            };

            let new = match (inner.reducer)(&*state, &action.kind, &action.payload) {
                Ok(new) => new,
                Err(source) => {
                    // Failed actions are traced; replay reports them.
                    record();
                    warn!(action = %action.kind, error = %source, "reducer failed");
                    return Err(StoreError::Reducer {
                        action: action.kind.clone(),
                        source,
                    });
                }
            };

            let transition = Transition {
                old: (*state).clone(),
                new: new.clone(),
            };
            let drain = inner.queue.push(transition).map_err(|e| {
                warn!(action = %action.kind, error = %e, "dispatch queue full, dropping action");
                e
            })?;

            record();
            *state = new.clone();
            (new, drain)
        };

        debug!(action = %action.kind, queued = drain.is_none(), "applied action");

        if let Some(mut guard) = drain {
            while let Some(transition) = guard.next() {
                dispatch(&self.scopes(), &transition.old, &transition.new);
            }
        }

        Ok(new)
    }

    /// Alias of [`Store::act`].
    pub fn event(&self, kind: impl Into<String>, payload: impl Into<Value>) -> Result<Value> {
        self.act(kind, payload)
    }

    /// Run `f` whenever the value at `path` changes.
    ///
    /// `f` is called once right away with the current value. The returned
    /// handle can be passed to [`Store::unreact`] or registered under more
    /// paths with [`Store::react_with`].
    pub fn react<F>(&self, path: impl Into<Path>, f: F) -> Reactor
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.register(&self.inner.root, path.into(), Reactor::new(f))
    }

    /// Run `f` with the whole state after every action.
    pub fn react_all<F>(&self, f: F) -> Reactor
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.react(Path::whole(), f)
    }

    /// Register an existing reactor under another path.
    pub fn react_with(&self, path: impl Into<Path>, reactor: &Reactor) -> Reactor {
        self.register(&self.inner.root, path.into(), reactor.clone())
    }

    /// Run `f` after every action, after all path reactors.
    pub fn on_action<F>(&self, f: F) -> Reactor
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register_listener(&self.inner.root, Reactor::listener(f))
    }

    /// Remove `reactor` from every path it is registered under.
    pub fn unreact(&self, reactor: &Reactor) -> bool {
        self.inner.root.registry().write().unregister(reactor.id())
    }

    /// Alias of [`Store::unreact`].
    pub fn clear(&self, reactor: &Reactor) -> bool {
        self.unreact(reactor)
    }

    /// Create a fork with its own reactors over the whole state.
    pub fn fork(&self) -> Fork {
        self.fork_at(Path::whole())
    }

    /// Create a fork whose paths are relative to `prefix`.
    pub fn fork_at(&self, prefix: impl Into<Path>) -> Fork {
        let scope = Arc::new(Scope::new(prefix.into()));
        self.inner.forks.write().push(scope.clone());
        debug!(fork = ?scope.id(), prefix = %scope.prefix(), "created fork");
        Fork::new(self.clone(), scope)
    }

    /// Detach `fork` so its reactors never fire again.
    ///
    /// Unknown or already destroyed forks are ignored; the return value
    /// says whether anything was removed.
    pub fn destroy(&self, fork: &Fork) -> bool {
        let scope = {
            let mut forks = self.inner.forks.write();
            match forks.iter().position(|s| s.id() == fork.id()) {
                Some(index) => forks.remove(index),
                None => return false,
            }
        };
        scope.kill();
        debug!(fork = ?scope.id(), "destroyed fork");
        true
    }

    /// Number of live forks.
    pub fn fork_count(&self) -> usize {
        self.inner.forks.read().len()
    }

    /// Turn action tracing on or off.
    ///
    /// Turning it on captures the current state as the replay baseline and
    /// starts an empty log, replacing any earlier capture. Turning it off
    /// discards the capture.
    pub fn trace(&self, on: bool) {
        let state = self.inner.state.read();
        *self.inner.trace.lock() = on.then(|| Trace::new(state.clone()));
        debug!(on, "tracing toggled");
    }

    pub fn is_tracing(&self) -> bool {
        self.inner.trace.lock().is_some()
    }

    /// A copy of the current trace, if tracing is on.
    pub fn trace_snapshot(&self) -> Option<Trace> {
        self.inner.trace.lock().clone()
    }

    /// Replay the trace and report each reconstructed step to `f`.
    ///
    /// With tracing off, `f` is called once with [`StoreError::TracingOff`].
    /// The live state is never touched.
    pub fn eventlog<F>(&self, mut f: F)
    where
        F: FnMut(Result<TraceRecord>),
    {
        match self.trace_snapshot() {
            Some(trace) => trace.replay_each(&self.inner.reducer, f),
            None => f(Err(StoreError::TracingOff)),
        }
    }

    /// Replay the trace and collect every step.
    pub fn replay(&self) -> Result<Vec<TraceRecord>> {
        self.trace_snapshot()
            .ok_or(StoreError::TracingOff)?
            .replay(&self.inner.reducer)
    }

    pub(crate) fn register(&self, scope: &Scope, path: Path, reactor: Reactor) -> Reactor {
        let path = scope.qualify(&path);
        scope.registry().write().register(path.clone(), reactor.clone());
        reactor.call(&self.get(&path));
        reactor
    }

    pub(crate) fn register_listener(&self, scope: &Scope, reactor: Reactor) -> Reactor {
        scope.registry().write().register_toplevel(reactor.clone());
        reactor.call(&Value::Undefined);
        reactor
    }

    /// Root scope followed by live forks, in creation order.
    fn scopes(&self) -> Vec<Arc<Scope>> {
        std::iter::once(self.inner.root.clone())
            .chain(self.inner.forks.read().iter().cloned())
            .collect()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state())
            .field("reactors", &self.inner.root.registry().read().len())
            .field("forks", &self.fork_count())
            .field("tracing", &self.is_tracing())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
