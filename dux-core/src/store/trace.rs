//! Action trace and replay.
//!
//! While tracing is on, the store appends every action it is asked to apply
//! to a [`Trace`], together with the state at the moment tracing started.
//! Replaying runs the reducer over the recorded actions from that baseline
//! and yields each intermediate state. Replay works on its own copy of the
//! data and never touches the live store.

use serde::Serialize;

use super::Reducer;
use crate::error::{Result, StoreError};
use crate::state::Value;

/// An intended state transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
}

impl Action {
    pub fn new(kind: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self {
            kind: kind.into(),
            payload: payload.into(),
        }
    }
}

/// One replayed action and the state it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
    pub state: Value,
}

/// The baseline state and the actions applied since.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trace {
    baseline: Value,
    events: Vec<Action>,
}

impl Trace {
    pub fn new(baseline: Value) -> Self {
        Self {
            baseline,
            events: Vec::new(),
        }
    }

    pub fn record(&mut self, action: Action) {
        self.events.push(action);
    }

    pub fn baseline(&self) -> &Value {
        &self.baseline
    }

    pub fn events(&self) -> &[Action] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Replay the recorded actions through `reducer`, calling `f` with each
    /// reconstructed record.
    ///
    /// If the reducer fails, `f` receives the error and replay stops.
    pub fn replay_each<F>(&self, reducer: &Reducer, mut f: F)
    where
        F: FnMut(Result<TraceRecord>),
    {
        let mut state = self.baseline.clone();
        for action in &self.events {
            match reducer(&state, &action.kind, &action.payload) {
                Ok(next) => {
                    state = next;
                    f(Ok(TraceRecord {
                        kind: action.kind.clone(),
                        payload: action.payload.clone(),
                        state: state.clone(),
                    }));
                }
                Err(source) => {
                    f(Err(StoreError::Reducer {
                        action: action.kind.clone(),
                        source,
                    }));
                    return;
                }
            }
        }
    }

    /// Replay the recorded actions and collect the records.
    pub fn replay(&self, reducer: &Reducer) -> Result<Vec<TraceRecord>> {
        let mut records = Vec::with_capacity(self.events.len());
        let mut failure = None;
        self.replay_each(reducer, |record| match record {
            Ok(record) => records.push(record),
            Err(e) => failure = Some(e),
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(records),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::reducer;
    use serde_json::json;

    fn adder() -> Reducer {
        reducer(|state, kind, payload| match kind {
            "inc" => {
                let n = state.get("n").as_f64().unwrap_or(0.0);
                Ok(state.with("n", n + payload.as_f64().unwrap_or(0.0)))
            }
            "fail" => Err("refused".into()),
            _ => Ok(state.clone()),
        })
    }

    fn trace(actions: &[(&str, i32)]) -> Trace {
        let mut trace = Trace::new(Value::from(json!({"n": 0})));
        for (kind, payload) in actions {
            trace.record(Action::new(*kind, *payload));
        }
        trace
    }

    #[test]
    fn replay_reconstructs_intermediate_states() {
        let records = trace(&[("inc", 1), ("inc", 2)]).replay(&adder()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].state.to_json(), json!({"n": 1}));
        assert_eq!(records[1].state.to_json(), json!({"n": 3}));
        assert_eq!(records[1].kind, "inc");
        assert_eq!(records[1].payload, Value::from(2));
    }

    #[test]
    fn replay_stops_at_reducer_failure() {
        let t = trace(&[("inc", 1), ("fail", 0), ("inc", 5)]);

        let mut oks = 0;
        let mut errs = 0;
        t.replay_each(&adder(), |r| match r {
            Ok(_) => oks += 1,
            Err(_) => errs += 1,
        });
        assert_eq!((oks, errs), (1, 1));

        assert!(matches!(
            t.replay(&adder()),
            Err(StoreError::Reducer { action, .. }) if action == "fail"
        ));
    }

    #[test]
    fn empty_trace_replays_nothing() {
        let t = trace(&[]);
        assert!(t.is_empty());
        assert!(t.replay(&adder()).unwrap().is_empty());
    }

    #[test]
    fn exports_json_and_msgpack() {
        let t = trace(&[("inc", 1)]);

        let json: serde_json::Value = serde_json::from_str(&t.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            json!({"baseline": {"n": 0}, "events": [{"type": "inc", "payload": 1}]})
        );

        let packed = t.to_msgpack().unwrap();
        let unpacked: serde_json::Value = rmp_serde::from_slice(&packed).unwrap();
        assert_eq!(unpacked, json);
    }
}
