//! Store errors.

use thiserror::Error;

/// Error type returned by reducers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The reducer rejected an action. The state is unchanged.
    #[error("reducer failed on action `{action}`: {source}")]
    Reducer {
        action: String,
        #[source]
        source: BoxError,
    },

    /// `eventlog` was called while tracing is off.
    #[error("TRACING:OFF")]
    TracingOff,

    /// Too many actions were applied from inside reactors before the
    /// current dispatch could finish.
    #[error("nested dispatch queue is full ({limit} pending transitions)")]
    QueueOverflow { limit: usize },

    #[error("failed to encode trace as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode trace as MessagePack: {0}")]
    MsgPack(#[from] rmp_serde::encode::Error),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
