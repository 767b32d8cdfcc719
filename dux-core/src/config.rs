//! Store configuration.

use serde::{Deserialize, Serialize};

/// Tunables for a [`Store`](crate::Store).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust,ignore
/// let config = StoreConfig::from_json(r#"{"trace": true}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Start with tracing enabled, using the initial state as the baseline.
    pub trace: bool,

    /// How many transitions may wait behind an active drain. Nested actions
    /// from reactors and actions from other threads during a drain both
    /// count against it.
    pub max_pending: usize,
}

impl StoreConfig {
    pub const DEFAULT_MAX_PENDING: usize = 1024;

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            trace: false,
            max_pending: Self::DEFAULT_MAX_PENDING,
        }
    }
}
