use serde::{Deserialize, Serialize};

pub const DEFAULT_ROSTER_CONCURRENCY: usize = 8;

/// Tuning for report assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Maximum number of employee reports computed at once for a roster.
    pub roster_concurrency: usize,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            roster_concurrency: DEFAULT_ROSTER_CONCURRENCY,
        }
    }
}
