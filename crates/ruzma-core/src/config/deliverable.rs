//! Deliverable field configuration.

use serde::{Deserialize, Serialize};

/// Settings for read-modify-write updates of a milestone's deliverable field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverableConfig {
    /// How many times a compare-and-swap write is retried after losing a race.
    #[serde(default = "default_write_retry_attempts")]
    pub write_retry_attempts: u32,
}

impl Default for DeliverableConfig {
    fn default() -> Self {
        Self {
            write_retry_attempts: default_write_retry_attempts(),
        }
    }
}

fn default_write_retry_attempts() -> u32 {
    5
}
