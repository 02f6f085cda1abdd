use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for [`super::SurgicalEditor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Generation attempts per edit; values below 1 are treated as 1.
    pub max_retries: u32,
    /// Delay before the second attempt; doubles for each further attempt.
    pub retry_base_delay_ms: u64,
    pub validation_enabled: bool,
    /// Revert edits that fail validation and report them as errors.
    pub rollback_on_invalid: bool,
    /// Log full prompts and responses and keep prompts in session records.
    pub debug_mode: bool,
    /// Sessions kept in the edit history; 0 keeps none.
    pub history_capacity: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay_ms: 1000,
            validation_enabled: true,
            rollback_on_invalid: false,
            debug_mode: false,
            history_capacity: 50,
        }
    }
}

impl EditorOptions {
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay after the failed attempt number `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.retry_base_delay_ms.saturating_mul(factor))
    }
}
