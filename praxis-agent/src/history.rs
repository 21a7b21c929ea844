//! Action-execution history and per-action statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
    Waiting,
    Paused,
}

/// One history record. Appended for every execution, whatever the outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ActionExecution {
    pub action: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip)]
    pub duration: Duration,
    pub status: ExecutionStatus,
    pub failure: Option<String>,
}

/// Aggregated execution statistics for one action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionStats {
    pub executions: u32,
    pub successes: u32,
    pub failures: u32,
    pub avg_duration_ms: f64,
}

impl ActionStats {
    pub fn record(&mut self, execution: &ActionExecution) {
        let duration_ms = execution.duration.as_secs_f64() * 1000.0;
        self.avg_duration_ms = (self.avg_duration_ms * self.executions as f64 + duration_ms)
            / (self.executions + 1) as f64;
        self.executions += 1;
        match execution.status {
            ExecutionStatus::Succeeded => self.successes += 1,
            ExecutionStatus::Failed => self.failures += 1,
            ExecutionStatus::Waiting | ExecutionStatus::Paused => {}
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.executions == 0 {
            // No data yet; assume neutral.
            0.5
        } else {
            self.successes as f64 / self.executions as f64
        }
    }
}

/// Fold a history into per-action statistics.
pub fn stats_by_action(history: &[ActionExecution]) -> HashMap<String, ActionStats> {
    let mut stats: HashMap<String, ActionStats> = HashMap::new();
    for execution in history {
        stats
            .entry(execution.action.clone())
            .or_default()
            .record(execution);
    }
    stats
}
