use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::Metadata;

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// One entry per `run` invocation, including validation rejections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub timestamp: DateTime<Utc>,
    pub input_summary: String,
    pub success: bool,
    pub error: Option<String>,
    /// Seconds, as measured by `run`.
    pub execution_time: f64,
    pub metadata: Metadata,
}

/// Derived on demand from history; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_executions: usize,
    pub successful_executions: usize,
    pub failed_executions: usize,
    /// Percentage in `0.0..=100.0`.
    pub success_rate: f64,
    pub average_execution_time: f64,
    /// `None` when no execution succeeded.
    pub average_successful_execution_time: Option<f64>,
    pub last_execution: Option<DateTime<Utc>>,
}

/// Insertion-ordered log capped at `capacity`; the oldest entry is evicted first.
#[derive(Debug, Clone)]
pub struct ExecutionHistory {
    records: VecDeque<ExecutionRecord>,
    capacity: usize,
}

impl ExecutionHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: ExecutionRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter()
    }

    /// Owned copy, oldest first.
    pub fn to_vec(&self) -> Vec<ExecutionRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn metrics(&self) -> Option<PerformanceMetrics> {
        compute_metrics(self.records.iter())
    }
}

impl Default for ExecutionHistory {
    fn default() -> Self {
        Self::new()
    }
}

pub fn compute_metrics<'a>(
    records: impl Iterator<Item = &'a ExecutionRecord>,
) -> Option<PerformanceMetrics> {
    let mut total = 0usize;
    let mut successful = 0usize;
    let mut total_time = 0.0f64;
    let mut successful_time = 0.0f64;
    let mut last_execution = None;

    for record in records {
        total += 1;
        total_time += record.execution_time;
        if record.success {
            successful += 1;
            successful_time += record.execution_time;
        }
        last_execution = Some(record.timestamp);
    }

    if total == 0 {
        return None;
    }

    Some(PerformanceMetrics {
        total_executions: total,
        successful_executions: successful,
        failed_executions: total - successful,
        success_rate: successful as f64 / total as f64 * 100.0,
        average_execution_time: total_time / total as f64,
        average_successful_execution_time: (successful > 0)
            .then(|| successful_time / successful as f64),
        last_execution,
    })
}
