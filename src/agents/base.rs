use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::errors::AgentError;
use crate::utils::truncation::truncate_error;
use super::history::{ExecutionHistory, ExecutionRecord, PerformanceMetrics, DEFAULT_HISTORY_CAPACITY};
use super::parallel::FanOut;
use super::result::AgentResult;
use super::status::AgentStatus;
use super::summary::SummarizeInput;

/// Error text of a validation rejection. Distinguishes "rejected before
/// execution" from failures raised by the task body.
pub const INVALID_INPUT_ERROR: &str = "Invalid input data";

/// Key/value store handed to an agent at construction.
pub type AgentConfig = HashMap<String, Value>;

/// Runtime knobs for one agent instance.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOptions {
    /// Maximum number of execution records retained.
    pub history_capacity: usize,
    /// Upper bound on a single `execute` call.
    pub timeout: Option<Duration>,
    /// Maximum simultaneously running tasks in `execute_parallel`.
    pub max_concurrency: Option<usize>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            timeout: None,
            max_concurrency: None,
        }
    }
}

/// Capability set every concrete agent implements.
///
/// Callers never invoke `execute` directly; they go through
/// [`ManagedAgent::run`], which times the call, contains errors and panics,
/// and records history.
#[async_trait]
pub trait Agent: Send + Sync + 'static {
    type Input: SummarizeInput + Send + 'static;
    type Output: Send + 'static;

    /// Side-effect-free precondition check.
    fn validate_input(&self, input: &Self::Input) -> bool;

    /// Task body. Expected failures should come back as
    /// `Ok(AgentResult::failure_result(..))`; `Err` is for unexpected ones.
    async fn execute(
        &self,
        input: Self::Input,
        ctx: &AgentContext,
    ) -> Result<AgentResult<Self::Output>, AgentError>;
}

/// View of the owning agent available inside `execute`.
#[derive(Debug, Clone)]
pub struct AgentContext {
    name: String,
    config: Arc<RwLock<AgentConfig>>,
    cancel_token: CancellationToken,
}

impl AgentContext {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the live config; values written by `update_config` during an
    /// in-flight execution are visible here.
    pub fn get_config(&self, key: &str) -> Option<Value> {
        read_config(&self.config).get(key).cloned()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel_token
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

pub(super) struct RunState {
    pub(super) status: AgentStatus,
    pub(super) history: ExecutionHistory,
    in_flight: usize,
    cancel_token: CancellationToken,
}

pub(super) struct AgentInner<A: Agent> {
    pub(super) name: String,
    pub(super) agent: A,
    pub(super) options: AgentOptions,
    config: Arc<RwLock<AgentConfig>>,
    pub(super) state: Mutex<RunState>,
    pub(super) fanout: FanOut,
}

/// A named, stateful agent instance. Cloning yields another handle to the
/// same instance, sharing status, history and config.
pub struct ManagedAgent<A: Agent> {
    pub(super) inner: Arc<AgentInner<A>>,
}

impl<A: Agent> Clone for ManagedAgent<A> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<A: Agent> std::fmt::Debug for ManagedAgent<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedAgent")
            .field("name", &self.inner.name)
            .field("status", &self.get_status())
            .finish()
    }
}

impl<A: Agent> ManagedAgent<A> {
    pub fn new(name: impl Into<String>, agent: A) -> Self {
        Self::with_options(name, agent, AgentConfig::new(), AgentOptions::default())
    }

    pub fn with_config(name: impl Into<String>, agent: A, config: AgentConfig) -> Self {
        Self::with_options(name, agent, config, AgentOptions::default())
    }

    pub fn with_options(
        name: impl Into<String>,
        agent: A,
        config: AgentConfig,
        options: AgentOptions,
    ) -> Self {
        let history = ExecutionHistory::with_capacity(options.history_capacity);
        Self {
            inner: Arc::new(AgentInner {
                name: name.into(),
                agent,
                options,
                config: Arc::new(RwLock::new(config)),
                state: Mutex::new(RunState {
                    status: AgentStatus::Idle,
                    history,
                    in_flight: 0,
                    cancel_token: CancellationToken::new(),
                }),
                fanout: FanOut::default(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn agent(&self) -> &A {
        &self.inner.agent
    }

    pub fn options(&self) -> &AgentOptions {
        &self.inner.options
    }

    /// Validate, execute and record one invocation. Never fails: every error
    /// and panic inside `validate_input` or the task body is folded into a
    /// failure result.
    pub async fn run(&self, input: A::Input) -> AgentResult<A::Output> {
        let started = Instant::now();
        let input_summary = input.summarize().to_string();

        let valid = match std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.inner.agent.validate_input(&input)
        })) {
            Ok(valid) => valid,
            Err(payload) => {
                let e = AgentError::from_panic(payload);
                error!(agent = %self.inner.name, error = %e, "Input validation panicked");
                let mut guard = RunGuard::begin(self.inner.clone());
                let mut result = AgentResult::failure_result(e.to_string(), None);
                result.set_execution_time(started.elapsed().as_secs_f64());
                guard.finish(&input_summary, &result);
                return result;
            }
        };

        if !valid {
            warn!(agent = %self.inner.name, input = %input_summary, "Input rejected by validation");
            let result = AgentResult::failure_result(INVALID_INPUT_ERROR, None);
            self.lock_state().history.push(make_record(&input_summary, &result));
            return result;
        }

        let mut guard = RunGuard::begin(self.inner.clone());
        info!(agent = %self.inner.name, input = %input_summary, "Starting execution");

        let ctx = AgentContext {
            name: self.inner.name.clone(),
            config: self.inner.config.clone(),
            cancel_token: guard.cancel_token.clone(),
        };

        let mut result = match self.invoke(input, &ctx).await {
            Ok(result) => result,
            Err(e) => {
                error!(agent = %self.inner.name, error = %e, "Agent execution failed");
                AgentResult::failure_result(e.to_string(), None)
            }
        };

        result.set_execution_time(started.elapsed().as_secs_f64());
        guard.finish(&input_summary, &result);
        result
    }

    async fn invoke(
        &self,
        input: A::Input,
        ctx: &AgentContext,
    ) -> Result<AgentResult<A::Output>, AgentError> {
        let body = AssertUnwindSafe(self.inner.agent.execute(input, ctx)).catch_unwind();
        let caught = match self.inner.options.timeout {
            Some(limit) => tokio::time::timeout(limit, body)
                .await
                .map_err(|_| AgentError::Timeout(limit))?,
            None => body.await,
        };
        caught.unwrap_or_else(|payload| Err(AgentError::from_panic(payload)))
    }

    pub fn get_status(&self) -> AgentStatus {
        self.lock_state().status
    }

    /// Owned copy of the history, oldest first.
    pub fn get_execution_history(&self) -> Vec<ExecutionRecord> {
        self.lock_state().history.to_vec()
    }

    /// `None` while the history is empty.
    pub fn get_performance_metrics(&self) -> Option<PerformanceMetrics> {
        self.lock_state().history.metrics()
    }

    pub fn get_config(&self, key: &str) -> Option<Value> {
        read_config(&self.inner.config).get(key).cloned()
    }

    pub fn get_config_or(&self, key: &str, default: Value) -> Value {
        self.get_config(key).unwrap_or(default)
    }

    /// Writes are visible to an in-flight `execute`; callers that mutate config
    /// during a run are responsible for the consistency of what it reads.
    pub fn update_config(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner
            .config
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    /// Force status to `Idle` regardless of the current state.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        if state.cancel_token.is_cancelled() {
            state.cancel_token = CancellationToken::new();
        }
        debug!(agent = %self.inner.name, from = %state.status, "Agent reset");
        state.status = AgentStatus::Idle;
    }

    /// Request cancellation. Sets status to `Cancelled` and signals the token
    /// visible to in-flight task bodies; work already running is not stopped
    /// unless the body observes the token.
    pub fn cancel(&self) {
        let mut state = self.lock_state();
        state.cancel_token.cancel();
        state.status = AgentStatus::Cancelled;
        info!(agent = %self.inner.name, in_flight = state.in_flight, "Cancellation requested");
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.lock_state().cancel_token.clone()
    }

    pub(super) fn lock_state(&self) -> MutexGuard<'_, RunState> {
        lock(&self.inner.state)
    }
}

/// Keeps status and in-flight bookkeeping consistent even when a run future
/// is dropped before completion.
struct RunGuard<A: Agent> {
    inner: Arc<AgentInner<A>>,
    cancel_token: CancellationToken,
    finished: bool,
}

impl<A: Agent> RunGuard<A> {
    fn begin(inner: Arc<AgentInner<A>>) -> Self {
        let cancel_token = {
            let mut state = lock(&inner.state);
            if state.cancel_token.is_cancelled() {
                state.cancel_token = CancellationToken::new();
            }
            // Running -> Running is the only refused move: an overlapping run.
            match state.status.transition(AgentStatus::Running) {
                Ok(next) => state.status = next,
                Err(e) => debug!(
                    agent = %inner.name,
                    in_flight = state.in_flight,
                    error = %e,
                    "Run overlaps an in-flight execution"
                ),
            }
            state.in_flight += 1;
            state.cancel_token.clone()
        };
        Self { inner, cancel_token, finished: false }
    }

    fn finish<T>(&mut self, input_summary: &str, result: &AgentResult<T>) {
        let mut state = lock(&self.inner.state);
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.in_flight == 0 && state.status == AgentStatus::Running {
            state.status = if result.is_success() {
                AgentStatus::Completed
            } else {
                AgentStatus::Failed
            };
        }
        state.history.push(make_record(input_summary, result));
        debug!(
            agent = %self.inner.name,
            status = %state.status,
            success = result.is_success(),
            elapsed_ms = (result.execution_time() * 1000.0) as u64,
            "Execution finished"
        );
        self.finished = true;
    }
}

impl<A: Agent> Drop for RunGuard<A> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut state = lock(&self.inner.state);
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.in_flight == 0 && state.status == AgentStatus::Running {
            state.status = AgentStatus::Cancelled;
        }
        warn!(agent = %self.inner.name, "Execution dropped before completion");
    }
}

fn make_record<T>(input_summary: &str, result: &AgentResult<T>) -> ExecutionRecord {
    ExecutionRecord {
        timestamp: Utc::now(),
        input_summary: input_summary.to_string(),
        success: result.is_success(),
        error: result.error().map(truncate_error),
        execution_time: result.execution_time(),
        metadata: result.metadata().clone(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_config(config: &RwLock<AgentConfig>) -> std::sync::RwLockReadGuard<'_, AgentConfig> {
    config.read().unwrap_or_else(PoisonError::into_inner)
}
