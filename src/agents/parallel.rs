use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Notify, Semaphore};
use tokio::task::{AbortHandle, JoinError};
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use crate::errors::AgentError;
use super::base::{Agent, ManagedAgent};
use super::result::AgentResult;

/// Tasks spawned by `execute_parallel` that `cleanup` may still have to stop.
#[derive(Default)]
pub(super) struct FanOut {
    tracker: TaskTracker,
    handles: Mutex<Vec<AbortHandle>>,
    spawned: Notify,
}

impl FanOut {
    fn track(&self, handle: AbortHandle) {
        {
            let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
            handles.retain(|h| !h.is_finished());
            handles.push(handle);
        }
        self.spawned.notify_one();
    }

    fn take(&self) -> Vec<AbortHandle> {
        std::mem::take(&mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn prune(&self) {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|h| !h.is_finished());
    }

    fn outstanding(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// Abort tracked tasks until the tracker drains. Tasks spawned while this
    /// runs are aborted too. Returns how many tasks were aborted.
    async fn shutdown(&self) -> usize {
        self.tracker.close();
        let mut cancelled = 0usize;
        loop {
            for handle in self.take() {
                if !handle.is_finished() {
                    handle.abort();
                    cancelled += 1;
                }
            }
            tokio::select! {
                _ = self.tracker.wait() => break,
                _ = self.spawned.notified() => {}
            }
        }
        self.tracker.reopen();
        cancelled
    }
}

impl<A: Agent> ManagedAgent<A> {
    /// Run every input through this agent concurrently.
    ///
    /// The returned vector has one result per input, in input order. A task
    /// that panics outside `execute` or is aborted by [`cleanup`](Self::cleanup)
    /// yields a failure result instead of disturbing its siblings.
    pub async fn execute_parallel(&self, inputs: Vec<A::Input>) -> Vec<AgentResult<A::Output>> {
        let count = inputs.len();
        if count == 0 {
            return Vec::new();
        }
        info!(agent = %self.name(), tasks = count, "Starting parallel batch");

        let limiter = self
            .options()
            .max_concurrency
            .map(|n| Arc::new(Semaphore::new(n.max(1))));

        let handles: Vec<_> = inputs
            .into_iter()
            .map(|input| {
                let agent = self.clone();
                let limiter = limiter.clone();
                let handle = self.inner.fanout.tracker.spawn(async move {
                    // The semaphore is never closed, so acquiring only waits.
                    let _permit = match limiter {
                        Some(sem) => sem.acquire_owned().await.ok(),
                        None => None,
                    };
                    agent.run(input).await
                });
                self.inner.fanout.track(handle.abort_handle());
                handle
            })
            .collect();

        let joined = futures::future::join_all(handles).await;
        let mut failures = 0usize;
        let results: Vec<_> = joined
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| match outcome {
                Ok(result) => {
                    if !result.is_success() {
                        failures += 1;
                    }
                    result
                }
                Err(e) => {
                    failures += 1;
                    contain_join_error(self.name(), index, e)
                }
            })
            .collect();

        self.inner.fanout.prune();
        info!(agent = %self.name(), tasks = count, failures, "Parallel batch finished");
        results
    }

    /// Number of spawned tasks that have not finished yet.
    pub fn outstanding_tasks(&self) -> usize {
        self.inner.fanout.outstanding()
    }

    /// Cancel every outstanding parallel task and wait until all of them have
    /// terminated. Tasks are stopped at their next suspension point, including
    /// tasks another batch spawns while the cleanup is in progress.
    pub async fn cleanup(&self) {
        let cancelled = self.inner.fanout.shutdown().await;
        if cancelled > 0 {
            warn!(agent = %self.name(), cancelled, "Cancelled outstanding parallel tasks");
        }
    }
}

fn contain_join_error<T>(agent: &str, index: usize, e: JoinError) -> AgentResult<T> {
    let err = if e.is_panic() {
        AgentError::from_panic(e.into_panic())
    } else if e.is_cancelled() {
        AgentError::Cancelled("task cancelled before completion".to_string())
    } else {
        AgentError::TaskJoin(e.to_string())
    };
    error!(agent, task = index, error = %err, "Parallel task did not complete");
    AgentResult::failure_result(err.to_string(), None)
}
