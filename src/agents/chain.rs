use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;

use super::base::{Agent, ManagedAgent};
use super::result::AgentResult;

type Stage<I, O> = Arc<dyn Fn(I) -> BoxFuture<'static, AgentResult<O>> + Send + Sync>;

/// Agents linked so that each successful payload becomes the next agent's
/// input. The first failure ends the pipeline and is returned as its outcome.
///
/// A chain only grows by appending, so it cannot contain a cycle. Appending
/// the same agent twice runs it twice.
pub struct Chain<I, O> {
    run: Stage<I, O>,
    stages: Vec<String>,
}

impl<I, O> Clone for Chain<I, O> {
    fn clone(&self) -> Self {
        Self { run: self.run.clone(), stages: self.stages.clone() }
    }
}

impl<I, O> std::fmt::Debug for Chain<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("stages", &self.stages).finish()
    }
}

impl<I: Send + 'static, O: Send + 'static> Chain<I, O> {
    pub fn from_agent<A>(agent: &ManagedAgent<A>) -> Self
    where
        A: Agent<Input = I, Output = O>,
    {
        let head = agent.clone();
        Self {
            run: Arc::new(move |input: I| {
                let head = head.clone();
                async move { stop_if_failed(head.name(), head.run(input).await) }.boxed()
            }),
            stages: vec![agent.name().to_string()],
        }
    }

    /// Append `next`; it receives this chain's successful payload.
    pub fn chain<B>(self, next: &ManagedAgent<B>) -> Chain<I, B::Output>
    where
        B: Agent<Input = O>,
    {
        let prev = self.run;
        let next = next.clone();
        let mut stages = self.stages;
        stages.push(next.name().to_string());

        Chain {
            run: Arc::new(move |input: I| {
                let prev = prev.clone();
                let next = next.clone();
                async move {
                    let result = prev(input).await;
                    // Already logged by the stage that failed.
                    if !result.is_success() {
                        return result.into_failure();
                    }
                    let result = match result.into_data() {
                        Some(payload) => next.run(payload).await,
                        None => AgentResult::failure_result("Stage succeeded without a payload", None),
                    };
                    stop_if_failed(next.name(), result)
                }
                .boxed()
            }),
            stages,
        }
    }

    pub async fn run_chain(&self, input: I) -> AgentResult<O> {
        (self.run)(input).await
    }

    /// Agent names in execution order.
    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

fn stop_if_failed<T>(stage: &str, result: AgentResult<T>) -> AgentResult<T> {
    if !result.is_success() {
        debug!(stage, error = result.error().unwrap_or_default(), "Pipeline stopped at failed stage");
    }
    result
}

impl<A: Agent> ManagedAgent<A> {
    /// Start a pipeline with this agent followed by `next`.
    pub fn chain<B>(&self, next: &ManagedAgent<B>) -> Chain<A::Input, B::Output>
    where
        B: Agent<Input = A::Output>,
    {
        Chain::from_agent(self).chain(next)
    }

    /// Single-link pipeline: equivalent to `run`.
    pub async fn run_chain(&self, input: A::Input) -> AgentResult<A::Output> {
        self.run(input).await
    }
}
