//! Agent execution runtime: the run wrapper, bounded history, parallel
//! fan-out and pipelines.

pub mod base;
pub mod chain;
pub mod history;
pub mod parallel;
pub mod result;
pub mod status;
pub mod summary;

pub use base::{Agent, AgentConfig, AgentContext, AgentOptions, ManagedAgent, INVALID_INPUT_ERROR};
pub use chain::Chain;
pub use history::{ExecutionHistory, ExecutionRecord, PerformanceMetrics, DEFAULT_HISTORY_CAPACITY};
pub use result::{AgentResult, Metadata};
pub use status::AgentStatus;
pub use summary::{InputSummary, SummarizeInput};
