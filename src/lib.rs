//! Agent execution runtime for LLM-assisted job applications.
//!
//! Concrete agents implement [`agents::Agent`]; callers drive them through a
//! [`agents::ManagedAgent`] handle, which owns status, bounded history and
//! configuration, and provides parallel fan-out and typed pipelines.

pub mod agents;
pub mod config;
pub mod errors;
pub mod models;
pub mod utils;

pub use agents::{
    Agent, AgentConfig, AgentContext, AgentOptions, AgentResult, AgentStatus, Chain,
    ExecutionRecord, ManagedAgent, PerformanceMetrics,
};
pub use errors::AgentError;
