pub mod types;

pub use types::AgentError;
