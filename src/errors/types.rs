use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Execution(String),

    #[error("Execution timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Task panicked: {0}")]
    TaskPanicked(String),

    #[error("Task join error: {0}")]
    TaskJoin(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AgentError {
    /// Shorthand for task bodies reporting an unexpected failure.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Build an error from a panic payload caught at a task boundary.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::TaskPanicked(message)
    }
}
