use serde::{Deserialize, Serialize};

use crate::errors::AgentError;

/// Execution state of a single agent instance.
///
/// `Idle -> Running -> {Completed, Failed}`, `Running -> Cancelled` on request,
/// and every terminal state may start a new run or be reset to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Transitions the run wrapper is allowed to make. `reset` and `cancel` are
    /// forced by the caller and bypass this check.
    pub fn can_transition_to(&self, next: AgentStatus) -> bool {
        match (self, next) {
            (Self::Idle, Self::Running) => true,
            (s, Self::Running) if s.is_terminal() => true,
            (Self::Running, Self::Completed | Self::Failed | Self::Cancelled) => true,
            (s, Self::Idle) if s.is_terminal() => true,
            _ => false,
        }
    }

    pub fn transition(self, next: AgentStatus) -> Result<AgentStatus, AgentError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AgentError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
