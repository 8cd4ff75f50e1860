use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

/// Free-form annotations attached to a result by the agent or caller.
pub type Metadata = HashMap<String, Value>;

/// Uniform success/failure envelope returned by every agent invocation.
///
/// Fields are private so the only way to build one is through
/// [`AgentResult::success_result`] or [`AgentResult::failure_result`]; `data`
/// is populated exactly when `success` is true and `error` exactly when it is
/// false.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResult<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
    metadata: Metadata,
    /// Wall-clock seconds of the enclosing `run` call. Zero until `run` fills it in.
    execution_time: f64,
}

impl<T> AgentResult<T> {
    pub fn success_result(data: T, metadata: Option<Metadata>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata: metadata.unwrap_or_default(),
            execution_time: 0.0,
        }
    }

    pub fn failure_result(error: impl Into<String>, metadata: Option<Metadata>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            metadata: metadata.unwrap_or_default(),
            execution_time: 0.0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn execution_time(&self) -> f64 {
        self.execution_time
    }

    /// Attach one metadata entry, replacing any previous value for `key`.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub(crate) fn set_execution_time(&mut self, seconds: f64) {
        self.execution_time = seconds;
    }

    /// Re-type a failure so it can travel through a pipeline stage with a
    /// different payload type. A success is converted into a failure because it
    /// has no payload of type `U` to carry.
    pub fn into_failure<U>(self) -> AgentResult<U> {
        AgentResult {
            success: false,
            data: None,
            error: self
                .error
                .or_else(|| Some("Result carried no failure to propagate".to_string())),
            metadata: self.metadata,
            execution_time: self.execution_time,
        }
    }
}
