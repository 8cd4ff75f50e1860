use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agents::{AgentOptions, DEFAULT_HISTORY_CAPACITY};
use crate::models::TailoringMode;

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub llm: LLMConfig,
    pub runtime: RuntimeConfig,
    pub application: ApplicationConfig,
    pub resume: ResumeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LLMConfig {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub analysis_model: String,
    pub generation_model: String,
    pub form_filling_model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            analysis_model: "claude-3-sonnet-20240229".to_string(),
            generation_model: "gpt-4".to_string(),
            form_filling_model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

impl LLMConfig {
    pub fn has_api_key(&self) -> bool {
        let present = |k: &Option<String>| k.as_deref().is_some_and(|v| !v.trim().is_empty());
        present(&self.openai_api_key) || present(&self.anthropic_api_key)
    }
}

/// Options applied to every managed agent built from these settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub history_capacity: usize,
    /// Per-run bound on `execute`, in seconds.
    pub agent_timeout_secs: Option<f64>,
    /// Parallel fan-out limit. Falls back to `application.max_concurrent_applications`.
    pub max_concurrency: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            agent_timeout_secs: None,
            max_concurrency: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Dry-run mode: nothing is submitted and no API key is required.
    pub test_mode: bool,
    pub max_concurrent_applications: Option<usize>,
    pub application_delay_seconds: u64,
    pub linkedin_max_applications_per_day: u32,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            test_mode: true,
            max_concurrent_applications: Some(3),
            application_delay_seconds: 30,
            linkedin_max_applications_per_day: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ResumeConfig {
    /// Checked against [`TailoringMode`] during validation.
    pub tailoring_mode: String,
    pub output_format: String,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            tailoring_mode: TailoringMode::Conservative.to_string(),
            output_format: "pdf".to_string(),
        }
    }
}

impl Settings {
    pub fn agent_options(&self) -> AgentOptions {
        AgentOptions {
            history_capacity: self.runtime.history_capacity,
            timeout: self
                .runtime
                .agent_timeout_secs
                .filter(|secs| secs.is_finite() && *secs > 0.0)
                .map(Duration::from_secs_f64),
            max_concurrency: self
                .runtime
                .max_concurrency
                .or(self.application.max_concurrent_applications),
        }
    }

    pub fn tailoring_mode(&self) -> Option<TailoringMode> {
        self.resume.tailoring_mode.parse().ok()
    }

    /// Overlay API keys from the environment (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`).
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            self.llm.openai_api_key = Some(key);
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY").filter(|k| !k.is_empty()) {
            self.llm.anthropic_api_key = Some(key);
        }
    }
}
