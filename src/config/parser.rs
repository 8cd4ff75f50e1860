use std::path::Path;

use tracing::{debug, warn};

use crate::errors::AgentError;
use crate::models::TailoringMode;
use super::schema::CONFIG_SCHEMA;
use super::types::Settings;

const MAX_CONFIG_BYTES: u64 = 1_048_576;

/// Load settings from a YAML file, overlay API keys from the environment and
/// validate the result.
pub async fn parse_config(path: &Path) -> Result<Settings, AgentError> {
    let mut settings = read_settings(path).await?;
    settings.apply_env_overrides();
    validate_settings(&settings)?;
    debug!(path = %path.display(), "Loaded settings");
    Ok(settings)
}

/// Parse and schema-check a settings file without environment overlays or
/// semantic validation.
pub async fn read_settings(path: &Path) -> Result<Settings, AgentError> {
    if !path.exists() {
        return Err(AgentError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(AgentError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let yaml: serde_yaml::Value = serde_yaml::from_str(&content)?;
    // An empty file means all defaults.
    if yaml.is_null() {
        return Ok(Settings::default());
    }

    validate_schema(&yaml)?;

    Ok(serde_yaml::from_value(yaml)?)
}

/// Validate settings against the JSON schema. Violations are logged, not fatal.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), AgentError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| AgentError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| AgentError::Config(format!("Schema compilation error: {}", e)))?;

    if let Err(errors) = compiled.validate(&json_value) {
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Semantic checks the schema cannot express or only warns about.
pub fn validate_settings(settings: &Settings) -> Result<(), AgentError> {
    if settings.runtime.history_capacity == 0 {
        return Err(AgentError::Config("runtime.history_capacity must be at least 1".into()));
    }
    if settings.runtime.max_concurrency == Some(0) {
        return Err(AgentError::Config("runtime.max_concurrency must be at least 1".into()));
    }
    if settings.application.max_concurrent_applications == Some(0) {
        return Err(AgentError::Config(
            "application.max_concurrent_applications must be at least 1".into(),
        ));
    }
    if settings.resume.tailoring_mode.parse::<TailoringMode>().is_err() {
        return Err(AgentError::Config(format!(
            "Invalid resume tailoring mode '{}': expected conservative, moderate or aggressive",
            settings.resume.tailoring_mode
        )));
    }
    if !settings.llm.has_api_key() {
        if settings.application.test_mode {
            warn!("No LLM API key configured; only test mode is available");
        } else {
            return Err(AgentError::Config(
                "At least one LLM API key (OpenAI or Anthropic) is required outside test mode".into(),
            ));
        }
    }

    Ok(())
}
