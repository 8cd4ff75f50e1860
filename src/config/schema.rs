use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "llm": {
                "type": "object",
                "properties": {
                    "openai_api_key": { "type": ["string", "null"] },
                    "anthropic_api_key": { "type": ["string", "null"] },
                    "analysis_model": { "type": "string" },
                    "generation_model": { "type": "string" },
                    "form_filling_model": { "type": "string" },
                    "temperature": { "type": "number", "minimum": 0, "maximum": 2 },
                    "max_tokens": { "type": "integer", "minimum": 1 }
                }
            },
            "runtime": {
                "type": "object",
                "properties": {
                    "history_capacity": { "type": "integer", "minimum": 1 },
                    "agent_timeout_secs": { "type": ["number", "null"], "exclusiveMinimum": 0 },
                    "max_concurrency": { "type": ["integer", "null"], "minimum": 1 }
                }
            },
            "application": {
                "type": "object",
                "properties": {
                    "test_mode": { "type": "boolean" },
                    "max_concurrent_applications": { "type": ["integer", "null"], "minimum": 1 },
                    "application_delay_seconds": { "type": "integer", "minimum": 0 },
                    "linkedin_max_applications_per_day": { "type": "integer", "minimum": 0 }
                }
            },
            "resume": {
                "type": "object",
                "properties": {
                    "tailoring_mode": { "type": "string", "enum": ["conservative", "moderate", "aggressive"] },
                    "output_format": { "type": "string", "enum": ["pdf", "docx", "txt"] }
                }
            }
        },
        "additionalProperties": false
    })
});
