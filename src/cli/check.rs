use std::path::PathBuf;

use anyhow::Context;
use autoapply::config::{self, Settings};
use autoapply::utils::formatting::{format_duration, format_limit};
use tracing::info;

use super::commands::CheckArgs;

pub async fn handle_check(args: CheckArgs) -> anyhow::Result<()> {
    let settings = match &args.config {
        Some(path) => {
            let path = PathBuf::from(path);
            config::parse_config(&path)
                .await
                .with_context(|| format!("loading settings from {}", path.display()))?
        }
        None => {
            let mut settings = Settings::default();
            settings.apply_env_overrides();
            config::validate_settings(&settings).context("validating default settings")?;
            settings
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&redacted(&settings))?);
        return Ok(());
    }

    let options = settings.agent_options();
    info!(test_mode = settings.application.test_mode, "Settings are valid");
    println!("Configuration is valid: {}", args.config.as_deref().unwrap_or("<defaults>"));
    println!("  history capacity : {}", options.history_capacity);
    println!(
        "  agent timeout    : {}",
        options.timeout.map(format_duration).unwrap_or_else(|| "none".to_string())
    );
    println!("  max concurrency  : {}", format_limit(options.max_concurrency));
    println!("  tailoring mode   : {}", settings.resume.tailoring_mode);
    println!("  test mode        : {}", settings.application.test_mode);
    Ok(())
}

fn redacted(settings: &Settings) -> Settings {
    let mut copy = settings.clone();
    let mask = |key: &mut Option<String>| {
        if key.is_some() {
            *key = Some("********".to_string());
        }
    };
    mask(&mut copy.llm.openai_api_key);
    mask(&mut copy.llm.anthropic_api_key);
    copy
}
