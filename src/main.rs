mod cli;

use autoapply::errors::AgentError;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(!cli.no_color)
            .init();
    }

    let result = match cli.command {
        cli::Commands::Check(args) => cli::check::handle_check(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        let exit_code = match e.downcast_ref::<AgentError>() {
            Some(AgentError::Config(_)) => 2,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}
