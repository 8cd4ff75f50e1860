use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "autoapply", version, about = "Agent runtime for automated job applications")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate settings and print the resolved agent runtime options
    Check(CheckArgs),
}

#[derive(Args, Clone)]
pub struct CheckArgs {
    /// YAML settings file; defaults plus environment when omitted
    #[arg(short, long)]
    pub config: Option<String>,

    /// Print the resolved settings as JSON
    #[arg(long)]
    pub json: bool,
}
