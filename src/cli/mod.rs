pub mod check;
pub mod commands;

pub use commands::{Cli, Commands};
