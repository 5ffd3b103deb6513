//! Command-line surface: `convert`, `stats` and `preview`
mod commands;

pub use commands::{Cli, Commands, run};
