//! CLI command implementations

mod inspect;
mod models;
mod teach;

use crate::cli::LogLevel;
use crate::config::{load_or_default, Cli, Command};
use crate::Result;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<()> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);
    let config = load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Bootstrap => models::run_bootstrap(&config, log_level),
        Command::Reset => models::run_reset(&config, log_level),
        Command::List => models::run_list(&config, log_level),
        Command::Create(args) => models::run_create(&config, args, log_level),
        Command::Delete(args) => models::run_delete(&config, args, log_level),
        Command::Teach(args) => teach::run_teach(&config, args, log_level),
        Command::Predict(args) => inspect::run_predict(&config, args),
        Command::Evaluate(args) => inspect::run_evaluate(&config, args),
        Command::Matrix(args) => inspect::run_matrix(&config, args, log_level),
        Command::History(args) => inspect::run_history(&config, args),
    }
}
