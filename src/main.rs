//! Ensenar CLI
//!
//! # Usage
//!
//! ```bash
//! # Train the missing catalog models
//! ensenar bootstrap
//!
//! # Teach a model three new words
//! ensenar teach max --word aire=d --word baúl=h --word mesa=g
//!
//! # Classify a word
//! ensenar predict curriculum_max piano
//!
//! # Compare models on the held-out set
//! ensenar evaluate max curriculum_max
//! ```

use clap::Parser;
use ensenar::cli::{init_tracing, run_command, Cli, LogLevel};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(LogLevel::from_flags(cli.quiet, cli.verbose));

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error [{}]: {e}", e.code());
            ExitCode::FAILURE
        }
    }
}
