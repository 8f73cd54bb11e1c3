//! contract-fill: collect contract fields over several invocations, then fill the template.
//!
//! Every invocation loads the state file, performs one operation and persists the
//! result before exiting. Exit status is 0 on success, 1 on any error and 2 when
//! generation is refused because fields are still missing.

mod cli;
mod commands;
mod config;
mod report;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match commands::run(cli) {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only reports.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
