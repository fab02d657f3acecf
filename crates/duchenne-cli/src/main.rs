//! `duchenne`: score face-detector output for smile authenticity.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cache;
mod commands;
mod config;
mod output;
mod telemetry;

use commands::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // -v overrides RUST_LOG; stderr only, stdout carries the JSON reports.
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = match &cli.command {
        Commands::Score(args) => commands::score::run(args),
        Commands::Policy(args) => commands::policy::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
