//! manage - development environment and integration-test runner
//!
//! One positional action: bring infrastructure up or down, start the
//! application server, do both, or run the HTTP integration tests.

use std::process::ExitCode;

use clap::Parser;
use svcprobe::common::logging;
use svcprobe::{cli, commands::Commands};

#[derive(Parser)]
#[command(name = "manage", about = "Manage the dev environment and run API tests")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_cli();

    let cli = Cli::parse();

    match cli::dispatch(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
