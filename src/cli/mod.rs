//! CLI command handling
//!
//! Dispatches management commands: infrastructure up/down, handing over to
//! the application server, and running the integration tests.

mod process;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::commands::Commands;
use crate::common::logging::TestLog;
use crate::common::{paths, Result};
use crate::http::Harness;
use crate::suites::AuthSuite;
use crate::testing::execute_tests;

pub use process::{compose_command, exec, exec_server, run_cmd};

/// How long `dev` waits for containers before starting the server
const INFRA_SETTLE_SECS: u64 = 5;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Up => {
            run_cmd(&compose_command(&["up", "-d"])).await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Down => {
            run_cmd(&compose_command(&["down"])).await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Server => {
            exec_server()?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Dev => {
            run_cmd(&compose_command(&["up", "-d"])).await?;
            println!("Waiting a bit for containers to initialize...");
            tokio::time::sleep(Duration::from_secs(INFRA_SETTLE_SECS)).await;
            println!("Handing over control to Spring Boot ...");
            exec_server()?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Test {
            tests,
            service,
            config,
            log,
            quiet,
        } => run_tests(&service, config, log, quiet, &tests).await,
    }
}

/// Run the shipped suite against `service`
///
/// Exits non-zero when any test failed.
async fn run_tests(
    service: &str,
    config: Option<PathBuf>,
    log: Option<PathBuf>,
    quiet: bool,
    tests: &[String],
) -> Result<ExitCode> {
    let log = TestLog::open(log.unwrap_or_else(paths::request_log_path))?;

    let mut builder = Harness::builder(service)
        .print_config(!quiet)
        .log(log.clone());
    if let Some(path) = config {
        builder = builder.config_file(path);
    }

    let result = match builder.build() {
        Ok(harness) => {
            let mut suite = AuthSuite::new(harness);
            execute_tests(&mut suite, tests).await
        }
        Err(e) => Err(e),
    };
    log.close()?;

    let result = result?;
    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
