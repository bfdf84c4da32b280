//! CLI command definitions
//!
//! Defines the clap commands for the management CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Bring the development infrastructure up
    Up,

    /// Tear the development infrastructure down
    Down,

    /// Hand the process over to the application server
    Server,

    /// Bring infrastructure up, then start the application server
    Dev,

    /// Run the HTTP integration tests against the service
    Test {
        /// Tests to run (default: every discovered test)
        tests: Vec<String>,

        /// Service name to look up in the configuration file
        #[arg(long, default_value = "backend")]
        service: String,

        /// Configuration file (JSON, or TOML with a .toml extension)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Durable request log (default: .logs/api-requests.log)
        #[arg(long)]
        log: Option<PathBuf>,

        /// Do not print the loaded configuration
        #[arg(long, short)]
        quiet: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Commands,
    }

    fn parse(args: &[&str]) -> Commands {
        TestCli::try_parse_from(std::iter::once("manage").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(parse(&["up"]), Commands::Up);
        assert_eq!(parse(&["down"]), Commands::Down);
        assert_eq!(parse(&["server"]), Commands::Server);
        assert_eq!(parse(&["dev"]), Commands::Dev);
    }

    #[test]
    fn test_parse_test_defaults() {
        match parse(&["test"]) {
            Commands::Test {
                tests,
                service,
                config,
                log,
                quiet,
            } => {
                assert!(tests.is_empty());
                assert_eq!(service, "backend");
                assert!(config.is_none());
                assert!(log.is_none());
                assert!(!quiet);
            }
            other => panic!("Expected Test command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_test_selection() {
        match parse(&["test", "health_check", "obtain_token", "--service", "svc", "-q"]) {
            Commands::Test {
                tests,
                service,
                quiet,
                ..
            } => {
                assert_eq!(tests, vec!["health_check", "obtain_token"]);
                assert_eq!(service, "svc");
                assert!(quiet);
            }
            other => panic!("Expected Test command, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result = TestCli::try_parse_from(["manage", "deploy"]);
        assert!(result.is_err());
    }
}
