//! svcprobe - HTTP integration-test harness for a single backend service
//!
//! A [`Harness`] loads a named service's connection settings and issues
//! requests against it. Test suites build on the harness, declare their
//! test operations in a [`testing::Catalog`], and are run with
//! [`testing::execute_tests`], which isolates failures per test and
//! returns a pass/skip/fail tally.

pub mod cli;
pub mod commands;
pub mod common;
pub mod http;
pub mod suites;
pub mod testing;

// Re-export commonly used types for tests
pub use common::logging::TestLog;
pub use common::{Error, Result};
pub use http::{Body, Harness, HttpOutcome, Method, RequestOptions};
pub use testing::{execute_tests, RunResult, TestSuite};
