//! Test discovery, execution and reporting
//!
//! A suite wraps a [`Harness`](crate::http::Harness) and declares its test
//! operations in a [`Catalog`]. The runner discovers them, runs the
//! selection in order with per-test failure isolation, and reports a
//! [`RunResult`].

mod catalog;
mod report;
mod runner;

pub use catalog::{
    discoverable_tests, is_base_operation, is_private, Catalog, TestCase, TestFn, TestFuture,
    TestSuite, BASE_OPERATIONS, PRIVATE_PREFIX,
};
pub use report::{CapturedOutput, Reporter, Tag};
pub use runner::{execute_tests, RunResult, RunState, Runner, TestOutcome, TestRecord};
