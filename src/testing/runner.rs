//! Test runner implementation
//!
//! Runs a suite's tests one at a time, in order. A failing test is counted
//! and reported, never allowed to stop the tests after it. Only fatal
//! errors (see [`Error::is_fatal`]) abort a run.

use std::fmt;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use crate::common::{Error, Result};

use super::catalog::{discoverable_tests, TestSuite};
use super::report::Reporter;

/// Aggregate result of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunResult {
    pub passed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunResult {
    /// No test failed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PASSED: {}, SKIPPED: {}, FAILED: {}",
            self.passed, self.skipped, self.failed
        )
    }
}

/// How a single test ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    /// An expectation inside the test did not hold
    Failed(String),
    /// The test raised some other error
    Errored(String),
    /// The test panicked
    Panicked(String),
    /// The name did not resolve to a test
    Skipped,
}

impl TestOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            TestOutcome::Failed(_) | TestOutcome::Errored(_) | TestOutcome::Panicked(_)
        )
    }
}

/// Outcome of one named test within a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    pub name: String,
    pub outcome: TestOutcome,
}

/// Phases a run moves through; each is entered once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Discovering,
    Selecting,
    Running,
    Reporting,
    Done,
}

/// Drives one run of a suite
pub struct Runner<'s, S: TestSuite> {
    suite: &'s mut S,
    reporter: Reporter,
    state: RunState,
    records: Vec<TestRecord>,
}

impl<'s, S: TestSuite> Runner<'s, S> {
    pub fn new(suite: &'s mut S) -> Self {
        let reporter = suite.harness().reporter().clone();
        Self {
            suite,
            reporter,
            state: RunState::Idle,
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Per-test outcomes of the last run, in execution order
    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = ?self.state, to = ?next, "Runner state change");
        self.state = next;
    }

    /// Run `selection`, or every discoverable test when it is empty
    ///
    /// Unknown or private names in the selection are skipped with a warning.
    pub async fn run(&mut self, selection: &[String]) -> Result<RunResult> {
        self.records.clear();
        self.state = RunState::Idle;

        self.transition(RunState::Discovering);
        let discovered = discoverable_tests(&*self.suite);

        self.transition(RunState::Selecting);
        let selected = if selection.is_empty() {
            discovered.clone()
        } else {
            self.dedup_selection(selection)
        };

        self.reporter
            .banner(self.suite.harness().service_name(), &discovered, &selected);

        self.transition(RunState::Running);
        let mut result = RunResult::default();
        let mut not_callable = 0;

        for name in &selected {
            let outcome = self.run_one(name).await?;
            match &outcome {
                TestOutcome::Passed => result.passed += 1,
                TestOutcome::Skipped => not_callable += 1,
                _ => result.failed += 1,
            }
            self.records.push(TestRecord {
                name: name.clone(),
                outcome,
            });
        }

        // |D| - |S|, plus one per selected name that did not resolve.
        // Selected names are unique, so this is never negative.
        result.skipped = (discovered.len() + not_callable).saturating_sub(selected.len());

        self.transition(RunState::Reporting);
        self.reporter.summary(&result);

        self.transition(RunState::Done);
        Ok(result)
    }

    fn dedup_selection(&self, selection: &[String]) -> Vec<String> {
        let mut selected: Vec<String> = Vec::with_capacity(selection.len());
        for name in selection {
            if selected.contains(name) {
                self.reporter
                    .warn(&format!("{name} selected more than once. Ignoring repeat."));
            } else {
                selected.push(name.clone());
            }
        }
        selected
    }

    async fn run_one(&mut self, name: &str) -> Result<TestOutcome> {
        let Some(op) = self.suite.catalog().resolve(name) else {
            self.reporter
                .warn(&format!("{name} is not callable. Skipped."));
            return Ok(TestOutcome::Skipped);
        };

        tracing::debug!(test = name, "Running test");
        let outcome = match AssertUnwindSafe(op(&mut *self.suite)).catch_unwind().await {
            Ok(Ok(())) => {
                self.reporter.pass(name);
                TestOutcome::Passed
            }
            Ok(Err(e)) if e.is_fatal() => {
                self.reporter
                    .critical(&format!("FATAL - {name} - {e}"));
                return Err(e);
            }
            Ok(Err(Error::TestAssertion(message))) => {
                self.reporter.fail(&format!("{name} - {message}"));
                TestOutcome::Failed(message)
            }
            Ok(Err(e)) => {
                let message = e.to_string();
                self.reporter
                    .critical(&format!("UNHANDLED ERROR - {name} - {message}"));
                TestOutcome::Errored(message)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.reporter
                    .critical(&format!("PANIC - {name} - {message}"));
                TestOutcome::Panicked(message)
            }
        };

        Ok(outcome)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run a suite's tests and return the tally
///
/// An empty `selection` runs every discoverable test.
pub async fn execute_tests<S: TestSuite>(suite: &mut S, selection: &[String]) -> Result<RunResult> {
    Runner::new(suite).run(selection).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::ServiceConfig;
    use crate::http::{Harness, RequestOptions};
    use crate::testing::{Catalog, CapturedOutput, TestFuture};
    use std::collections::HashMap;

    struct CountingSuite {
        harness: Harness,
        catalog: Catalog<Self>,
        calls: Vec<&'static str>,
    }

    impl CountingSuite {
        fn new(output: &CapturedOutput) -> Self {
            let mut services = HashMap::new();
            services.insert("svc".to_string(), ServiceConfig::new("localhost", 8080));
            let harness = Harness::builder("svc")
                .config_source(services)
                .print_config(false)
                .reporter(output.reporter())
                .build()
                .unwrap();

            Self {
                harness,
                catalog: crate::catalog!(CountingSuite => [first, broken, second, errors, panics, _private]),
                calls: Vec::new(),
            }
        }

        fn first(&mut self) -> TestFuture<'_> {
            Box::pin(async move {
                self.calls.push("first");
                Ok(())
            })
        }

        fn broken(&mut self) -> TestFuture<'_> {
            Box::pin(async move {
                self.calls.push("broken");
                crate::check!(1 + 1 == 3, "Arithmetic is off");
                Ok(())
            })
        }

        fn second(&mut self) -> TestFuture<'_> {
            Box::pin(async move {
                self.calls.push("second");
                Ok(())
            })
        }

        fn errors(&mut self) -> TestFuture<'_> {
            Box::pin(async move {
                self.calls.push("errors");
                Err(Error::Internal("connection reset".to_string()))
            })
        }

        fn panics(&mut self) -> TestFuture<'_> {
            Box::pin(async move {
                self.calls.push("panics");
                if !self.calls.is_empty() {
                    panic!("index out of bounds");
                }
                Ok(())
            })
        }

        fn _private(&mut self) -> TestFuture<'_> {
            Box::pin(async move {
                self.calls.push("_private");
                Ok(())
            })
        }
    }

    impl TestSuite for CountingSuite {
        fn harness(&self) -> &Harness {
            &self.harness
        }

        fn catalog(&self) -> &Catalog<Self> {
            &self.catalog
        }
    }

    struct MethodSuite {
        harness: Harness,
        catalog: Catalog<Self>,
        calls: Vec<&'static str>,
    }

    impl MethodSuite {
        fn new(output: &CapturedOutput) -> Self {
            let mut services = HashMap::new();
            services.insert("svc".to_string(), ServiceConfig::new("localhost", 8080));
            let harness = Harness::builder("svc")
                .config_source(services)
                .print_config(false)
                .reporter(output.reporter())
                .build()
                .unwrap();

            Self {
                harness,
                catalog: crate::catalog!(MethodSuite => [trace_health, after]),
                calls: Vec::new(),
            }
        }

        fn trace_health(&mut self) -> TestFuture<'_> {
            Box::pin(async move {
                self.calls.push("trace_health");
                self.harness
                    .request_named("TRACE", "health", RequestOptions::new())
                    .await?;
                Ok(())
            })
        }

        fn after(&mut self) -> TestFuture<'_> {
            Box::pin(async move {
                self.calls.push("after");
                Ok(())
            })
        }
    }

    impl TestSuite for MethodSuite {
        fn harness(&self) -> &Harness {
            &self.harness
        }

        fn catalog(&self) -> &Catalog<Self> {
            &self.catalog
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let output = CapturedOutput::new();
        let mut suite = CountingSuite::new(&output);

        let result = execute_tests(&mut suite, &[]).await.unwrap();

        assert_eq!(
            result,
            RunResult {
                passed: 2,
                skipped: 0,
                failed: 3
            }
        );
        assert_eq!(
            suite.calls,
            vec!["first", "broken", "second", "errors", "panics"]
        );

        let out = output.contents();
        assert!(out.contains("[ FAIL  ] - broken - Arithmetic is off"));
        assert!(out.contains("[ XXXXX ] - UNHANDLED ERROR - errors - Internal error: connection reset"));
        assert!(out.contains("[ XXXXX ] - PANIC - panics - index out of bounds"));
        assert!(out.contains("PASSED: 2, SKIPPED: 0, FAILED: 3"));
    }

    #[tokio::test]
    async fn test_explicit_selection_counts_skips() {
        let output = CapturedOutput::new();
        let mut suite = CountingSuite::new(&output);

        let result = execute_tests(&mut suite, &names(&["second", "first"]))
            .await
            .unwrap();

        assert_eq!(result.passed, 2);
        assert_eq!(result.failed, 0);
        assert_eq!(result.skipped, 3);
        assert_eq!(suite.calls, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_unknown_and_private_names_are_skipped() {
        let output = CapturedOutput::new();
        let mut suite = CountingSuite::new(&output);

        let result = execute_tests(&mut suite, &names(&["first", "ghost", "_private"]))
            .await
            .unwrap();

        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 0);
        // Four discovered tests were not selected; the two unresolvable
        // names add a skip each on top of |D| - |S|.
        assert_eq!(result.skipped, 4);
        assert!(suite.calls.iter().all(|c| *c != "_private"));
        assert!(output.contents().contains("ghost is not callable. Skipped."));
    }

    #[tokio::test]
    async fn test_duplicate_selection_runs_once() {
        let output = CapturedOutput::new();
        let mut suite = CountingSuite::new(&output);

        let result = execute_tests(&mut suite, &names(&["first", "first"]))
            .await
            .unwrap();

        assert_eq!(result.passed, 1);
        assert_eq!(result.skipped, 4);
        assert_eq!(suite.calls, vec!["first"]);
    }

    #[tokio::test]
    async fn test_runner_reaches_done_and_records_outcomes() {
        let output = CapturedOutput::new();
        let mut suite = CountingSuite::new(&output);

        let mut runner = Runner::new(&mut suite);
        assert_eq!(runner.state(), RunState::Idle);

        runner.run(&names(&["first", "broken"])).await.unwrap();
        assert_eq!(runner.state(), RunState::Done);

        let records = runner.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outcome, TestOutcome::Passed);
        assert_eq!(
            records[1].outcome,
            TestOutcome::Failed("Arithmetic is off".to_string())
        );
        assert!(records[1].outcome.is_failure());
    }

    #[tokio::test]
    async fn test_repeated_runs_give_same_counts() {
        let output = CapturedOutput::new();
        let mut suite = CountingSuite::new(&output);

        let first = execute_tests(&mut suite, &[]).await.unwrap();
        let second = execute_tests(&mut suite, &[]).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unsupported_method_aborts_run() {
        let output = CapturedOutput::new();
        let mut suite = MethodSuite::new(&output);

        let mut runner = Runner::new(&mut suite);
        let result = runner.run(&[]).await;

        assert!(matches!(result, Err(Error::UnsupportedMethod(ref m)) if m == "TRACE"));
        assert_eq!(runner.state(), RunState::Running);
        assert!(runner.records().is_empty());
        drop(runner);

        assert_eq!(suite.calls, vec!["trace_health"]);
        let out = output.contents();
        assert!(out.contains("FATAL - trace_health"));
        assert!(!out.contains("PASSED:"));
    }
}
