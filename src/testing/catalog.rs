//! Test suites and test discovery
//!
//! A suite declares its operations once, at construction, in a [`Catalog`]:
//! a list of `name -> handle` pairs where each handle is a typed,
//! zero-argument async method of the suite. Discovery is the catalog minus
//! the harness's own operation names and minus private (`_`-prefixed) names.

use futures_util::future::BoxFuture;

use crate::common::Result;
use crate::http::Harness;

/// Future returned by a test operation
pub type TestFuture<'a> = BoxFuture<'a, Result<()>>;

/// Handle to a zero-argument test operation on suite `S`
///
/// A test passes by returning `Ok(())` and fails by returning an error; it
/// never produces a value for the runner.
pub type TestFn<S> = for<'a> fn(&'a mut S) -> TestFuture<'a>;

/// Operations every suite inherits from the harness; never tests
pub const BASE_OPERATIONS: &[&str] = &["service_name", "request", "execute_tests"];

/// Names with this prefix are private and never discovered
pub const PRIVATE_PREFIX: char = '_';

/// Whether `name` follows the private naming convention
pub fn is_private(name: &str) -> bool {
    name.starts_with(PRIVATE_PREFIX)
}

/// Whether `name` is one of the harness's own operations
pub fn is_base_operation(name: &str) -> bool {
    BASE_OPERATIONS.contains(&name)
}

/// A named test operation
pub struct TestCase<S> {
    name: String,
    op: TestFn<S>,
}

impl<S> TestCase<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> TestFn<S> {
        self.op
    }
}

impl<S> Clone for TestCase<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            op: self.op,
        }
    }
}

impl<S> std::fmt::Debug for TestCase<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TestCase").field(&self.name).finish()
    }
}

/// Operations exposed by a suite, in declaration order
pub struct Catalog<S> {
    cases: Vec<TestCase<S>>,
}

impl<S> Default for Catalog<S> {
    fn default() -> Self {
        Self { cases: Vec::new() }
    }
}

impl<S> Clone for Catalog<S> {
    fn clone(&self) -> Self {
        Self {
            cases: self.cases.clone(),
        }
    }
}

impl<S> std::fmt::Debug for Catalog<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.cases.iter().map(TestCase::name)).finish()
    }
}

impl<S> Catalog<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an operation; a repeated name keeps its first declaration
    pub fn test(mut self, name: impl Into<String>, op: TestFn<S>) -> Self {
        let name = name.into();
        if self.cases.iter().any(|c| c.name == name) {
            tracing::warn!(%name, "Operation declared twice, keeping the first");
        } else {
            self.cases.push(TestCase { name, op });
        }
        self
    }

    /// Every declared name, private and reserved ones included
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(TestCase::name)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Declared operations that count as tests
    pub fn discoverable(&self) -> impl Iterator<Item = &TestCase<S>> {
        self.cases
            .iter()
            .filter(|c| !is_private(&c.name) && !is_base_operation(&c.name))
    }

    /// Resolve a discoverable test by name
    pub fn resolve(&self, name: &str) -> Option<TestFn<S>> {
        self.discoverable()
            .find(|c| c.name == name)
            .map(TestCase::handle)
    }
}

/// A group of test operations built on a [`Harness`]
///
/// ```ignore
/// struct HealthSuite {
///     harness: Harness,
///     catalog: Catalog<Self>,
/// }
///
/// impl HealthSuite {
///     fn health_check(&mut self) -> TestFuture<'_> {
///         Box::pin(async move {
///             let outcome = self.harness.get("health").await?;
///             check!(outcome.status == 200, "Unexpected status code: {}", outcome.status);
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait TestSuite: Send + Sized {
    /// The base capability this suite is built on
    fn harness(&self) -> &Harness;

    /// Operations declared by this suite
    fn catalog(&self) -> &Catalog<Self>;
}

/// Names of the tests a suite exposes beyond the harness's own operations
pub fn discoverable_tests<S: TestSuite>(suite: &S) -> Vec<String> {
    suite
        .catalog()
        .discoverable()
        .map(|c| c.name().to_string())
        .collect()
}

/// Build a [`Catalog`] from method names on a suite type
///
/// `catalog!(MySuite => [health_check, obtain_token])` declares each method
/// under its own name.
#[macro_export]
macro_rules! catalog {
    ($suite:ty => [$($name:ident),* $(,)?]) => {
        $crate::testing::Catalog::<$suite>::new()
            $(.test(stringify!($name), <$suite>::$name))*
    };
}
