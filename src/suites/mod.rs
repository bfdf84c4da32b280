//! Test suites shipped with the harness

pub mod auth;

pub use auth::{AuthSuite, Credentials};
