//! Registration, login and current-user checks for the backend service

use serde::Serialize;

use crate::common::Result;
use crate::http::{Harness, Method, RequestOptions};
use crate::testing::{Catalog, TestFuture, TestSuite};
use crate::check;

/// Account used by the suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: "test@email.com".to_string(),
            password: "123".to_string(),
        }
    }
}

/// Login and user-info flow
///
/// Tests share state through the suite: `obtain_token` stores the token
/// that `user_info` sends, so they rely on running in declaration order.
#[derive(Debug)]
pub struct AuthSuite {
    harness: Harness,
    catalog: Catalog<Self>,
    credentials: Credentials,
    token: Option<String>,
}

impl AuthSuite {
    pub fn new(harness: Harness) -> Self {
        Self {
            harness,
            catalog: crate::catalog!(AuthSuite => [
                health_check,
                create_user,
                obtain_token,
                user_info,
            ]),
            credentials: Credentials::default(),
            token: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Token obtained by the last successful login
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn credentials_body(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.credentials)?)
    }

    pub fn health_check(&mut self) -> TestFuture<'_> {
        Box::pin(async move {
            let outcome = self.harness.get("health").await?;
            check!(outcome.status == 200, "Unexpected status code: {}", outcome.status);
            Ok(())
        })
    }

    pub fn create_user(&mut self) -> TestFuture<'_> {
        Box::pin(async move {
            let outcome = self
                .harness
                .post_json("auth/register", self.credentials_body()?)
                .await?;

            check!(
                outcome.text().is_some(),
                "Expected response type 'text', got: '{}'",
                outcome.body_kind()
            );
            check!(
                outcome.is_success(),
                "Response code violates 2XX range: {}",
                outcome.status
            );
            Ok(())
        })
    }

    pub fn obtain_token(&mut self) -> TestFuture<'_> {
        Box::pin(async move {
            let outcome = self
                .harness
                .post_json("auth/login", self.credentials_body()?)
                .await?;

            check!(
                outcome.json_object().is_some(),
                "Expected response type 'object', got: '{}'",
                outcome.body_kind()
            );

            let token = outcome.json_str("token");
            check!(!token.is_empty(), "Token is absent in response body");

            self.token = Some(token.to_string());
            Ok(())
        })
    }

    pub fn user_info(&mut self) -> TestFuture<'_> {
        Box::pin(async move {
            let token = self.token.clone().unwrap_or_default();
            let outcome = self
                .harness
                .request(
                    Method::Post,
                    "users/current-user-info",
                    RequestOptions::new().bearer(&token),
                )
                .await?;

            check!(
                outcome.json_object().is_some(),
                "Expected response type 'object', got: '{}'",
                outcome.body_kind()
            );
            check!(
                outcome.is_success(),
                "Response code violates 2XX range: {}",
                outcome.status
            );
            Ok(())
        })
    }
}

impl TestSuite for AuthSuite {
    fn harness(&self) -> &Harness {
        &self.harness
    }

    fn catalog(&self) -> &Catalog<Self> {
        &self.catalog
    }
}
