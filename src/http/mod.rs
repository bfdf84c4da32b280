//! Request client bound to one configured service
//!
//! A [`Harness`] is the base every test suite is built on: it owns the
//! service's connection settings, an HTTP client and the reporter, and
//! turns each response into an [`HttpOutcome`].

mod method;
mod response;

use std::path::PathBuf;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::common::config::{ConfigSource, ServiceConfig};
use crate::common::logging::TestLog;
use crate::common::{Error, Result};
use crate::testing::Reporter;

pub use method::Method;
pub use response::{is_json_content_type, normalize_body, Body, HttpOutcome};

/// Extra settings for a single request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    headers: Vec<(String, String)>,
    json: Option<Value>,
    query: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            json: None,
            query: Vec::new(),
        }
    }
}

impl RequestOptions {
    /// Options with the default `Content-Type: application/json` header
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole header set, dropping the default
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Set one header, replacing any existing value of the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// `Authorization: Bearer <token>`
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    /// JSON request body
    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    /// Append a query string parameter
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn header_list(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// Base capability shared by every test suite
#[derive(Debug)]
pub struct Harness {
    service: String,
    config: ServiceConfig,
    client: reqwest::Client,
    reporter: Reporter,
}

impl Harness {
    /// Start configuring a harness for the named service
    pub fn builder(service: impl Into<String>) -> HarnessBuilder {
        HarnessBuilder::new(service.into())
    }

    /// Harness for `service` from the given source, printing its config to stdout
    pub fn new(service: &str, source: impl Into<ConfigSource>) -> Result<Self> {
        Self::builder(service).config_source(source).build()
    }

    pub fn service_name(&self) -> &str {
        &self.service
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Issue a request against the service and normalize the response
    ///
    /// No status range is enforced; callers decide what counts as success.
    /// There is no timeout beyond whatever the transport applies.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<HttpOutcome> {
        let url = self.config.url_for(endpoint);
        let mut builder = self.client.request(method.to_reqwest(), &url);

        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = &options.json {
            builder = builder.json(body);
        }

        tracing::debug!(%method, %url, "Sending request");
        let response = builder.send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await?;

        self.reporter.note(&format!("HTTP {method} {status} - {url}"));

        let body = normalize_body(content_type.as_deref(), &bytes)?;
        Ok(HttpOutcome { body, status })
    }

    /// Method given by name, as read from user input
    pub async fn request_named(
        &self,
        method: &str,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<HttpOutcome> {
        let method = method.parse::<Method>()?;
        self.request(method, endpoint, options).await
    }

    pub async fn get(&self, endpoint: &str) -> Result<HttpOutcome> {
        self.request(Method::Get, endpoint, RequestOptions::default())
            .await
    }

    /// POST with a JSON body and default headers
    pub async fn post_json(&self, endpoint: &str, body: Value) -> Result<HttpOutcome> {
        self.request(Method::Post, endpoint, RequestOptions::default().json(body))
            .await
    }
}

/// Builder for [`Harness`]
#[derive(Debug)]
pub struct HarnessBuilder {
    service: String,
    source: ConfigSource,
    print_config: bool,
    reporter: Option<Reporter>,
    log: Option<TestLog>,
}

impl HarnessBuilder {
    fn new(service: String) -> Self {
        Self {
            service,
            source: ConfigSource::default(),
            print_config: true,
            reporter: None,
            log: None,
        }
    }

    pub fn config_source(mut self, source: impl Into<ConfigSource>) -> Self {
        self.source = source.into();
        self
    }

    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = ConfigSource::File(path.into());
        self
    }

    /// Show the loaded configuration on construction (default: on)
    pub fn print_config(mut self, print: bool) -> Self {
        self.print_config = print;
        self
    }

    /// Output channel to report to (default: stdout)
    pub fn reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Durable log for requests and results
    pub fn log(mut self, log: TestLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Load the service's configuration and create the harness
    ///
    /// Fails with [`Error::ConfigMissing`] when the service is not
    /// configured; nothing has been run at that point.
    pub fn build(self) -> Result<Harness> {
        let mut reporter = self.reporter.unwrap_or_default();
        if let Some(log) = self.log {
            reporter = reporter.with_log(log);
        }

        reporter.info("Loading config");
        let config = match self.source.resolve(&self.service) {
            Ok(config) => config,
            Err(e @ Error::ConfigMissing { .. }) => {
                reporter.error(&format!("{} not found in config", self.service));
                return Err(e);
            }
            Err(e) => {
                reporter.error(&e.to_string());
                return Err(e);
            }
        };

        if self.print_config {
            reporter.info(&format!("Configuration for {}:", self.service));
            let rendered = serde_json::to_string_pretty(&config)?;
            for line in rendered.lines() {
                reporter.line(line);
            }
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("svcprobe/", env!("CARGO_PKG_VERSION")))
            .build()?;

        reporter.note("Test object created.");

        Ok(Harness {
            service: self.service,
            config,
            client,
            reporter,
        })
    }
}
