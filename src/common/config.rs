//! Service configuration file handling
//!
//! The configuration file maps service names to connection settings:
//!
//! ```json
//! { "backend": { "domain": "localhost", "port": 8080, "useHttps": false } }
//! ```
//!
//! A `.toml` file with one table per service is accepted as well.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{Error, Result};

/// Connection settings for a single service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Host name or address of the service
    #[serde(rename = "domain")]
    pub host: String,

    /// TCP port the service listens on
    pub port: u16,

    /// Use https instead of http
    #[serde(rename = "useHttps", default)]
    pub use_tls: bool,
}

impl ServiceConfig {
    /// Create a plain-http config
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            use_tls: false,
        }
    }

    /// URL scheme selected by `use_tls`
    pub fn scheme(&self) -> &'static str {
        if self.use_tls {
            "https"
        } else {
            "http"
        }
    }

    /// `scheme://host:port`, without a trailing slash
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.port)
    }

    /// Full URL for an endpoint relative to the service root
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url(), endpoint.trim_start_matches('/'))
    }
}

/// All services found in a configuration source
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Config {
    pub services: HashMap<String, ServiceConfig>,
}

impl Config {
    /// Parse JSON configuration text
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Parse TOML configuration text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Load configuration from a file, picking the format by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// Get a service's settings by name
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.get(name)
    }
}

/// Where a harness reads its service configuration from
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// A JSON or TOML file on disk
    File(PathBuf),
    /// An already loaded set of services
    Inline(HashMap<String, ServiceConfig>),
}

impl ConfigSource {
    /// Resolve a named service, failing with [`Error::ConfigMissing`] if absent
    pub fn resolve(&self, service: &str) -> Result<ServiceConfig> {
        let found = match self {
            ConfigSource::File(path) => Config::load(path)?.service(service).cloned(),
            ConfigSource::Inline(services) => services.get(service).cloned(),
        };

        found.ok_or_else(|| Error::config_missing(service, &self.describe()))
    }

    /// Human-readable name of the source for error messages
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::File(path) => path.display().to_string(),
            ConfigSource::Inline(_) => "inline configuration".to_string(),
        }
    }
}

impl Default for ConfigSource {
    fn default() -> Self {
        ConfigSource::File(super::paths::config_path())
    }
}

impl From<HashMap<String, ServiceConfig>> for ConfigSource {
    fn from(services: HashMap<String, ServiceConfig>) -> Self {
        ConfigSource::Inline(services)
    }
}
