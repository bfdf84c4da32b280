//! Project-relative paths used by the management commands
//!
//! Everything is resolved against the project root, which is the current
//! working directory unless `SVCPROBE_ROOT` is set.

use std::path::PathBuf;

/// Default configuration file holding per-service connection settings
pub const DEFAULT_CONFIG_FILE: &str = "test.config.json";

/// Directory holding the durable request log
const LOG_DIR: &str = ".logs";

/// File name of the durable request log
const LOG_FILE: &str = "api-requests.log";

/// Get the project root directory
pub fn project_root() -> PathBuf {
    std::env::var_os("SVCPROBE_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Path to the development docker compose file
pub fn compose_dev_file() -> PathBuf {
    project_root().join("infra").join("dev").join("docker-compose.yml")
}

/// Path to the maven wrapper used to run the application server
pub fn mvnw() -> PathBuf {
    project_root().join("mvnw")
}

/// Get the default path of the durable request log
pub fn request_log_path() -> PathBuf {
    project_root().join(LOG_DIR).join(LOG_FILE)
}

/// Get the default path of the service configuration file
pub fn config_path() -> PathBuf {
    project_root().join(DEFAULT_CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_log_path_is_under_log_dir() {
        let path = request_log_path();
        assert!(path.ends_with(".logs/api-requests.log"));
    }

    #[test]
    fn test_compose_file_layout() {
        assert!(compose_dev_file().ends_with("infra/dev/docker-compose.yml"));
    }
}
