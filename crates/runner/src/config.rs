// Copyright 2025 Portfolio E2E Contributors
// SPDX-License-Identifier: Apache-2.0

//! Runner configuration.
//!
//! Values are layered from built-in defaults, an optional TOML file, and
//! `PORTFOLIO_E2E_*` environment variables. Command-line overrides are
//! applied by the caller on the resulting [`RunnerConfig`].
//!
//! # Example
//!
//! ```toml
//! base_url = "http://localhost:8001"
//! report_path = "target/backend_test_results.json"
//! read_timeout_secs = 5
//! ```

use portfolio_e2e_report::io::DEFAULT_REPORT_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default deployment under test.
pub const DEFAULT_BASE_URL: &str = "https://free-or-not-17.preview.emergentagent.com";

/// Default path prefix of the API routes.
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PORTFOLIO_E2E";

/// Pause after the email-triggering submission. Not configurable.
pub const EMAIL_DISPATCH_PAUSE: Duration = Duration::from_secs(2);

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// A value is out of range or malformed
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid {
        /// Offending key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings for one run of the probe battery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Service root, without the API prefix.
    pub base_url: String,
    /// Path prefix joined onto `base_url` for every probe.
    pub api_prefix: String,
    /// Where the JSON artifact is written.
    pub report_path: PathBuf,
    /// Timeout for reads, OPTIONS and validation submissions.
    pub read_timeout_secs: u64,
    /// Timeout for the contact submission probe.
    pub submit_timeout_secs: u64,
    /// Timeout for the email-triggering submission.
    pub email_timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            read_timeout_secs: 10,
            submit_timeout_secs: 15,
            email_timeout_secs: 20,
        }
    }
}

impl RunnerConfig {
    /// Config targeting `base_url` with every other value defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load defaults, then `file` (if given), then `PORTFOLIO_E2E_*` variables.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(file, ENV_PREFIX)
    }

    fn load_with_prefix(file: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = ::config::Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("api_prefix", defaults.api_prefix)?
            .set_default("report_path", defaults.report_path.display().to_string())?
            .set_default("read_timeout_secs", defaults.read_timeout_secs as i64)?
            .set_default("submit_timeout_secs", defaults.submit_timeout_secs as i64)?
            .set_default("email_timeout_secs", defaults.email_timeout_secs as i64)?;

        if let Some(path) = file {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(true),
            );
        }

        let loaded: Self = builder
            .add_source(::config::Environment::with_prefix(env_prefix).try_parsing(true))
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Check the URL and timeouts.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::Invalid {
            key: "base_url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "base_url",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        for (key, value) in [
            ("read_timeout_secs", self.read_timeout_secs),
            ("submit_timeout_secs", self.submit_timeout_secs),
            ("email_timeout_secs", self.email_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "timeout must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Base URL joined with the API prefix, without a trailing slash.
    pub fn api_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }

    /// Timeout for simple reads.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Timeout for the contact submission.
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    /// Timeout for the email-triggering submission.
    pub fn email_timeout(&self) -> Duration {
        Duration::from_secs(self.email_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.api_url(), format!("{DEFAULT_BASE_URL}/api"));
        assert_eq!(config.report_path, PathBuf::from("/app/backend_test_results.json"));
        assert_eq!(config.read_timeout(), Duration::from_secs(10));
        assert_eq!(config.submit_timeout(), Duration::from_secs(15));
        assert_eq!(config.email_timeout(), Duration::from_secs(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_url_does_not_double_slashes() {
        let mut config = RunnerConfig::new("http://localhost:8001/");
        assert_eq!(config.api_url(), "http://localhost:8001/api");

        config.api_prefix = "/api/".to_string();
        assert_eq!(config.api_url(), "http://localhost:8001/api");

        config.api_prefix = String::new();
        assert_eq!(config.api_url(), "http://localhost:8001");
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = RunnerConfig::new("not a url");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "base_url", .. })
        ));

        let config = RunnerConfig::new("ftp://example.com");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = RunnerConfig::default();
        config.email_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "email_timeout_secs", .. })
        ));
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        let config = RunnerConfig::load_with_prefix(None, "PORTFOLIO_E2E_TEST_UNSET").unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "base_url = \"http://127.0.0.1:9000\"").unwrap();
        writeln!(file, "read_timeout_secs = 3").unwrap();

        let config =
            RunnerConfig::load_with_prefix(Some(file.path()), "PORTFOLIO_E2E_TEST_FILE").unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.read_timeout_secs, 3);
        assert_eq!(config.submit_timeout_secs, 15);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "base_url = \"http://127.0.0.1:9000\"").unwrap();
        std::env::set_var("PORTFOLIO_E2E_TEST_ENV_BASE_URL", "http://127.0.0.1:9100");

        let config =
            RunnerConfig::load_with_prefix(Some(file.path()), "PORTFOLIO_E2E_TEST_ENV").unwrap();
        std::env::remove_var("PORTFOLIO_E2E_TEST_ENV_BASE_URL");

        assert_eq!(config.base_url, "http://127.0.0.1:9100");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = RunnerConfig::load_with_prefix(
            Some(Path::new("/nonexistent/portfolio-e2e.toml")),
            "PORTFOLIO_E2E_TEST_MISSING",
        );
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
