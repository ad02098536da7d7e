//! Session configuration and log initialization.
//!
//! Configuration starts from defaults, applies an optional YAML file,
//! then environment variables (`BANCADA_*`), so CI can override a
//! checked-in config file without editing it.

use crate::driver::DriverConfig;
use crate::result::{BancadaError, BancadaResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the optional YAML config file
pub const CONFIG_FILE_VAR: &str = "BANCADA_CONFIG";

/// Session configuration for a test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Base URL of the application under test
    pub base_url: String,
    /// Account used for login and the remote API
    pub username: String,
    /// Password for the account
    pub password: String,
    /// Run the browser without a visible window
    pub headless: bool,
    /// Default wait budget in milliseconds
    pub default_timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            username: String::new(),
            password: String::new(),
            headless: true,
            default_timeout_ms: crate::wait::DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: crate::wait::DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl SessionConfig {
    /// Load configuration: defaults, then the YAML file named by
    /// `BANCADA_CONFIG` (if set), then `BANCADA_*` variables.
    pub fn load() -> BancadaResult<Self> {
        let mut config = match std::env::var(CONFIG_FILE_VAR) {
            Ok(path) => Self::from_yaml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Read configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> BancadaResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&raw).map_err(|e| BancadaError::Config {
            message: format!("invalid config file '{}': {e}", path.display()),
        })
    }

    /// Apply `BANCADA_*` overrides from a variable lookup
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> BancadaResult<()> {
        if let Some(v) = lookup("BANCADA_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("BANCADA_USERNAME") {
            self.username = v;
        }
        if let Some(v) = lookup("BANCADA_PASSWORD") {
            self.password = v;
        }
        if let Some(v) = lookup("BANCADA_HEADLESS") {
            self.headless = parse_bool("BANCADA_HEADLESS", &v)?;
        }
        if let Some(v) = lookup("BANCADA_TIMEOUT_MS") {
            self.default_timeout_ms = parse_ms("BANCADA_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("BANCADA_POLL_INTERVAL_MS") {
            self.poll_interval_ms = parse_ms("BANCADA_POLL_INTERVAL_MS", &v)?;
        }
        Ok(())
    }

    /// Wait options derived from the configured budgets
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.default_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Driver configuration derived from this session
    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig::new()
            .headless(self.headless)
            .element_timeout(Duration::from_millis(self.default_timeout_ms))
    }
}

fn parse_bool(name: &str, value: &str) -> BancadaResult<bool> {
    match value {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(BancadaError::Config {
            message: format!("{name} must be a boolean, got '{other}'"),
        }),
    }
}

fn parse_ms(name: &str, value: &str) -> BancadaResult<u64> {
    value.parse().map_err(|_| BancadaError::Config {
        message: format!("{name} must be milliseconds, got '{value}'"),
    })
}

/// Install the test-run tracing subscriber.
///
/// Filtering follows `RUST_LOG`; repeated calls are no-ops so every
/// test can call this unconditionally.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
