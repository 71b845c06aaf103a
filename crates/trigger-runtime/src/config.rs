//! # Runtime Configuration
//!
//! One `RuntimeConfig` is built at startup and passed by reference to
//! everything that needs it.
//!
//! Sources, later ones winning:
//! 1. `Default`
//! 2. JSON document (`from_json_str`), missing fields keep their defaults
//! 3. `PF_*` environment variables (`apply_env`)

use pf_06_notifications::{EmailConfig, Network, RetryConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds an unusable value.
    #[error("Invalid value {value:?} for {var}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// The HTTP transport is selected but credentials are missing.
    #[error("Email API credentials missing: set PF_EMAIL_API_KEY, PF_EMAIL_API_SECRET and PF_EMAIL_SMTP_ACCOUNT, or enable dry_run")]
    MissingCredentials,

    /// Retry policy is unusable.
    #[error("Invalid retry policy: {0}")]
    InvalidRetry(String),

    /// Bus capacity is zero.
    #[error("bus_capacity cannot be 0")]
    InvalidBusCapacity,

    /// JSON document could not be parsed.
    #[error("Cannot parse configuration: {0}")]
    Parse(String),

    /// Logging could not be installed.
    #[error("Cannot initialize logging: {0}")]
    Logging(String),
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `pf_06_notifications=debug`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Deployment network.
    pub network: Network,
    /// Email API.
    pub email: EmailConfig,
    /// Transport retry policy.
    pub retry: RetryConfig,
    /// Logging.
    pub log: LogConfig,
    /// Commit queue capacity; writers wait while it is full.
    pub bus_capacity: usize,
    /// Record emails instead of sending them.
    pub dry_run: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            email: EmailConfig::default(),
            retry: RetryConfig::default(),
            log: LogConfig::default(),
            bus_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
            dry_run: false,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Override fields from environment-style variables.
    ///
    /// # Environment Variables
    ///
    /// - `PF_NETWORK`: `mainnet` or `testnet`
    /// - `PF_EMAIL_API_URL`, `PF_EMAIL_API_KEY`, `PF_EMAIL_API_SECRET`,
    ///   `PF_EMAIL_SMTP_ACCOUNT`, `PF_EMAIL_FROM`
    /// - `PF_EMAIL_TIMEOUT_SECS`
    /// - `PF_RETRY_MAX_ATTEMPTS`, `PF_RETRY_INITIAL_BACKOFF_MS`,
    ///   `PF_RETRY_MAX_BACKOFF_MS`
    /// - `PF_LOG_LEVEL` or `RUST_LOG`
    /// - `PF_BUS_CAPACITY`
    /// - `PF_DRY_RUN`: `true`/`1` to record emails instead of sending
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("PF_NETWORK") {
            self.network = Network::parse(&value).ok_or(ConfigError::InvalidValue {
                var: "PF_NETWORK",
                value,
            })?;
        }

        if let Some(value) = lookup("PF_EMAIL_API_URL") {
            self.email.api_url = value;
        }
        if let Some(value) = lookup("PF_EMAIL_API_KEY") {
            self.email.api_key = value;
        }
        if let Some(value) = lookup("PF_EMAIL_API_SECRET") {
            self.email.api_secret = value;
        }
        if let Some(value) = lookup("PF_EMAIL_SMTP_ACCOUNT") {
            self.email.smtp_account = value;
        }
        if let Some(value) = lookup("PF_EMAIL_FROM") {
            self.email.from = value;
        }
        if let Some(secs) = parse_var(&lookup, "PF_EMAIL_TIMEOUT_SECS")? {
            self.email.timeout_secs = secs;
        }

        if let Some(attempts) = parse_var(&lookup, "PF_RETRY_MAX_ATTEMPTS")? {
            self.retry.max_attempts = attempts;
        }
        if let Some(ms) = parse_var(&lookup, "PF_RETRY_INITIAL_BACKOFF_MS")? {
            self.retry.initial_backoff_ms = ms;
        }
        if let Some(ms) = parse_var(&lookup, "PF_RETRY_MAX_BACKOFF_MS")? {
            self.retry.max_backoff_ms = ms;
        }

        if let Some(level) = lookup("PF_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.log.level = level;
        }

        if let Some(capacity) = parse_var(&lookup, "PF_BUS_CAPACITY")? {
            self.bus_capacity = capacity;
        }

        if let Some(value) = lookup("PF_DRY_RUN") {
            self.dry_run = value.eq_ignore_ascii_case("true") || value == "1";
        }

        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidRetry(
                "max_attempts cannot be 0".into(),
            ));
        }

        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::InvalidRetry(
                "initial_backoff_ms exceeds max_backoff_ms".into(),
            ));
        }

        if self.bus_capacity == 0 {
            return Err(ConfigError::InvalidBusCapacity);
        }

        if !self.dry_run && !self.email.has_credentials() {
            return Err(ConfigError::MissingCredentials);
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var, value })
        })
        .transpose()
}
