use std::{path::PathBuf, str::FromStr, time::Duration};

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const MAX_ATTEMPTS_CEILING: u32 = 10;
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(15);
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {name}")]
    InvalidVar { name: &'static str, value: String },
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("max_attempts must be between 1 and 10, got {0}")]
    MaxAttempts(u32),
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}

/// Knobs for a scrape run.
///
/// Defaults are overlaid by `STATEHOUSE_*` environment variables
/// ([`ScrapeConfig::from_env`]) and then by CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Bills fetched at the same time.
    pub concurrency: usize,
    pub max_attempts: u32,
    /// Retry `n` waits `n * backoff_base`.
    pub backoff_base: Duration,
    /// Sleep before every request.
    pub request_delay: Duration,
    pub timeout: Duration,
    pub output_dir: PathBuf,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
            request_delay: DEFAULT_REQUEST_DELAY,
            timeout: DEFAULT_TIMEOUT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidVar { name, value })
}

impl ScrapeConfig {
    /// Reads:
    /// - `STATEHOUSE_CONCURRENCY`
    /// - `STATEHOUSE_MAX_ATTEMPTS`
    /// - `STATEHOUSE_BACKOFF_SECS`
    /// - `STATEHOUSE_REQUEST_DELAY_MS`
    /// - `STATEHOUSE_TIMEOUT_SECS`
    /// - `STATEHOUSE_OUTPUT_DIR`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(v) = lookup("STATEHOUSE_CONCURRENCY") {
            config.concurrency = parse_var("STATEHOUSE_CONCURRENCY", v)?;
        }
        if let Some(v) = lookup("STATEHOUSE_MAX_ATTEMPTS") {
            config.max_attempts = parse_var("STATEHOUSE_MAX_ATTEMPTS", v)?;
        }
        if let Some(v) = lookup("STATEHOUSE_BACKOFF_SECS") {
            config.backoff_base = Duration::from_secs(parse_var("STATEHOUSE_BACKOFF_SECS", v)?);
        }
        if let Some(v) = lookup("STATEHOUSE_REQUEST_DELAY_MS") {
            config.request_delay = Duration::from_millis(parse_var("STATEHOUSE_REQUEST_DELAY_MS", v)?);
        }
        if let Some(v) = lookup("STATEHOUSE_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_var("STATEHOUSE_TIMEOUT_SECS", v)?);
        }
        if let Some(v) = lookup("STATEHOUSE_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(v);
        }
        config.validate()
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if !(1..=MAX_ATTEMPTS_CEILING).contains(&self.max_attempts) {
            return Err(ConfigError::MaxAttempts(self.max_attempts));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(self)
    }
}
