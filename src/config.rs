use std::time::Duration;

use crate::{Error, Result, DEFAULT_BASE_URL, DEFAULT_ROWS};

/// Environment variable the CLI reads the developer API key from.
pub const DEV_KEY_ENV: &str = "ADS_DEV_KEY";
/// Environment variable overriding the search endpoint.
pub const BASE_URL_ENV: &str = "ADS_API_URL";

/// Everything a `SearchClient` needs to talk to the upstream service.
/// Built once at startup and handed in explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    /// May be empty, which means unauthenticated (and likely rate limited) access.
    pub dev_key: String,
    /// Page size, must be positive.
    pub rows: u32,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Delay before the first retry; grows linearly with each attempt.
    pub retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            dev_key: String::new(),
            rows: DEFAULT_ROWS,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl Config {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_dev_key(mut self, key: impl Into<String>) -> Self {
        self.dev_key = key.into();
        self
    }

    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(Error::Config("page size (rows) must be positive".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base url is empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.rows, 100);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.dev_key.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_rows_is_rejected() {
        let config = Config::default().with_rows(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn builders_override_fields() {
        let config = Config::default()
            .with_base_url("http://localhost:1234/search")
            .with_dev_key("secret")
            .with_rows(25)
            .with_retries(0, Duration::ZERO);
        assert_eq!(config.base_url, "http://localhost:1234/search");
        assert_eq!(config.dev_key, "secret");
        assert_eq!(config.rows, 25);
        assert_eq!(config.max_retries, 0);
    }
}
