use std::{future::Future, time::Duration};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ScrapeConfig;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("Malformed JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ScraperError {
    /// Timeouts, dropped connections, 5xx and 429 are worth another try; everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            ScraperError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ScraperError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ScraperError::Json { .. } => false,
        }
    }
}

/// Linear backoff: the wait after failed attempt `n` is `n * base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl From<&ScrapeConfig> for RetryPolicy {
    fn from(config: &ScrapeConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: config.backoff_base,
        }
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the policy runs out of attempts.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, ScraperError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                let wait = policy.delay_after(attempt);
                log::warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    label,
                    attempt,
                    policy.max_attempts,
                    wait,
                    e
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(e) => {
                log::error!("{} failed after {} attempt(s): {}", label, attempt, e);
                return Err(e);
            }
        }
    }
}

/// HTTP context for one batch: client, retry policy and the pause taken before each request.
#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    retry: RetryPolicy,
    request_delay: Duration,
}

impl WebScraper {
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            retry: RetryPolicy::from(config),
            request_delay: config.request_delay,
        })
    }

    async fn get_once(&self, url: &str) -> Result<String, ScraperError> {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::debug!("HTTP error: {e:?}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }

    pub async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        log::info!("Fetching {}", url);
        retry_with_backoff(&self.retry, url, |_| self.get_once(url)).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ScraperError> {
        let body = self.get_html(url).await?;
        serde_json::from_str(&body).map_err(|source| ScraperError::Json {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    fn server_error() -> ScraperError {
        ScraperError::Status {
            url: "https://example.org".to_string(),
            status: StatusCode::BAD_GATEWAY,
        }
    }

    #[test]
    fn test_linear_delay() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(15),
        };
        assert_eq!(policy.delay_after(1), Duration::from_secs(15));
        assert_eq!(policy.delay_after(3), Duration::from_secs(45));
    }

    #[test]
    fn test_transient_classification() {
        assert!(server_error().is_transient());
        let not_found = ScraperError::Status {
            url: "https://example.org".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert!(!not_found.is_transient());
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&policy(3), "flaky", |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(server_error())
                } else {
                    Ok("body")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "body");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&policy(2), "down", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(server_error()) }
        })
        .await;
        assert!(matches!(result, Err(ScraperError::Status { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&policy(5), "missing", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ScraperError::Status {
                    url: "https://example.org/missing".to_string(),
                    status: StatusCode::NOT_FOUND,
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
