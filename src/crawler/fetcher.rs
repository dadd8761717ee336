//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent
//! - Randomized politeness delays before every request
//! - Two-level retry: fast inner retries on bad status codes, outer
//!   reconnect cycles with a cooldown on network errors
//! - Error classification into tagged attempt outcomes

use crate::config::Config;
use crate::{CatalogError, ConfigResult, Result};
use rand::Rng;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Source of catalog documents
///
/// The crawl components only need to turn a URL into page text. `Fetcher` is
/// the HTTP implementation; anything else (fixtures, caches) can stand in.
pub trait DocumentSource {
    /// Returns the text of the document at `url`
    ///
    /// Fails only with `CatalogError::ConnectionFailure` once the source has
    /// given up on the URL.
    fn get_document(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Result of a single request attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Successful response with its body
    Success(String),

    /// The server answered with a non-success status; retry right away
    Retryable {
        /// The HTTP status code
        status_code: u16,
    },

    /// Connection error or timeout; give up this cycle and reconnect later
    Reconnect {
        /// Error description
        error: String,
    },
}

/// Retry and politeness settings of a fetcher
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Outer reconnect cycles
    pub restart_count: u32,

    /// Requests per reconnect cycle
    pub max_retries: u32,

    /// Cooldown between reconnect cycles
    pub restart_interval: Duration,

    /// Bounds of the random delay before each request
    pub delay_range: (Duration, Duration),
}

impl RetryPolicy {
    /// Reads the policy from the configuration
    ///
    /// Fails when a delay setting cannot be represented as a `Duration`,
    /// which only happens for a config that skipped validation.
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        Ok(Self {
            restart_count: config.restart.restart_count,
            max_retries: config.max_retries,
            restart_interval: config.restart_interval()?,
            delay_range: config.delay_bounds()?,
        })
    }

    /// Upper bound on requests issued for one URL
    pub fn max_attempts(&self) -> u32 {
        self.restart_count.saturating_mul(self.max_retries)
    }

    /// Draws the politeness delay for the next request
    pub fn politeness_delay(&self) -> Duration {
        let (min, max) = self.delay_range;
        if max <= min {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP document source with politeness delays and bounded retries
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher from the crawler configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = build_http_client(&config.user_agent)?;
        let policy = RetryPolicy::from_config(config)?;
        Ok(Self::with_client(client, policy))
    }

    pub fn with_client(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Issues one GET request and classifies the result
    async fn attempt(&self, url: &str) -> AttemptOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    format!("Connection failed: {}", e)
                } else {
                    e.to_string()
                };
                return AttemptOutcome::Reconnect { error };
            }
        };

        let status = response.status();
        if !status.is_success() {
            return AttemptOutcome::Retryable {
                status_code: status.as_u16(),
            };
        }

        match response.text().await {
            Ok(body) => AttemptOutcome::Success(body),
            Err(e) => AttemptOutcome::Reconnect {
                error: format!("Failed to read body: {}", e),
            },
        }
    }
}

impl DocumentSource for Fetcher {
    /// Fetches a URL under the retry policy
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return body |
    /// | Other status | Retry immediately, up to `max_retries` per cycle |
    /// | Connection error / timeout | End cycle, wait `restart_interval` |
    /// | All cycles used | `ConnectionFailure` |
    ///
    /// Every request is preceded by a random delay from `delay_range`.
    async fn get_document(&self, url: &str) -> Result<String> {
        let policy = &self.policy;
        let mut attempts = 0;

        for restart in 1..=policy.restart_count {
            for _ in 0..policy.max_retries {
                tokio::time::sleep(policy.politeness_delay()).await;
                attempts += 1;

                match self.attempt(url).await {
                    AttemptOutcome::Success(body) => {
                        tracing::debug!("Fetched {} (attempt {})", url, attempts);
                        return Ok(body);
                    }
                    AttemptOutcome::Retryable { status_code } => {
                        tracing::debug!(
                            "HTTP {} for {} (attempt {}/{})",
                            status_code,
                            url,
                            attempts,
                            policy.max_attempts()
                        );
                    }
                    AttemptOutcome::Reconnect { error } => {
                        tracing::warn!(
                            "{} for {} (cycle {}/{})",
                            error,
                            url,
                            restart,
                            policy.restart_count
                        );
                        break;
                    }
                }
            }

            if restart < policy.restart_count {
                tokio::time::sleep(policy.restart_interval).await;
            }
        }

        tracing::error!(
            "Giving up on {} after {} requests in {} cycles",
            url,
            attempts,
            policy.restart_count
        );

        Err(CatalogError::ConnectionFailure {
            url: url.to_string(),
            restarts: policy.restart_count,
            attempts,
        })
    }
}
