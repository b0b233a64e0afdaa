//! Scheduler client configuration.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::{MetricoolError, MetricoolResult};

/// Configuration for the scheduler API client.
#[derive(Clone, Serialize, Deserialize)]
pub struct MetricoolConfig {
    /// Base URL of the provider API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Account token, sent as the `userToken` query parameter.
    pub user_token: String,

    /// Account id, sent as the `userId` query parameter.
    pub user_id: String,

    /// Brand/blog id, sent as the `blogId` query parameter.
    pub blog_id: String,

    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Per-request read timeout in seconds.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// Retry behavior for transient failures.
    #[serde(default)]
    pub retry: RetryConfig,

    /// UTC offset applied when interpreting the provider's naive
    /// publication timestamps (e.g. `-05:00`).
    ///
    /// The provider reports local times with no zone marker; this is
    /// its observed convention, kept configurable because it is the
    /// provider's to change, not ours.
    #[serde(default = "default_schedule_offset")]
    pub schedule_offset: String,

    /// Half-width in days of the date window used when listing all
    /// scheduler posts for reconciliation.
    #[serde(default = "default_list_window_days")]
    pub list_window_days: i64,
}

fn default_base_url() -> String {
    "https://app.metricool.com/api".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_read_timeout_secs() -> u64 {
    30
}

fn default_schedule_offset() -> String {
    "-05:00".to_string()
}

fn default_list_window_days() -> i64 {
    365
}

impl MetricoolConfig {
    /// Build a config from credentials, with defaults for everything else.
    #[must_use]
    pub fn new(
        user_token: impl Into<String>,
        user_id: impl Into<String>,
        blog_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: default_base_url(),
            user_token: user_token.into(),
            user_id: user_id.into(),
            blog_id: blog_id.into(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            retry: RetryConfig::default(),
            schedule_offset: default_schedule_offset(),
            list_window_days: default_list_window_days(),
        }
    }

    /// Override the base URL (tests point this at a mock server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Override the schedule offset.
    #[must_use]
    pub fn with_schedule_offset(mut self, offset: impl Into<String>) -> Self {
        self.schedule_offset = offset.into();
        self
    }

    /// Load configuration from `METRICOOL_*` environment variables.
    ///
    /// `METRICOOL_USER_TOKEN`, `METRICOOL_USER_ID` and
    /// `METRICOOL_BLOG_ID` are required; `METRICOOL_BASE_URL` and
    /// `METRICOOL_SCHEDULE_OFFSET` override their defaults.
    pub fn from_env() -> MetricoolResult<Self> {
        let require = |name: &str| {
            env::var(name).map_err(|_| {
                MetricoolError::invalid_configuration(format!(
                    "Missing required environment variable {name}"
                ))
            })
        };

        let mut config = Self::new(
            require("METRICOOL_USER_TOKEN")?,
            require("METRICOOL_USER_ID")?,
            require("METRICOOL_BLOG_ID")?,
        );
        if let Ok(base_url) = env::var("METRICOOL_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(offset) = env::var("METRICOOL_SCHEDULE_OFFSET") {
            config.schedule_offset = offset;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, failing fast on unusable values.
    pub fn validate(&self) -> MetricoolResult<()> {
        if self.base_url.is_empty() {
            return Err(MetricoolError::invalid_configuration("base_url is empty"));
        }
        if self.user_token.is_empty() || self.user_id.is_empty() || self.blog_id.is_empty() {
            return Err(MetricoolError::invalid_configuration(
                "user_token, user_id and blog_id are all required",
            ));
        }
        self.offset()?;
        Ok(())
    }

    /// Parse the configured schedule offset.
    pub fn offset(&self) -> MetricoolResult<FixedOffset> {
        // FixedOffset has no FromStr for bare "+HH:MM"; parse via a
        // full RFC 3339 timestamp carrying the offset.
        let probe = format!("2000-01-01T00:00:00{}", self.schedule_offset);
        chrono::DateTime::parse_from_rfc3339(&probe)
            .map(|dt| *dt.offset())
            .map_err(|_| {
                MetricoolError::invalid_configuration(format!(
                    "schedule_offset {:?} is not a valid UTC offset",
                    self.schedule_offset
                ))
            })
    }
}

// The token is a credential; keep it out of Debug output.
impl std::fmt::Debug for MetricoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricoolConfig")
            .field("base_url", &self.base_url)
            .field("user_token", &"***")
            .field("user_id", &self.user_id)
            .field("blog_id", &self.blog_id)
            .field("schedule_offset", &self.schedule_offset)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial call.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Cap on the exponential delay in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// A fast policy for tests.
    #[must_use]
    pub fn fast(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay_ms: 1,
            max_delay_ms: 10,
        }
    }

    /// Whether a response status should be retried: rate limiting and
    /// server-side failures are transient, everything else is not.
    #[must_use]
    pub fn is_retryable_status(&self, status: u16) -> bool {
        status == 429 || (500..600).contains(&status)
    }

    /// Backoff for a retry, 0-indexed: `base * 2^retry`, capped, plus
    /// a uniformly random additive jitter of up to a quarter of the
    /// base delay. The jitter only ever adds, so a delay can never
    /// collapse to zero.
    #[must_use]
    pub fn calculate_backoff(&self, retry: u32) -> Duration {
        let exponential = (self.base_delay_ms as f64) * 2f64.powi(retry as i32);
        let capped = exponential.min(self.max_delay_ms as f64);
        let jitter = rand_simple() * (self.base_delay_ms as f64) * 0.25;
        Duration::from_millis((capped + jitter) as u64)
    }
}

/// Simple pseudo-random number generator for jitter.
/// Returns a value between 0.0 and 1.0; not cryptographically secure.
fn rand_simple() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (f64::from(nanos) / f64::from(u32::MAX)).fract()
}
