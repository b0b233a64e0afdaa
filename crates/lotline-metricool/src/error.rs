//! Scheduler client error types.
//!
//! Error definitions with transient/permanent classification. Transient
//! errors have already been retried by the client; receiving one means
//! the retry ceiling was exhausted.

use thiserror::Error;

/// Error that can occur talking to the scheduling provider.
#[derive(Debug, Error)]
pub enum MetricoolError {
    /// Rate limited (429) and the retry ceiling was exhausted.
    #[error("scheduler rate limit persisted after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Server-side failure (5xx) persisted past the retry ceiling.
    #[error("scheduler unavailable: {message}")]
    Unavailable { message: String },

    /// Network-level failure (reset, timeout, DNS) past the retry ceiling.
    #[error("scheduler network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Client error (4xx other than 429); never retried. Carries the
    /// provider's raw response body for diagnostics.
    #[error("scheduler rejected the request with HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The requested post does not exist on the scheduler.
    #[error("scheduler post {id} not found")]
    NotFound { id: i64 },

    /// A 2xx response body that could not be parsed as the expected
    /// JSON shape; never retried.
    #[error("malformed scheduler response: {message}")]
    MalformedResponse { message: String },

    /// The provider acknowledged a create without assigning a post id.
    /// The provider is known to return such ambiguous success bodies;
    /// they are failures.
    #[error("scheduler accepted the post but returned no post id")]
    MissingPostId,

    /// Client configuration is unusable.
    #[error("invalid scheduler configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl MetricoolError {
    /// Check if this error came from a transient condition. Transient
    /// errors surface only after internal retry exhaustion, so a retry
    /// at a higher level may still succeed later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MetricoolError::RateLimited { .. }
                | MetricoolError::Unavailable { .. }
                | MetricoolError::Network { .. }
        )
    }

    /// Get an error code for classification and logging.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            MetricoolError::RateLimited { .. } => "RATE_LIMITED",
            MetricoolError::Unavailable { .. } => "UNAVAILABLE",
            MetricoolError::Network { .. } => "NETWORK_ERROR",
            MetricoolError::Api { .. } => "API_ERROR",
            MetricoolError::NotFound { .. } => "NOT_FOUND",
            MetricoolError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            MetricoolError::MissingPostId => "MISSING_POST_ID",
            MetricoolError::InvalidConfiguration { .. } => "INVALID_CONFIG",
        }
    }

    // Convenience constructors

    /// Create a network error without a source.
    pub fn network(message: impl Into<String>) -> Self {
        MetricoolError::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with a source.
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        MetricoolError::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        MetricoolError::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create an invalid-configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        MetricoolError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Result type for scheduler client operations.
pub type MetricoolResult<T> = Result<T, MetricoolError>;
