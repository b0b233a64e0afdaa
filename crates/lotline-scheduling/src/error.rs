//! Scheduling error types.

use lotline_core::{Platform, StockNumber};
use lotline_db::DbError;
use lotline_metricool::MetricoolError;
use thiserror::Error;

/// Errors from lifecycle operations and reconciliation.
///
/// Validation and guard rejections happen before any scheduler call is
/// made; scheduler errors pass through with the provider's detail
/// preserved.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// Bad caller input, rejected before any scheduler call.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// No campaign exists for the stock number.
    #[error("Campaign not found for stock number {stock_number}")]
    CampaignNotFound { stock_number: StockNumber },

    /// The campaign has no proposed post for the platform.
    #[error("No proposed post for platform {platform} on campaign {stock_number}")]
    PostNotFound {
        stock_number: StockNumber,
        platform: Platform,
    },

    /// The operation requires a scheduler-linked post.
    #[error("Proposed post for platform {platform} is not linked to a scheduler post")]
    PostNotLinked { platform: Platform },

    /// The post's mirrored status forbids scheduler mutation; only
    /// `PENDING` posts may be updated or deleted.
    #[error("Proposed post for platform {platform} cannot be modified in status {status}")]
    InvalidPostStatus { platform: Platform, status: String },

    /// Scheduler call failed; provider detail preserved.
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] MetricoolError),

    /// Campaign store failure.
    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

impl SchedulingError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        SchedulingError::Validation {
            message: message.into(),
        }
    }

    /// Get an error code for classification and API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            SchedulingError::Validation { .. } => "validation_failed",
            SchedulingError::CampaignNotFound { .. } => "campaign_not_found",
            SchedulingError::PostNotFound { .. } => "post_not_found",
            SchedulingError::PostNotLinked { .. } => "post_not_linked",
            SchedulingError::InvalidPostStatus { .. } => "invalid_post_status",
            SchedulingError::Scheduler(_) => "scheduler_error",
            SchedulingError::Db(_) => "database_error",
        }
    }
}

/// Result type for scheduling operations.
pub type SchedulingResult<T> = Result<T, SchedulingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = SchedulingError::validation("missing scheduled date");
        assert_eq!(err.error_code(), "validation_failed");

        let err = SchedulingError::InvalidPostStatus {
            platform: Platform::Meta,
            status: "PUBLISHED".to_string(),
        };
        assert_eq!(err.error_code(), "invalid_post_status");
        assert!(err.to_string().contains("PUBLISHED"));
    }

    #[test]
    fn test_scheduler_errors_convert() {
        let err: SchedulingError = MetricoolError::MissingPostId.into();
        assert_eq!(err.error_code(), "scheduler_error");
    }
}
