//! API error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use lotline_db::DbError;
use lotline_metricool::MetricoolError;
use lotline_scheduling::SchedulingError;

/// Error response structure for API responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Wrapper mapping scheduling errors onto HTTP responses.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub SchedulingError);

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            SchedulingError::Validation { .. } => StatusCode::BAD_REQUEST,
            SchedulingError::CampaignNotFound { .. } | SchedulingError::PostNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            SchedulingError::PostNotLinked { .. }
            | SchedulingError::InvalidPostStatus { .. } => StatusCode::CONFLICT,
            SchedulingError::Scheduler(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
            SchedulingError::Scheduler(_) => StatusCode::BAD_GATEWAY,
            SchedulingError::Db(DbError::VersionConflict { .. }) => StatusCode::CONFLICT,
            SchedulingError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self.0 {
            // Database internals stay out of responses.
            SchedulingError::Db(DbError::VersionConflict { .. }) => {
                "The campaign was modified concurrently; retry the operation".to_string()
            }
            SchedulingError::Db(e) => {
                tracing::error!("Campaign database error: {e:?}");
                "A database error occurred".to_string()
            }
            // Scheduler detail is preserved for the caller; it is the
            // provider's own diagnostic payload.
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: self.0.error_code().to_string(),
            message,
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<MetricoolError> for ApiError {
    fn from(e: MetricoolError) -> Self {
        ApiError(SchedulingError::Scheduler(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotline_core::Platform;
    use lotline_core::StockNumber;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError(SchedulingError::validation("bad")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError(SchedulingError::CampaignNotFound {
                    stock_number: StockNumber::new("ABC-123").unwrap(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError(SchedulingError::InvalidPostStatus {
                    platform: Platform::Meta,
                    status: "PUBLISHED".to_string(),
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError(SchedulingError::Scheduler(MetricoolError::RateLimited {
                    attempts: 4,
                })),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError(SchedulingError::Scheduler(MetricoolError::Api {
                    status: 422,
                    body: "{}".to_string(),
                })),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected, "{}", err.0.error_code());
        }
    }
}
