//! # Lotline Metricool Client
//!
//! Authenticated HTTP client for the external post-scheduling provider.
//!
//! The provider is the system of record for publication state once a
//! post exists there. This crate owns the transport concerns:
//!
//! - **Auth**: `userToken` / `userId` / `blogId` attached as query
//!   parameters on every call
//! - **Retry**: `429` and `5xx` responses and network errors retried
//!   with exponential backoff and additive jitter; other `4xx` surfaced
//!   immediately with the provider's raw payload
//! - **Strict parsing**: responses are decoded into explicit structs;
//!   a create response without an assigned post id is a hard error
//!   even on HTTP 2xx, because the provider is known to return
//!   ambiguous success bodies
//! - **Timestamps**: the provider reports naive local timestamps with
//!   no UTC marker; they are interpreted through the configured
//!   [`MetricoolConfig::schedule_offset`]
//!
//! The provider's native update endpoint is unreliable and has no
//! method here; callers update by delete + recreate.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::MetricoolClient;
pub use config::{MetricoolConfig, RetryConfig};
pub use error::{MetricoolError, MetricoolResult};
pub use types::{
    CreatePostRequest, ProviderSpec, PublicationDate, SchedulerPost, SchedulerProvider,
    SchedulerPublicationDate, SCHEDULER_TIMEZONE,
};
