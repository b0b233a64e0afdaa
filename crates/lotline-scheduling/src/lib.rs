//! # Lotline Scheduling
//!
//! The scheduler lifecycle and reconciliation engine.
//!
//! Two entry points sit on top of the campaign store and the scheduler
//! client:
//!
//! - [`SchedulingService`] - per-post lifecycle operations: create,
//!   update (delete + recreate; the provider's native update endpoint
//!   is not trusted), delete, and the bulk per-platform variants with
//!   non-fatal partial failure
//! - [`ReconciliationEngine`] - a single-pass batch job that brings
//!   every linked proposed post into agreement with the scheduler's
//!   records: status sync, id remapping after provider-side churn, and
//!   orphan marking
//!
//! Both enforce the same invariant: a linked post may only be mutated
//! on the scheduler while its mirrored status is `PENDING`.

pub mod error;
pub mod reconciliation;
pub mod service;

pub use error::{SchedulingError, SchedulingResult};
pub use reconciliation::report::{PostAction, PostActionKind, ReconciliationReport};
pub use reconciliation::ReconciliationEngine;
pub use service::{PlatformOutcome, PostOverrides, SchedulingService};
