//! # Lotline Campaigns API
//!
//! Thin HTTP surface over the scheduling service and reconciliation
//! engine. Controllers here do parameter parsing and error mapping
//! only; every decision about the scheduler lives in
//! `lotline-scheduling`.
//!
//! # Example
//!
//! ```rust,ignore
//! use lotline_api_campaigns::{campaigns_router, CampaignsState};
//!
//! let state = CampaignsState::new(pool, client);
//! let app = axum::Router::new().merge(campaigns_router(state));
//! ```

pub mod error;
pub mod handlers;
pub mod router;

pub use error::{ApiError, ErrorResponse};
pub use router::{campaigns_router, CampaignsState};
