//! Router assembly and shared state.

use axum::routing::post;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

use lotline_metricool::MetricoolClient;
use lotline_scheduling::{ReconciliationEngine, SchedulingService};

use crate::handlers;

/// Shared state for the campaigns API.
#[derive(Clone)]
pub struct CampaignsState {
    pub scheduling: SchedulingService,
    pub reconciliation: Arc<ReconciliationEngine>,
}

impl CampaignsState {
    /// Build the state from a database pool and a scheduler client.
    #[must_use]
    pub fn new(pool: PgPool, client: Arc<MetricoolClient>) -> Self {
        Self {
            scheduling: SchedulingService::new(pool.clone(), client.clone()),
            reconciliation: Arc::new(ReconciliationEngine::new(pool, client)),
        }
    }
}

/// Build the campaigns router.
pub fn campaigns_router(state: CampaignsState) -> Router {
    Router::new()
        .route(
            "/campaigns/{stock_number}/posts",
            post(handlers::create_all).delete(handlers::remove_platforms),
        )
        .route(
            "/campaigns/{stock_number}/posts/{platform}",
            post(handlers::create_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route("/reconciliation/runs", post(handlers::run_reconciliation))
        .with_state(state)
}
