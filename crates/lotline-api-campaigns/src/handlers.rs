//! Request handlers for campaign post operations.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use lotline_core::{Platform, StockNumber};
use lotline_db::ProposedPost;
use lotline_scheduling::{
    PlatformOutcome, PostOverrides, ReconciliationReport, SchedulingError,
};

use crate::error::ApiError;
use crate::router::CampaignsState;

fn parse_stock_number(raw: &str) -> Result<StockNumber, ApiError> {
    StockNumber::new(raw)
        .map_err(|e| ApiError(SchedulingError::validation(e.to_string())))
}

fn parse_platform(raw: &str) -> Result<Platform, ApiError> {
    raw.parse()
        .map_err(|e: String| ApiError(SchedulingError::validation(e)))
}

/// `POST /campaigns/{stock_number}/posts` — push every enabled,
/// unlinked proposed post to the scheduler, one outcome per platform.
pub async fn create_all(
    State(state): State<CampaignsState>,
    Path(stock_number): Path<String>,
) -> Result<Json<Vec<PlatformOutcome>>, ApiError> {
    let stock_number = parse_stock_number(&stock_number)?;
    let outcomes = state.scheduling.create_all(&stock_number).await?;
    Ok(Json(outcomes))
}

/// `POST /campaigns/{stock_number}/posts/{platform}` — push one
/// platform's proposed post to the scheduler.
pub async fn create_post(
    State(state): State<CampaignsState>,
    Path((stock_number, platform)): Path<(String, String)>,
) -> Result<Json<ProposedPost>, ApiError> {
    let stock_number = parse_stock_number(&stock_number)?;
    let platform = parse_platform(&platform)?;
    let post = state.scheduling.create_post(&stock_number, platform).await?;
    Ok(Json(post))
}

/// Body for `PUT .../posts/{platform}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostBody {
    #[serde(flatten)]
    pub overrides: PostOverrides,
}

/// `PUT /campaigns/{stock_number}/posts/{platform}` — update the
/// scheduler post by delete + recreate.
pub async fn update_post(
    State(state): State<CampaignsState>,
    Path((stock_number, platform)): Path<(String, String)>,
    Json(body): Json<UpdatePostBody>,
) -> Result<Json<ProposedPost>, ApiError> {
    let stock_number = parse_stock_number(&stock_number)?;
    let platform = parse_platform(&platform)?;
    let post = state
        .scheduling
        .update_post(&stock_number, platform, &body.overrides)
        .await?;
    Ok(Json(post))
}

/// `DELETE /campaigns/{stock_number}/posts/{platform}` — delete the
/// scheduler post and clear the local linkage.
pub async fn delete_post(
    State(state): State<CampaignsState>,
    Path((stock_number, platform)): Path<(String, String)>,
) -> Result<Json<ProposedPost>, ApiError> {
    let stock_number = parse_stock_number(&stock_number)?;
    let platform = parse_platform(&platform)?;
    let post = state.scheduling.delete_post(&stock_number, platform).await?;
    Ok(Json(post))
}

/// Body for bulk platform removal.
#[derive(Debug, Deserialize)]
pub struct RemovePlatformsBody {
    pub platforms: Vec<Platform>,
}

/// `DELETE /campaigns/{stock_number}/posts` — remove platforms from
/// the campaign; scheduler deletion is best-effort per platform.
pub async fn remove_platforms(
    State(state): State<CampaignsState>,
    Path(stock_number): Path<String>,
    Json(body): Json<RemovePlatformsBody>,
) -> Result<Json<Vec<PlatformOutcome>>, ApiError> {
    let stock_number = parse_stock_number(&stock_number)?;
    if body.platforms.is_empty() {
        return Err(ApiError(SchedulingError::validation(
            "platforms list is empty",
        )));
    }
    let outcomes = state
        .scheduling
        .remove_platforms(&stock_number, &body.platforms)
        .await?;
    Ok(Json(outcomes))
}

/// Body for triggering a reconciliation run.
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileBody {
    /// Restrict the pass to one campaign.
    pub stock_number: Option<String>,
}

/// Response wrapper for a reconciliation run.
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    #[serde(flatten)]
    pub report: ReconciliationReport,
}

/// `POST /reconciliation/runs` — run a reconciliation pass and return
/// its report.
pub async fn run_reconciliation(
    State(state): State<CampaignsState>,
    body: Option<Json<ReconcileBody>>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let scope = body
        .stock_number
        .as_deref()
        .map(parse_stock_number)
        .transpose()?;

    let report = state.reconciliation.run(scope.as_ref()).await?;
    Ok(Json(ReconcileResponse { report }))
}
