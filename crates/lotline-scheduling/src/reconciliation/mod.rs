//! Scheduler reconciliation engine.
//!
//! A single synchronous pass that brings every linked proposed post,
//! across one or all campaigns, into agreement with the scheduler's
//! own records:
//!
//! - **Status sync**: a post whose scheduler counterpart still exists
//!   takes the counterpart's draft flag, status, and publish time.
//!   Text and media stay locally owned; divergence is logged only.
//! - **Remap**: a post whose counterpart disappeared (most commonly a
//!   delete + recreate performed outside this pass) is re-linked to an
//!   unclaimed scheduler post whose text contains the campaign's stock
//!   number and whose network matches the platform. Claimed entries
//!   leave the pool so no scheduler post is claimed twice.
//! - **Orphan marking**: no counterpart and no candidate marks the
//!   post `ERROR`, keeping the stale id visible rather than silently
//!   dropping it.
//!
//! Campaigns are processed sequentially; the claimed-ids pool is
//! shared mutable state and concurrent claims would race.

pub mod report;

use chrono::FixedOffset;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use lotline_core::{PostStatus, StockNumber};
use lotline_db::models::campaign;
use lotline_db::ProposedPost;
use lotline_metricool::{MetricoolClient, SchedulerPost};

use crate::error::{SchedulingError, SchedulingResult};
use report::{PostAction, PostActionKind, ReconciliationReport};

/// Batch reconciliation of linked proposed posts against the scheduler.
pub struct ReconciliationEngine {
    pool: PgPool,
    client: Arc<MetricoolClient>,
}

impl ReconciliationEngine {
    /// Create a new reconciliation engine.
    #[must_use]
    pub fn new(pool: PgPool, client: Arc<MetricoolClient>) -> Self {
        Self { pool, client }
    }

    /// Run one reconciliation pass.
    ///
    /// With a `scope`, only that campaign is reconciled; otherwise
    /// every campaign holding a linked post is. A failure while
    /// processing one campaign is counted and logged, and the pass
    /// continues; only the initial bulk fetch failing fails the run.
    pub async fn run(
        &self,
        scope: Option<&StockNumber>,
    ) -> SchedulingResult<ReconciliationReport> {
        // Everything below depends on this snapshot; if it cannot be
        // fetched, nothing is reconciled.
        let scheduler_posts = self.client.list_posts().await?;
        let mut unclaimed: BTreeMap<i64, SchedulerPost> = scheduler_posts
            .into_iter()
            .map(|post| (post.id, post))
            .collect();

        let campaigns = match scope {
            Some(stock_number) => {
                let found = campaign::find_by_stock_number(&self.pool, stock_number)
                    .await?
                    .ok_or_else(|| SchedulingError::CampaignNotFound {
                        stock_number: stock_number.clone(),
                    })?;
                vec![found]
            }
            None => campaign::list_linked(&self.pool).await?,
        };

        info!(
            campaigns = campaigns.len(),
            scheduler_posts = unclaimed.len(),
            "Starting reconciliation pass"
        );

        let offset = self.client.offset();
        let mut report = ReconciliationReport::new();

        for mut campaign in campaigns {
            report.campaigns_processed += 1;
            let stock_number = campaign.stock_number.clone();

            let actions = reconcile_posts(
                &mut campaign.proposed_posts,
                &mut unclaimed,
                &stock_number,
                offset,
            );
            if actions.is_empty() {
                continue;
            }

            // Persist only campaigns that actually changed.
            match campaign::update_proposed_posts(
                &self.pool,
                campaign.id,
                campaign.version,
                &campaign.proposed_posts,
            )
            .await
            {
                Ok(_) => {
                    for action in actions {
                        report.record(action);
                    }
                }
                Err(e) => {
                    error!(
                        stock_number = %stock_number,
                        error = %e,
                        "Failed persisting reconciled campaign; continuing with next"
                    );
                    report.record_campaign_error();
                }
            }
        }

        info!(
            campaigns_processed = report.campaigns_processed,
            posts_updated = report.posts_updated,
            posts_remapped = report.posts_remapped,
            posts_deleted = report.posts_deleted,
            errors = report.errors,
            "Reconciliation pass complete"
        );
        Ok(report)
    }
}

/// Reconcile one campaign's posts against the unclaimed scheduler pool.
///
/// Returns the actions taken; an empty list means nothing changed and
/// the campaign does not need persisting.
fn reconcile_posts(
    posts: &mut [ProposedPost],
    unclaimed: &mut BTreeMap<i64, SchedulerPost>,
    stock_number: &StockNumber,
    offset: FixedOffset,
) -> Vec<PostAction> {
    let mut actions = Vec::new();

    for post in posts.iter_mut() {
        // Only linked posts are subject to reconciliation.
        let Some(current_id) = post.metricool_id else {
            continue;
        };

        if let Some(entry) = unclaimed.get(&current_id) {
            // The scheduler entry is the current truth for status,
            // draft flag, and publish time. It stays in the pool:
            // distinct posts reference distinct entries.
            let mut changed = false;

            if post.draft != entry.draft {
                post.draft = entry.draft;
                changed = true;
            }

            let status = PostStatus::from_provider(entry.provider_status());
            if post.metricool_status != Some(status) {
                post.metricool_status = Some(status);
                changed = true;
            }

            if let Some(scheduled) = entry.publication_date_utc(offset) {
                if post.metricool_scheduled_date != Some(scheduled) {
                    post.metricool_scheduled_date = Some(scheduled);
                    changed = true;
                }
            }

            if entry.text != post.text {
                // Text is locally owned; note the divergence, take no
                // corrective action.
                debug!(
                    stock_number = %stock_number,
                    platform = %post.platform,
                    post_id = current_id,
                    "Scheduler text diverges from local copy"
                );
            }

            if changed {
                actions.push(PostAction {
                    kind: PostActionKind::Updated,
                    stock_number: stock_number.clone(),
                    platform: post.platform,
                    previous_id: Some(current_id),
                    new_id: Some(current_id),
                    detail: None,
                });
            }
        } else {
            // The provider deleted or recreated this post. Try to
            // re-match by content: first unclaimed entry whose text
            // contains the stock number and whose network (when
            // tagged) matches the platform, in ascending id order.
            let candidate_id = unclaimed
                .iter()
                .find(|(_, entry)| {
                    stock_number.is_contained_in(&entry.text)
                        && post.platform.matches_network(entry.network())
                })
                .map(|(id, _)| *id);

            match candidate_id.and_then(|id| unclaimed.remove(&id)) {
                Some(entry) => {
                    post.metricool_id = Some(entry.id);
                    post.metricool_status = Some(PostStatus::from_provider(entry.provider_status()));
                    post.draft = entry.draft;
                    if let Some(scheduled) = entry.publication_date_utc(offset) {
                        post.metricool_scheduled_date = Some(scheduled);
                    }
                    post.text = entry.text;
                    // Media is intentionally not copied; it stays
                    // locally owned.

                    actions.push(PostAction {
                        kind: PostActionKind::Remapped,
                        stock_number: stock_number.clone(),
                        platform: post.platform,
                        previous_id: Some(current_id),
                        new_id: Some(entry.id),
                        detail: None,
                    });
                }
                None => {
                    // Unrecoverable. Mark it visibly rather than
                    // silently dropping the linkage, but only once: an
                    // orphan already in ERROR stays untouched so a
                    // repeat pass writes nothing.
                    if post.metricool_status != Some(PostStatus::Error) {
                        post.metricool_status = Some(PostStatus::Error);
                        actions.push(PostAction {
                            kind: PostActionKind::Deleted,
                            stock_number: stock_number.clone(),
                            platform: post.platform,
                            previous_id: Some(current_id),
                            new_id: None,
                            detail: Some(
                                "no scheduler counterpart or remap candidate".to_string(),
                            ),
                        });
                    }
                }
            }
        }
    }

    actions
}
