//! Post lifecycle operations against the scheduler.
//!
//! Update is delete + recreate: the provider's native update endpoint
//! is unreliable and is never called. All guards run before the first
//! scheduler call, so a rejected operation makes zero HTTP requests.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, warn};

use lotline_core::{Platform, PostStatus, StockNumber};
use lotline_db::models::campaign;
use lotline_db::{Campaign, ProposedPost};
use lotline_metricool::{CreatePostRequest, MetricoolClient, MetricoolError, SchedulerPost};

use crate::error::{SchedulingError, SchedulingResult};

/// Caller-supplied overrides for update-via-recreate. Unset fields
/// fall back to the previously fetched scheduler post, then to the
/// locally stored proposed post.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostOverrides {
    pub text: Option<String>,
    pub media_urls: Option<Vec<String>>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub draft: Option<bool>,
}

/// Per-platform outcome of a bulk operation. Bulk operations never
/// abort on a single platform's failure; callers surface partial
/// completion from this list.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformOutcome {
    pub platform: Platform,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PlatformOutcome {
    fn ok(platform: Platform) -> Self {
        Self {
            platform,
            success: true,
            detail: None,
        }
    }

    fn ok_with_detail(platform: Platform, detail: impl Into<String>) -> Self {
        Self {
            platform,
            success: true,
            detail: Some(detail.into()),
        }
    }

    fn failed(platform: Platform, detail: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            detail: Some(detail.into()),
        }
    }
}

/// Lifecycle operations for proposed posts.
#[derive(Clone)]
pub struct SchedulingService {
    pool: PgPool,
    client: Arc<MetricoolClient>,
}

impl SchedulingService {
    /// Create a new scheduling service.
    #[must_use]
    pub fn new(pool: PgPool, client: Arc<MetricoolClient>) -> Self {
        Self { pool, client }
    }

    /// Add unlinked proposed posts for any of `platforms` the campaign
    /// does not yet carry.
    pub async fn generate_posts(
        &self,
        stock_number: &StockNumber,
        platforms: &[Platform],
    ) -> SchedulingResult<Campaign> {
        let mut campaign = self.load_campaign(stock_number).await?;

        let mut added = false;
        for &platform in platforms {
            if campaign.post(platform).is_none() {
                campaign.proposed_posts.push(ProposedPost::new(platform));
                added = true;
            }
        }

        if added {
            campaign.version = campaign::update_proposed_posts(
                &self.pool,
                campaign.id,
                campaign.version,
                &campaign.proposed_posts,
            )
            .await?;
            info!(stock_number = %stock_number, "Generated proposed posts");
        }

        Ok(campaign)
    }

    /// Create one platform's post on the scheduler and link it.
    pub async fn create_post(
        &self,
        stock_number: &StockNumber,
        platform: Platform,
    ) -> SchedulingResult<ProposedPost> {
        let mut campaign = self.load_campaign(stock_number).await?;
        let idx = find_post(&campaign, platform, stock_number)?;

        {
            let post = &campaign.proposed_posts[idx];
            if !post.enabled {
                return Err(SchedulingError::validation(format!(
                    "Platform {platform} is disabled for campaign {stock_number}"
                )));
            }
            if let Some(id) = post.metricool_id {
                return Err(SchedulingError::validation(format!(
                    "Platform {platform} is already linked to scheduler post {id}; update it instead"
                )));
            }
        }

        let request = build_create_request(&campaign.proposed_posts[idx])?;
        let created = self.client.create_post(&request).await?;

        let post = &mut campaign.proposed_posts[idx];
        apply_created(post, &created, self.client.offset());
        campaign.version = campaign::update_proposed_posts(
            &self.pool,
            campaign.id,
            campaign.version,
            &campaign.proposed_posts,
        )
        .await?;

        info!(
            stock_number = %stock_number,
            platform = %platform,
            post_id = created.id,
            "Linked proposed post to scheduler"
        );
        Ok(campaign.proposed_posts[idx].clone())
    }

    /// Create every enabled, unlinked proposed post for a campaign.
    ///
    /// Each platform is attempted independently; one platform's
    /// failure does not abort the rest.
    pub async fn create_all(&self, stock_number: &StockNumber) -> SchedulingResult<Vec<PlatformOutcome>> {
        let mut campaign = self.load_campaign(stock_number).await?;
        let offset = self.client.offset();

        let mut outcomes = Vec::new();
        let mut changed = false;

        for post in campaign.proposed_posts.iter_mut().filter(|p| p.enabled) {
            let platform = post.platform;

            if let Some(id) = post.metricool_id {
                outcomes.push(PlatformOutcome::failed(
                    platform,
                    format!("already linked to scheduler post {id}"),
                ));
                continue;
            }

            let result = match build_create_request(post) {
                Ok(request) => self
                    .client
                    .create_post(&request)
                    .await
                    .map_err(SchedulingError::from),
                Err(e) => Err(e),
            };

            match result {
                Ok(created) => {
                    apply_created(post, &created, offset);
                    changed = true;
                    outcomes.push(PlatformOutcome::ok(platform));
                }
                Err(e) => {
                    warn!(
                        stock_number = %stock_number,
                        platform = %platform,
                        error = %e,
                        "Bulk create failed for platform"
                    );
                    outcomes.push(PlatformOutcome::failed(platform, e.to_string()));
                }
            }
        }

        if changed {
            campaign::update_proposed_posts(
                &self.pool,
                campaign.id,
                campaign.version,
                &campaign.proposed_posts,
            )
            .await?;
        }

        Ok(outcomes)
    }

    /// Update a linked post by delete + recreate.
    ///
    /// Permitted only while the mirrored status is `PENDING`. The new
    /// payload layers `overrides` over the freshly fetched post over
    /// the local fields, and always leaves with a `UTC` publication
    /// timezone regardless of what the fetched post reported.
    pub async fn update_post(
        &self,
        stock_number: &StockNumber,
        platform: Platform,
        overrides: &PostOverrides,
    ) -> SchedulingResult<ProposedPost> {
        let mut campaign = self.load_campaign(stock_number).await?;
        let idx = find_post(&campaign, platform, stock_number)?;
        let post_id = ensure_modifiable(&campaign.proposed_posts[idx])?;

        // A 404 here is not fatal: the post is already gone and only a
        // fresh create is needed.
        let existing = match self.client.get_post(post_id).await {
            Ok(post) => Some(post),
            Err(MetricoolError::NotFound { .. }) => {
                debug!(
                    post_id,
                    stock_number = %stock_number,
                    "Scheduler post already gone; recreating"
                );
                None
            }
            Err(e) => return Err(e.into()),
        };

        if existing.is_some() {
            self.client.delete_post(post_id).await?;
        }

        let offset = self.client.offset();
        let request = build_update_request(
            &campaign.proposed_posts[idx],
            existing.as_ref(),
            overrides,
            offset,
        )?;
        let created = self.client.create_post(&request).await?;

        let post = &mut campaign.proposed_posts[idx];
        // The old id is invalid from here on; adopt the new identity
        // and refresh the mirrored content fields from the response.
        apply_created(post, &created, offset);
        post.text = created.text.clone();
        post.media_urls = created.media.clone();

        campaign.version = campaign::update_proposed_posts(
            &self.pool,
            campaign.id,
            campaign.version,
            &campaign.proposed_posts,
        )
        .await?;

        info!(
            stock_number = %stock_number,
            platform = %platform,
            old_post_id = post_id,
            new_post_id = created.id,
            "Recreated scheduler post"
        );
        Ok(campaign.proposed_posts[idx].clone())
    }

    /// Delete a linked post from the scheduler and clear its linkage.
    ///
    /// Permitted only while the mirrored status is `PENDING`. A post
    /// already absent on the scheduler deletes successfully; any other
    /// scheduler error leaves the local record untouched so the
    /// operation can be retried.
    pub async fn delete_post(
        &self,
        stock_number: &StockNumber,
        platform: Platform,
    ) -> SchedulingResult<ProposedPost> {
        let mut campaign = self.load_campaign(stock_number).await?;
        let idx = find_post(&campaign, platform, stock_number)?;
        let post_id = ensure_modifiable(&campaign.proposed_posts[idx])?;

        self.client.delete_post(post_id).await?;

        let post = &mut campaign.proposed_posts[idx];
        post.unlink();
        campaign.version = campaign::update_proposed_posts(
            &self.pool,
            campaign.id,
            campaign.version,
            &campaign.proposed_posts,
        )
        .await?;

        info!(
            stock_number = %stock_number,
            platform = %platform,
            post_id,
            "Unlinked proposed post"
        );
        Ok(campaign.proposed_posts[idx].clone())
    }

    /// Remove platforms from a campaign's proposed-posts array.
    ///
    /// Scheduler deletion is attempted for each removable linked post,
    /// but a scheduler-side failure does not block the local removal —
    /// non-fatal partial failure is the policy for multi-platform
    /// removal, unlike [`Self::delete_post`] which surfaces the error.
    pub async fn remove_platforms(
        &self,
        stock_number: &StockNumber,
        platforms: &[Platform],
    ) -> SchedulingResult<Vec<PlatformOutcome>> {
        let mut campaign = self.load_campaign(stock_number).await?;

        let mut outcomes = Vec::new();
        let mut removed = false;

        for &platform in platforms {
            let Some(idx) = campaign
                .proposed_posts
                .iter()
                .position(|p| p.platform == platform)
            else {
                outcomes.push(PlatformOutcome::failed(
                    platform,
                    "no proposed post for platform",
                ));
                continue;
            };

            let post = &campaign.proposed_posts[idx];
            let mut detail = None;

            if post.can_modify() {
                let post_id = post.metricool_id.unwrap_or_default();
                if let Err(e) = self.client.delete_post(post_id).await {
                    warn!(
                        stock_number = %stock_number,
                        platform = %platform,
                        post_id,
                        error = %e,
                        "Scheduler delete failed during platform removal; removing locally anyway"
                    );
                    detail = Some(format!("scheduler delete failed: {e}"));
                }
            } else if let Some(id) = post.metricool_id {
                // Terminal posts stay on the scheduler; only the local
                // entry goes away.
                detail = Some(format!(
                    "scheduler post {id} left in place (status {})",
                    post.metricool_status
                        .map_or_else(|| "UNKNOWN".to_string(), |s| s.to_string())
                ));
            }

            campaign.proposed_posts.remove(idx);
            removed = true;
            outcomes.push(match detail {
                Some(d) => PlatformOutcome::ok_with_detail(platform, d),
                None => PlatformOutcome::ok(platform),
            });
        }

        if removed {
            campaign::update_proposed_posts(
                &self.pool,
                campaign.id,
                campaign.version,
                &campaign.proposed_posts,
            )
            .await?;
        }

        Ok(outcomes)
    }

    async fn load_campaign(&self, stock_number: &StockNumber) -> SchedulingResult<Campaign> {
        campaign::find_by_stock_number(&self.pool, stock_number)
            .await?
            .ok_or_else(|| SchedulingError::CampaignNotFound {
                stock_number: stock_number.clone(),
            })
    }
}

fn find_post(
    campaign: &Campaign,
    platform: Platform,
    stock_number: &StockNumber,
) -> SchedulingResult<usize> {
    campaign
        .proposed_posts
        .iter()
        .position(|p| p.platform == platform)
        .ok_or_else(|| SchedulingError::PostNotFound {
            stock_number: stock_number.clone(),
            platform,
        })
}

/// Guard for update/delete: the post must be linked and `PENDING`.
/// Runs before any scheduler call.
fn ensure_modifiable(post: &ProposedPost) -> SchedulingResult<i64> {
    let id = post
        .metricool_id
        .ok_or(SchedulingError::PostNotLinked {
            platform: post.platform,
        })?;

    match post.metricool_status {
        Some(status) if status.can_modify() => Ok(id),
        status => Err(SchedulingError::InvalidPostStatus {
            platform: post.platform,
            status: status.map_or_else(|| "UNKNOWN".to_string(), |s| s.to_string()),
        }),
    }
}

/// Build a create payload from a proposed post's own fields.
fn build_create_request(post: &ProposedPost) -> SchedulingResult<CreatePostRequest> {
    let scheduled = post.scheduled_date.ok_or_else(|| {
        SchedulingError::validation(format!(
            "Platform {} has no scheduled date",
            post.platform
        ))
    })?;
    if post.text.trim().is_empty() {
        return Err(SchedulingError::validation(format!(
            "Platform {} has no post text",
            post.platform
        )));
    }

    Ok(CreatePostRequest::new(
        post.platform.network(),
        post.text.clone(),
        post.media_urls.clone(),
        post.draft,
        scheduled,
    ))
}

/// Build the recreate payload for an update: caller overrides, then
/// the fetched post, then the local fields. The publication timezone
/// is forced to `UTC` by construction — a fetched post may carry a
/// non-UTC timezone recorded by the provider itself, and copying it
/// forward reproduces the provider's silent scheduling failure.
fn build_update_request(
    local: &ProposedPost,
    existing: Option<&SchedulerPost>,
    overrides: &PostOverrides,
    offset: FixedOffset,
) -> SchedulingResult<CreatePostRequest> {
    let text = overrides
        .text
        .clone()
        .or_else(|| existing.map(|p| p.text.clone()))
        .unwrap_or_else(|| local.text.clone());
    let media = overrides
        .media_urls
        .clone()
        .or_else(|| existing.map(|p| p.media.clone()))
        .unwrap_or_else(|| local.media_urls.clone());
    let draft = overrides
        .draft
        .or_else(|| existing.map(|p| p.draft))
        .unwrap_or(local.draft);
    let scheduled = overrides
        .scheduled_date
        .or_else(|| existing.and_then(|p| p.publication_date_utc(offset)))
        .or(local.scheduled_date)
        .ok_or_else(|| {
            SchedulingError::validation(format!(
                "Platform {} has no publication date to reschedule with",
                local.platform
            ))
        })?;

    if text.trim().is_empty() {
        return Err(SchedulingError::validation(format!(
            "Platform {} has no post text",
            local.platform
        )));
    }

    Ok(CreatePostRequest::new(
        local.platform.network(),
        text,
        media,
        draft,
        scheduled,
    ))
}

/// Write a create response back into the proposed post's mirror fields.
fn apply_created(post: &mut ProposedPost, created: &SchedulerPost, offset: FixedOffset) {
    post.link(
        created.id,
        PostStatus::from_provider(created.provider_status()),
        created.publication_date_utc(offset),
        Utc::now(),
    );
    post.draft = created.draft;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lotline_metricool::{SchedulerProvider, SchedulerPublicationDate};

    fn minus_five() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn pending_post(platform: Platform) -> ProposedPost {
        let mut post = ProposedPost::new(platform);
        post.text = "New arrival! ABC-123".to_string();
        post.media_urls = vec!["https://cdn.example.com/1.jpg".to_string()];
        post.scheduled_date = Some(Utc.with_ymd_and_hms(2026, 3, 15, 14, 30, 0).unwrap());
        post.link(42, PostStatus::Pending, post.scheduled_date, Utc::now());
        post
    }

    fn fetched_post() -> SchedulerPost {
        SchedulerPost {
            id: 42,
            uuid: Some("ab-cd".to_string()),
            draft: false,
            text: "Edited on the scheduler ABC-123".to_string(),
            media: vec!["https://cdn.example.com/2.jpg".to_string()],
            providers: vec![SchedulerProvider {
                network: "facebook".to_string(),
                status: Some("PENDING".to_string()),
            }],
            // The provider recorded its own, non-UTC timezone here.
            publication_date: Some(SchedulerPublicationDate {
                date_time: "2026-03-20T10:00:00".to_string(),
                timezone: Some("America/Chicago".to_string()),
            }),
        }
    }

    #[test]
    fn test_ensure_modifiable_rejects_unlinked() {
        let post = ProposedPost::new(Platform::Meta);
        assert!(matches!(
            ensure_modifiable(&post),
            Err(SchedulingError::PostNotLinked { .. })
        ));
    }

    #[test]
    fn test_ensure_modifiable_rejects_terminal_statuses() {
        for status in [
            PostStatus::Published,
            PostStatus::Publishing,
            PostStatus::Error,
        ] {
            let mut post = pending_post(Platform::Meta);
            post.metricool_status = Some(status);
            let err = ensure_modifiable(&post).unwrap_err();
            assert!(
                matches!(err, SchedulingError::InvalidPostStatus { .. }),
                "status {status} should be rejected"
            );
        }
    }

    #[test]
    fn test_ensure_modifiable_allows_pending() {
        let post = pending_post(Platform::Meta);
        assert_eq!(ensure_modifiable(&post).unwrap(), 42);
    }

    #[test]
    fn test_build_create_request_requires_schedule_and_text() {
        let mut post = pending_post(Platform::Meta);
        post.scheduled_date = None;
        assert!(matches!(
            build_create_request(&post),
            Err(SchedulingError::Validation { .. })
        ));

        let mut post = pending_post(Platform::Meta);
        post.text = "  ".to_string();
        assert!(matches!(
            build_create_request(&post),
            Err(SchedulingError::Validation { .. })
        ));
    }

    #[test]
    fn test_build_create_request_timezone_is_utc() {
        let request = build_create_request(&pending_post(Platform::Meta)).unwrap();
        assert_eq!(request.publication_date.timezone(), "UTC");
        assert_eq!(request.providers[0].network, "facebook");
        assert!(!request.auto_publish);
    }

    #[test]
    fn test_update_layering_overrides_beat_fetched_beat_local() {
        let local = pending_post(Platform::Meta);
        let fetched = fetched_post();

        // No overrides: fetched fields win over local ones.
        let request =
            build_update_request(&local, Some(&fetched), &PostOverrides::default(), minus_five())
                .unwrap();
        assert_eq!(request.text, "Edited on the scheduler ABC-123");
        assert_eq!(request.media, vec!["https://cdn.example.com/2.jpg"]);
        assert!(!request.draft);
        // 10:00 provider-local at -05:00 is 15:00 UTC.
        assert_eq!(request.publication_date.date_time(), "2026-03-20T15:00:00");

        // Overrides beat fetched.
        let overrides = PostOverrides {
            text: Some("Price drop! ABC-123".to_string()),
            draft: Some(true),
            ..Default::default()
        };
        let request =
            build_update_request(&local, Some(&fetched), &overrides, minus_five()).unwrap();
        assert_eq!(request.text, "Price drop! ABC-123");
        assert!(request.draft);

        // Nothing fetched: local fields are the fallback.
        let request =
            build_update_request(&local, None, &PostOverrides::default(), minus_five()).unwrap();
        assert_eq!(request.text, "New arrival! ABC-123");
        assert_eq!(request.media, vec!["https://cdn.example.com/1.jpg"]);
    }

    #[test]
    fn test_update_never_copies_fetched_timezone() {
        // The fetched post carries "America/Chicago"; the outgoing
        // payload must still be tagged UTC.
        let local = pending_post(Platform::Meta);
        let request = build_update_request(
            &local,
            Some(&fetched_post()),
            &PostOverrides::default(),
            minus_five(),
        )
        .unwrap();
        assert_eq!(request.publication_date.timezone(), "UTC");

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["publicationDate"]["timezone"], "UTC");
    }

    #[test]
    fn test_apply_created_links_and_mirrors() {
        let mut post = ProposedPost::new(Platform::Meta);
        post.text = "New arrival! ABC-123".to_string();

        let created = SchedulerPost {
            id: 77,
            draft: true,
            ..fetched_post()
        };
        apply_created(&mut post, &created, minus_five());

        assert_eq!(post.metricool_id, Some(77));
        assert_eq!(post.metricool_status, Some(PostStatus::Pending));
        assert!(post.draft);
        assert!(post.metricool_scheduled_date.is_some());
        assert!(post.metricool_created_at.is_some());
        // Create does not touch authored text.
        assert_eq!(post.text, "New arrival! ABC-123");
    }
}
