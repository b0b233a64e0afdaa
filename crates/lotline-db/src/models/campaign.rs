//! Campaign model and store operations.
//!
//! All proposed-post mutation goes through [`update_proposed_posts`],
//! which writes the whole JSONB array back guarded by the campaign's
//! `version` counter.

use chrono::{DateTime, Utc};
use lotline_core::StockNumber;
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::proposed_post::ProposedPost;

/// One campaign per inventory item.
#[derive(Debug, Clone, Serialize)]
pub struct Campaign {
    pub id: Uuid,
    pub stock_number: StockNumber,
    pub title: Option<String>,
    pub proposed_posts: Vec<ProposedPost>,
    /// Optimistic-concurrency counter; bumped on every posts write.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// The proposed post for a platform, if the campaign carries one.
    #[must_use]
    pub fn post(&self, platform: lotline_core::Platform) -> Option<&ProposedPost> {
        self.proposed_posts.iter().find(|p| p.platform == platform)
    }

    /// Whether any proposed post is linked to a scheduler post.
    #[must_use]
    pub fn has_linked_posts(&self) -> bool {
        self.proposed_posts.iter().any(ProposedPost::is_linked)
    }
}

/// Row from database query.
#[derive(Debug, sqlx::FromRow)]
struct CampaignRow {
    id: Uuid,
    stock_number: String,
    title: Option<String>,
    proposed_posts: JsonValue,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CampaignRow {
    fn into_campaign(self) -> DbResult<Campaign> {
        let stock_number = StockNumber::new(self.stock_number)
            .map_err(|e| DbError::InvalidDocument(e.to_string()))?;
        let proposed_posts: Vec<ProposedPost> = serde_json::from_value(self.proposed_posts)
            .map_err(|e| {
                DbError::InvalidDocument(format!(
                    "proposed_posts for campaign {}: {e}",
                    self.id
                ))
            })?;

        Ok(Campaign {
            id: self.id,
            stock_number,
            title: self.title,
            proposed_posts,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const CAMPAIGN_COLUMNS: &str =
    "id, stock_number, title, proposed_posts, version, created_at, updated_at";

/// Create a campaign with an empty proposed-posts array.
pub async fn create(
    pool: &PgPool,
    stock_number: &StockNumber,
    title: Option<&str>,
) -> DbResult<Campaign> {
    let row: CampaignRow = sqlx::query_as(&format!(
        r"
        INSERT INTO campaigns (stock_number, title)
        VALUES ($1, $2)
        RETURNING {CAMPAIGN_COLUMNS}
        ",
    ))
    .bind(stock_number.as_str())
    .bind(title)
    .fetch_one(pool)
    .await
    .map_err(DbError::QueryFailed)?;

    tracing::info!(stock_number = %stock_number, "Created campaign");
    row.into_campaign()
}

/// Fetch a campaign by its stock number.
pub async fn find_by_stock_number(
    pool: &PgPool,
    stock_number: &StockNumber,
) -> DbResult<Option<Campaign>> {
    let row: Option<CampaignRow> = sqlx::query_as(&format!(
        r"
        SELECT {CAMPAIGN_COLUMNS}
        FROM campaigns
        WHERE stock_number = $1
        ",
    ))
    .bind(stock_number.as_str())
    .fetch_optional(pool)
    .await
    .map_err(DbError::QueryFailed)?;

    row.map(CampaignRow::into_campaign).transpose()
}

/// All campaigns holding at least one scheduler-linked proposed post,
/// in stock-number order. This is the reconciliation scope query.
pub async fn list_linked(pool: &PgPool) -> DbResult<Vec<Campaign>> {
    let rows: Vec<CampaignRow> = sqlx::query_as(&format!(
        r"
        SELECT {CAMPAIGN_COLUMNS}
        FROM campaigns
        WHERE jsonb_path_exists(proposed_posts, '$[*] ? (@.metricool_id != null)')
        ORDER BY stock_number
        ",
    ))
    .fetch_all(pool)
    .await
    .map_err(DbError::QueryFailed)?;

    rows.into_iter().map(CampaignRow::into_campaign).collect()
}

/// Write a campaign's proposed-posts array back, guarded by `version`.
///
/// Returns the new version on success.
///
/// # Errors
///
/// Returns `DbError::VersionConflict` if the campaign was modified
/// since the caller read it; re-read and retry in that case.
pub async fn update_proposed_posts(
    pool: &PgPool,
    campaign_id: Uuid,
    expected_version: i64,
    posts: &[ProposedPost],
) -> DbResult<i64> {
    let posts_json =
        serde_json::to_value(posts).map_err(|e| DbError::InvalidDocument(e.to_string()))?;

    let new_version: Option<(i64,)> = sqlx::query_as(
        r"
        UPDATE campaigns
        SET proposed_posts = $3, version = version + 1, updated_at = NOW()
        WHERE id = $1 AND version = $2
        RETURNING version
        ",
    )
    .bind(campaign_id)
    .bind(expected_version)
    .bind(&posts_json)
    .fetch_optional(pool)
    .await
    .map_err(DbError::QueryFailed)?;

    match new_version {
        Some((version,)) => Ok(version),
        None => {
            tracing::warn!(
                campaign_id = %campaign_id,
                expected_version,
                "Campaign write lost optimistic-concurrency race"
            );
            Err(DbError::VersionConflict {
                campaign_id,
                expected_version,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotline_core::{Platform, PostStatus};

    fn campaign_with_posts(posts: Vec<ProposedPost>) -> Campaign {
        Campaign {
            id: Uuid::nil(),
            stock_number: StockNumber::new("ABC-123").unwrap(),
            title: None,
            proposed_posts: posts,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_post_lookup_by_platform() {
        let campaign = campaign_with_posts(vec![
            ProposedPost::new(Platform::Meta),
            ProposedPost::new(Platform::Linkedin),
        ]);
        assert!(campaign.post(Platform::Meta).is_some());
        assert!(campaign.post(Platform::X).is_none());
    }

    #[test]
    fn test_has_linked_posts() {
        let mut meta = ProposedPost::new(Platform::Meta);
        let campaign = campaign_with_posts(vec![meta.clone()]);
        assert!(!campaign.has_linked_posts());

        meta.link(42, PostStatus::Pending, None, Utc::now());
        let campaign = campaign_with_posts(vec![meta]);
        assert!(campaign.has_linked_posts());
    }

    #[test]
    fn test_row_decodes_posts_json() {
        let row = CampaignRow {
            id: Uuid::nil(),
            stock_number: "ABC-123".to_string(),
            title: Some("2021 F-150".to_string()),
            proposed_posts: serde_json::json!([
                {"platform": "meta", "text": "hello", "metricool_id": 42}
            ]),
            version: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let campaign = row.into_campaign().unwrap();
        assert_eq!(campaign.proposed_posts.len(), 1);
        assert_eq!(campaign.proposed_posts[0].metricool_id, Some(42));
        assert_eq!(campaign.version, 3);
    }

    #[test]
    fn test_row_rejects_malformed_posts_json() {
        let row = CampaignRow {
            id: Uuid::nil(),
            stock_number: "ABC-123".to_string(),
            title: None,
            proposed_posts: serde_json::json!([{"text": "no platform key"}]),
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(
            row.into_campaign(),
            Err(DbError::InvalidDocument(_))
        ));
    }
}
