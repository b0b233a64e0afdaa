//! Proposed post subdocuments.
//!
//! One per platform enabled for a campaign, stored inside the
//! campaign's JSONB `proposed_posts` column.

use chrono::{DateTime, Utc};
use lotline_core::{Platform, PostStatus};
use serde::{Deserialize, Serialize};

/// A per-platform draft post owned by a campaign.
///
/// `text`, `media_urls`, `enabled`, `draft`, and `scheduled_date` are
/// locally authored. The four `metricool_*` fields mirror the
/// scheduling provider and exist only while the post is linked; a post
/// with a non-null `metricool_id` is "linked" and subject to
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedPost {
    /// Immutable key within the campaign.
    pub platform: Platform,
    /// Current post body, locally authored.
    #[serde(default)]
    pub text: String,
    /// Ordered media references. Locally owned; reconciliation never
    /// overwrites these.
    #[serde(default)]
    pub media_urls: Vec<String>,
    /// Whether this platform participates in scheduler operations.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Local mirror of the scheduler's draft flag.
    #[serde(default)]
    pub draft: bool,
    /// Locally intended publish time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    /// Scheduler-assigned post id; `None` means "never sent".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metricool_id: Option<i64>,
    /// Publication status mirrored from the scheduler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metricool_status: Option<PostStatus>,
    /// The scheduler's own recorded publish time; may diverge from
    /// `scheduled_date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metricool_scheduled_date: Option<DateTime<Utc>>,
    /// When the post was first created on the scheduler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metricool_created_at: Option<DateTime<Utc>>,
}

fn default_enabled() -> bool {
    true
}

impl ProposedPost {
    /// Create an unlinked proposed post for a platform.
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            text: String::new(),
            media_urls: Vec::new(),
            enabled: true,
            draft: true,
            scheduled_date: None,
            metricool_id: None,
            metricool_status: None,
            metricool_scheduled_date: None,
            metricool_created_at: None,
        }
    }

    /// Whether this post has a scheduler-side counterpart.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.metricool_id.is_some()
    }

    /// Whether delete/update against the scheduler is permitted: the
    /// post must be linked and its mirrored status must be `PENDING`.
    #[must_use]
    pub fn can_modify(&self) -> bool {
        self.is_linked() && self.metricool_status.map_or(false, |s| s.can_modify())
    }

    /// Record a successful scheduler create.
    pub fn link(
        &mut self,
        id: i64,
        status: PostStatus,
        scheduled_date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) {
        self.metricool_id = Some(id);
        self.metricool_status = Some(status);
        self.metricool_scheduled_date = scheduled_date;
        self.metricool_created_at = Some(created_at);
    }

    /// Clear the scheduler linkage after a successful delete.
    ///
    /// Authored fields (`text`, `media_urls`, `draft`,
    /// `scheduled_date`) are preserved so the post can be resubmitted.
    pub fn unlink(&mut self) {
        self.metricool_id = None;
        self.metricool_status = None;
        self.metricool_scheduled_date = None;
        self.metricool_created_at = None;
    }
}
