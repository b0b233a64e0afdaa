//! Reconciliation run reporting.
//!
//! Aggregate counters plus a flat list of per-post action records,
//! enough to audit what a pass changed and why.

use serde::Serialize;
use std::fmt;

use lotline_core::{Platform, StockNumber};

/// What happened to one proposed post during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostActionKind {
    /// Mirror fields refreshed from the post's scheduler counterpart.
    Updated,
    /// Re-linked to a different scheduler post after provider-side churn.
    Remapped,
    /// No counterpart and no remap candidate; marked `ERROR`.
    /// ("Deleted" is this system's label for unrecoverable.)
    Deleted,
    /// The post could not be processed.
    Error,
}

impl fmt::Display for PostActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostActionKind::Updated => write!(f, "updated"),
            PostActionKind::Remapped => write!(f, "remapped"),
            PostActionKind::Deleted => write!(f, "deleted"),
            PostActionKind::Error => write!(f, "error"),
        }
    }
}

/// One per-post action record.
#[derive(Debug, Clone, Serialize)]
pub struct PostAction {
    pub kind: PostActionKind,
    pub stock_number: StockNumber,
    pub platform: Platform,
    /// Scheduler post id before the action, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<i64>,
    /// Scheduler post id after the action, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregate result of one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciliationReport {
    pub campaigns_processed: u32,
    pub posts_updated: u32,
    pub posts_remapped: u32,
    /// Posts marked `ERROR` because no counterpart or remap candidate
    /// existed.
    pub posts_deleted: u32,
    pub errors: u32,
    pub actions: Vec<PostAction>,
}

impl ReconciliationReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a per-post action, bumping the matching counter.
    pub fn record(&mut self, action: PostAction) {
        match action.kind {
            PostActionKind::Updated => self.posts_updated += 1,
            PostActionKind::Remapped => self.posts_remapped += 1,
            PostActionKind::Deleted => self.posts_deleted += 1,
            PostActionKind::Error => self.errors += 1,
        }
        self.actions.push(action);
    }

    /// Record a campaign-level failure.
    pub fn record_campaign_error(&mut self) {
        self.errors += 1;
    }

    /// Whether the pass changed nothing and hit no errors.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.posts_updated == 0
            && self.posts_remapped == 0
            && self.posts_deleted == 0
            && self.errors == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(kind: PostActionKind) -> PostAction {
        PostAction {
            kind,
            stock_number: StockNumber::new("ABC-123").unwrap(),
            platform: Platform::Meta,
            previous_id: Some(42),
            new_id: Some(43),
            detail: None,
        }
    }

    #[test]
    fn test_record_bumps_matching_counter() {
        let mut report = ReconciliationReport::new();
        report.record(action(PostActionKind::Updated));
        report.record(action(PostActionKind::Remapped));
        report.record(action(PostActionKind::Remapped));
        report.record(action(PostActionKind::Deleted));

        assert_eq!(report.posts_updated, 1);
        assert_eq!(report.posts_remapped, 2);
        assert_eq!(report.posts_deleted, 1);
        assert_eq!(report.errors, 0);
        assert_eq!(report.actions.len(), 4);
    }

    #[test]
    fn test_noop_detection() {
        let mut report = ReconciliationReport::new();
        report.campaigns_processed = 5;
        assert!(report.is_noop());

        report.record(action(PostActionKind::Updated));
        assert!(!report.is_noop());
    }
}
