//! Publication status mirrored from the scheduling provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Publication state of a scheduler-linked post.
///
/// Mirrored from the provider's `providers[0].status` field. Only
/// `Pending` posts may be modified or deleted through the scheduler;
/// every other state is terminal from lotline's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PostStatus {
    /// Scheduled but not yet published; the only mutable state.
    Pending,
    /// The provider is in the middle of publishing.
    Publishing,
    /// Published; immutable.
    Published,
    /// Reconciliation lost track of the post, or the provider reported
    /// a publishing failure.
    Error,
}

impl PostStatus {
    /// Whether this state permits delete/update against the scheduler.
    #[must_use]
    pub fn can_modify(&self) -> bool {
        matches!(self, PostStatus::Pending)
    }

    /// Whether this state is terminal (no further scheduler mutation).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.can_modify()
    }

    /// Interpret a provider-reported status string.
    ///
    /// The provider omits the status on some draft posts; an absent or
    /// unrecognized value is read as `Pending`, the provider's own
    /// default for unpublished posts.
    #[must_use]
    pub fn from_provider(status: Option<&str>) -> PostStatus {
        status
            .and_then(|s| s.parse().ok())
            .unwrap_or(PostStatus::Pending)
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Pending => write!(f, "PENDING"),
            PostStatus::Publishing => write!(f, "PUBLISHING"),
            PostStatus::Published => write!(f, "PUBLISHED"),
            PostStatus::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(PostStatus::Pending),
            "PUBLISHING" => Ok(PostStatus::Publishing),
            "PUBLISHED" => Ok(PostStatus::Published),
            "ERROR" => Ok(PostStatus::Error),
            _ => Err(format!("Unknown post status: {s}")),
        }
    }
}
