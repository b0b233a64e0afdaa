//! Wire types for the scheduler API.
//!
//! Outgoing and incoming shapes are deliberately separate structs: the
//! outgoing [`PublicationDate`] locks its timezone to `UTC` at the type
//! level, while the incoming [`SchedulerPublicationDate`] carries
//! whatever the provider recorded — which must never be copied forward
//! into a new create payload.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MetricoolError, MetricoolResult};

/// The only timezone value the provider handles correctly.
///
/// Sending anything else "succeeds" but the post never publishes at
/// the expected time. This is a hard contract, not a default.
pub const SCHEDULER_TIMEZONE: &str = "UTC";

/// Naive timestamp format the provider speaks.
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Payload for creating a scheduler post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    /// Always `false`; publishing is an explicit action elsewhere.
    pub auto_publish: bool,
    pub draft: bool,
    /// Flat list of media URL strings; the richer locally-owned media
    /// objects are stripped to URLs before they reach the wire.
    pub media: Vec<String>,
    pub providers: Vec<ProviderSpec>,
    pub publication_date: PublicationDate,
    pub text: String,
}

impl CreatePostRequest {
    /// Build a create payload for one provider network.
    #[must_use]
    pub fn new(
        network: impl Into<String>,
        text: impl Into<String>,
        media: Vec<String>,
        draft: bool,
        publish_at: DateTime<Utc>,
    ) -> Self {
        Self {
            auto_publish: false,
            draft,
            media,
            providers: vec![ProviderSpec {
                network: network.into(),
            }],
            publication_date: PublicationDate::utc(publish_at),
            text: text.into(),
        }
    }
}

/// Provider entry in a create payload.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSpec {
    pub network: String,
}

/// Outgoing publication date. The timezone is not settable: every
/// payload leaves with the literal `UTC`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationDate {
    date_time: String,
    timezone: &'static str,
}

impl PublicationDate {
    /// Format a UTC instant as the provider's naive timestamp, tagged
    /// with the `UTC` timezone literal.
    #[must_use]
    pub fn utc(at: DateTime<Utc>) -> Self {
        Self {
            date_time: at.format(DATE_TIME_FORMAT).to_string(),
            timezone: SCHEDULER_TIMEZONE,
        }
    }

    /// The formatted naive timestamp.
    #[must_use]
    pub fn date_time(&self) -> &str {
        &self.date_time
    }

    /// The timezone tag; always `UTC`.
    #[must_use]
    pub fn timezone(&self) -> &'static str {
        self.timezone
    }
}

/// A post as reported by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerPost {
    pub id: i64,
    pub uuid: Option<String>,
    pub draft: bool,
    pub text: String,
    pub media: Vec<String>,
    pub providers: Vec<SchedulerProvider>,
    pub publication_date: Option<SchedulerPublicationDate>,
}

impl SchedulerPost {
    /// The first provider's network tag, if any.
    #[must_use]
    pub fn network(&self) -> Option<&str> {
        self.providers.first().map(|p| p.network.as_str())
    }

    /// The first provider's publication status, if reported.
    #[must_use]
    pub fn provider_status(&self) -> Option<&str> {
        self.providers.first().and_then(|p| p.status.as_deref())
    }

    /// Interpret the provider's naive publication timestamp through
    /// the configured offset. `None` when absent or unparseable.
    #[must_use]
    pub fn publication_date_utc(&self, offset: FixedOffset) -> Option<DateTime<Utc>> {
        let raw = self.publication_date.as_ref()?;
        match parse_naive_with_offset(&raw.date_time, offset) {
            Ok(dt) => Some(dt),
            Err(_) => {
                tracing::warn!(
                    post_id = self.id,
                    date_time = %raw.date_time,
                    "Unparseable scheduler publication date"
                );
                None
            }
        }
    }
}

/// Provider entry on a fetched post.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchedulerProvider {
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Publication date on a fetched post. The provider sometimes records
/// a non-UTC timezone here; it is informational only and must not be
/// echoed back in create payloads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerPublicationDate {
    #[serde(default)]
    pub date_time: String,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Raw deserialization target for provider post bodies. Every field is
/// optional or defaulted; [`RawPost::into_post`] is where absence of
/// the id becomes a hard error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPost {
    pub id: Option<i64>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub providers: Vec<SchedulerProvider>,
    #[serde(default)]
    pub publication_date: Option<SchedulerPublicationDate>,
}

impl RawPost {
    pub(crate) fn into_post(self) -> MetricoolResult<SchedulerPost> {
        let id = self.id.ok_or(MetricoolError::MissingPostId)?;
        Ok(SchedulerPost {
            id,
            uuid: self.uuid,
            draft: self.draft,
            text: self.text,
            media: self.media,
            providers: self.providers,
            publication_date: self.publication_date,
        })
    }
}

/// Parse a provider naive timestamp, applying `offset` to produce a
/// UTC instant.
pub fn parse_naive_with_offset(
    raw: &str,
    offset: FixedOffset,
) -> MetricoolResult<DateTime<Utc>> {
    const FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];

    let naive = FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| {
            MetricoolError::malformed(format!("Unparseable publication date {raw:?}"))
        })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            MetricoolError::malformed(format!("Ambiguous publication date {raw:?}"))
        })
}
