//! HTTP client for the scheduling provider.

use chrono::{Duration as ChronoDuration, FixedOffset, Utc};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::MetricoolConfig;
use crate::error::{MetricoolError, MetricoolResult};
use crate::types::{CreatePostRequest, RawPost, SchedulerPost};

const POSTS_PATH: &str = "/v2/scheduler/posts";

/// Authenticated client for the scheduler API.
///
/// Owns the retry policy: every call is retried on 429/5xx/network
/// errors with exponential backoff, and other 4xx responses surface
/// immediately with the provider's raw payload.
pub struct MetricoolClient {
    config: MetricoolConfig,
    offset: FixedOffset,
    http: Client,
}

impl std::fmt::Debug for MetricoolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricoolClient")
            .field("config", &self.config)
            .finish()
    }
}

impl MetricoolClient {
    /// Create a client from a validated configuration.
    pub fn new(config: MetricoolConfig) -> MetricoolResult<Self> {
        config.validate()?;
        let offset = config.offset()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| {
                MetricoolError::invalid_configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            config,
            offset,
            http,
        })
    }

    /// The configured offset for interpreting provider timestamps.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &MetricoolConfig {
        &self.config
    }

    /// Create a post on the scheduler.
    ///
    /// A 2xx response without an assigned post id is
    /// [`MetricoolError::MissingPostId`]; the provider's ambiguous
    /// success bodies are treated as failures.
    pub async fn create_post(&self, request: &CreatePostRequest) -> MetricoolResult<SchedulerPost> {
        let body = serde_json::to_value(request)
            .map_err(|e| MetricoolError::malformed(format!("Unserializable payload: {e}")))?;

        let response = self
            .send_with_retry(Method::POST, &self.url(POSTS_PATH), Some(&body), &[])
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        let raw: RawPost = Self::read_json(response).await?;
        let post = raw.into_post()?;
        info!(
            post_id = post.id,
            network = post.network().unwrap_or("?"),
            draft = post.draft,
            "Created scheduler post"
        );
        Ok(post)
    }

    /// Fetch a single post by id. Returns
    /// [`MetricoolError::NotFound`] on 404.
    pub async fn get_post(&self, id: i64) -> MetricoolResult<SchedulerPost> {
        let url = self.url(&format!("{POSTS_PATH}/{id}"));
        let response = self
            .send_with_retry(Method::GET, &url, None, &[])
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MetricoolError::NotFound { id });
        }
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        let raw: RawPost = Self::read_json(response).await?;
        raw.into_post()
    }

    /// Delete a post by id. A 404 means the post is already gone and
    /// is treated as success.
    pub async fn delete_post(&self, id: i64) -> MetricoolResult<()> {
        let url = self.url(&format!("{POSTS_PATH}/{id}"));
        let response = self
            .send_with_retry(Method::DELETE, &url, None, &[])
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(post_id = id, "Scheduler post already absent on delete");
            return Ok(());
        }
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        info!(post_id = id, "Deleted scheduler post");
        Ok(())
    }

    /// Fetch all current posts within the configured date window.
    ///
    /// Entries the provider returns without an id cannot be indexed
    /// and are skipped with a warning.
    pub async fn list_posts(&self) -> MetricoolResult<Vec<SchedulerPost>> {
        let now = Utc::now();
        let window = ChronoDuration::days(self.config.list_window_days);
        let start = (now - window).format("%Y-%m-%dT00:00:00").to_string();
        let end = (now + window).format("%Y-%m-%dT23:59:59").to_string();

        let response = self
            .send_with_retry(
                Method::GET,
                &self.url(POSTS_PATH),
                None,
                &[("start", start), ("end", end)],
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        let raw: Vec<RawPost> = Self::read_json(response).await?;
        let mut posts = Vec::with_capacity(raw.len());
        for entry in raw {
            match entry.into_post() {
                Ok(post) => posts.push(post),
                Err(_) => warn!("Skipping scheduler post listed without an id"),
            }
        }

        debug!(count = posts.len(), "Listed scheduler posts");
        Ok(posts)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Send a request with auth query parameters and the retry policy.
    ///
    /// Returns the response for any status outside the retryable set;
    /// callers classify non-2xx statuses per endpoint (404 semantics
    /// differ between fetch and delete).
    async fn send_with_retry(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        extra_query: &[(&str, String)],
    ) -> MetricoolResult<Response> {
        let retry = &self.config.retry;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let mut request = self
                .http
                .request(method.clone(), url)
                .query(&[
                    ("userToken", self.config.user_token.as_str()),
                    ("userId", self.config.user_id.as_str()),
                    ("blogId", self.config.blog_id.as_str()),
                ])
                .query(extra_query);
            if let Some(json_body) = body {
                request = request.json(json_body);
            }

            debug!(url = %url, method = %method, attempt, "Sending scheduler request");

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if retry.is_retryable_status(status.as_u16()) {
                        if attempt <= retry.max_retries {
                            let backoff = retry.calculate_backoff(attempt - 1);
                            warn!(
                                url = %url,
                                status = %status,
                                attempt,
                                wait_ms = backoff.as_millis() as u64,
                                "Transient scheduler response, retrying with backoff"
                            );
                            tokio::time::sleep(backoff).await;
                            continue;
                        }

                        let body_text = response.text().await.unwrap_or_default();
                        return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                            MetricoolError::RateLimited { attempts: attempt }
                        } else {
                            MetricoolError::Unavailable {
                                message: format!("HTTP {status} after {attempt} attempts: {body_text}"),
                            }
                        });
                    }

                    return Ok(response);
                }
                Err(e) => {
                    if attempt <= retry.max_retries {
                        let backoff = retry.calculate_backoff(attempt - 1);
                        warn!(
                            url = %url,
                            error = %e,
                            attempt,
                            wait_ms = backoff.as_millis() as u64,
                            "Scheduler request failed, retrying with backoff"
                        );
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    let verb = if e.is_timeout() { "timed out" } else { "failed" };
                    return Err(MetricoolError::network_with_source(
                        format!("Request {verb} after {attempt} attempts: {url}"),
                        e,
                    ));
                }
            }
        }
    }

    /// Turn a non-2xx response into a client error carrying the
    /// provider's raw payload.
    async fn api_error(response: Response) -> MetricoolError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        MetricoolError::Api { status, body }
    }

    /// Parse a 2xx response body as JSON, without retrying on failure.
    async fn read_json<T: DeserializeOwned>(response: Response) -> MetricoolResult<T> {
        let text = response
            .text()
            .await
            .map_err(|e| MetricoolError::network_with_source("Failed reading response body", e))?;

        serde_json::from_str(&text).map_err(|e| {
            let snippet: String = text.chars().take(200).collect();
            MetricoolError::malformed(format!("{e} (body: {snippet:?})"))
        })
    }
}
