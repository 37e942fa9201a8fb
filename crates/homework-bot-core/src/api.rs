//! Homework status API client.
//!
//! [`HomeworkSource`] is the seam the poller fetches through;
//! [`PracticumClient`] is the HTTP implementation used in production.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use homework_bot_core::{HomeworkSource, PracticumClient};
//!
//! # async fn example() -> homework_bot_core::Result<()> {
//! let client = PracticumClient::new(
//!     "https://practicum.yandex.ru/api/user_api/homework_statuses/",
//!     "oauth-token",
//!     Duration::from_secs(30),
//! )?;
//! let raw = client.fetch(1_700_000_000).await?;
//! println!("{raw}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::{BotError, Result};

/// Source of raw homework status payloads.
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// Fetches every status change reported since `cursor` (Unix seconds).
    ///
    /// The payload is returned as-is; shape checks belong to
    /// [`check_response`](crate::validate::check_response).
    async fn fetch(&self, cursor: i64) -> Result<Value>;
}

/// Returns `cursor`, or the current Unix time when `cursor` is not positive.
#[must_use]
pub fn effective_cursor(cursor: i64) -> i64 {
    if cursor > 0 {
        cursor
    } else {
        chrono::Utc::now().timestamp()
    }
}

/// HTTP client for the homework status endpoint.
#[derive(Clone)]
pub struct PracticumClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl std::fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl PracticumClient {
    /// Creates a client for `endpoint` authenticating with `token`.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("homework-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BotError::endpoint_unavailable(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    /// The endpoint this client polls.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl HomeworkSource for PracticumClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch(&self, cursor: i64) -> Result<Value> {
        let from_date = effective_cursor(cursor);
        info!(from_date, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header(header::AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                BotError::endpoint_unavailable(format!(
                    "request to {} failed: {}",
                    self.endpoint,
                    e.without_url()
                ))
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BotError::endpoint_unavailable(format!(
                "{} returned {status}, expected 200 OK",
                self.endpoint
            )));
        }

        let body = response.json::<Value>().await.map_err(|e| {
            BotError::malformed(format!("response body is not valid JSON: {}", e.without_url()))
        })?;
        debug!("Homework statuses received");
        Ok(body)
    }
}
