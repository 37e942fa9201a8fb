//! Homework Bot Telegram Client
//!
//! A minimal Telegram Bot API client via reqwest.
//!
//! Only the `sendMessage` method is implemented; the bot never reads updates.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Public Bot API base URL.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Errors that can occur while talking to the Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The HTTP request failed before a usable response arrived.
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered with `"ok": false`.
    #[error("telegram API error {code}: {description}")]
    Api {
        /// HTTP status code of the response.
        code: u16,
        /// Human-readable description returned by the API.
        description: String,
    },

    /// Failed to build the underlying HTTP client.
    #[error("failed to build telegram client: {0}")]
    Build(String),
}

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Destination chat id or `@channelusername`.
    pub chat_id: String,
    /// Plain message text.
    pub text: String,
}

/// Envelope wrapped around every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Error description when `ok` is false.
    #[serde(default)]
    pub description: Option<String>,
    /// Error code reported by the API when `ok` is false.
    #[serde(default)]
    pub error_code: Option<u16>,
}

/// Client bound to a single bot token.
#[derive(Clone)]
pub struct TelegramBot {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl TelegramBot {
    /// Creates a client against the public Bot API.
    pub fn new(token: impl Into<String>) -> Result<Self, TelegramError> {
        Self::with_api_url(token, DEFAULT_API_URL, Duration::from_secs(30))
    }

    /// Creates a client against a custom Bot API base URL.
    ///
    /// Useful for self-hosted Bot API servers and local stubs.
    pub fn with_api_url(
        token: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("homework-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TelegramError::Build(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// URL of the given Bot API method for this bot.
    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_url, self.token)
    }

    /// Sends a plain-text message to `chat_id`.
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TelegramError> {
        let request = SendMessageRequest {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await
            // Errors from reqwest carry the URL, which embeds the token.
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !body.ok {
            return Err(TelegramError::Api {
                code: body.error_code.unwrap_or_else(|| status.as_u16()),
                description: body
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        debug!(%status, "Message accepted by Bot API");
        Ok(())
    }
}
