//! Best-effort chat delivery.
//!
//! [`Notifier::notify`] never fails: delivery errors are logged and dropped so
//! a broken chat transport cannot stop the polling loop.

use async_trait::async_trait;
use homework_bot_telegram::{TelegramBot, TelegramError};
use tracing::{error, info};

/// Anything that can deliver a plain-text message to a chat.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Transport-specific delivery error.
    type Error: std::fmt::Display + Send;

    /// Delivers `text` to `chat_id`.
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), Self::Error>;
}

#[async_trait]
impl ChatTransport for TelegramBot {
    type Error = TelegramError;

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), Self::Error> {
        TelegramBot::send_message(self, chat_id, text).await
    }
}

/// A transport bound to the single destination chat.
#[derive(Debug, Clone)]
pub struct Notifier<T> {
    transport: T,
    chat_id: String,
}

impl<T: ChatTransport> Notifier<T> {
    /// Creates a notifier delivering to `chat_id` through `transport`.
    pub fn new(transport: T, chat_id: impl Into<String>) -> Self {
        Self {
            transport,
            chat_id: chat_id.into(),
        }
    }

    /// The destination chat.
    #[must_use]
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Sends `text`, logging the outcome.
    ///
    /// Returns whether the message was delivered. Failures are never
    /// propagated.
    pub async fn notify(&self, text: &str) -> bool {
        info!(chat_id = %self.chat_id, "Sending message to chat");
        match self.transport.send_message(&self.chat_id, text).await {
            Ok(()) => {
                info!(chat_id = %self.chat_id, "Message delivered");
                true
            }
            Err(e) => {
                error!(chat_id = %self.chat_id, error = %e, "Failed to deliver message");
                false
            }
        }
    }
}
