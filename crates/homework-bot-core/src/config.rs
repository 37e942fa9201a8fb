//! Configuration types for the homework review bot.
//!
//! Secrets come from the environment ([`Credentials`]); everything else comes
//! from an optional `homework-bot.json` file ([`Config`]) with defaults for
//! every field.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::poller::DEFAULT_RETRY_INTERVAL;

/// The default config file name.
const CONFIG_FILE_NAME: &str = "homework-bot.json";

/// Environment variable holding the homework API OAuth token.
pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";

/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";

/// Environment variable holding the destination chat id.
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Default homework status endpoint.
fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

/// Default pause between polls, in seconds.
const fn default_retry_interval() -> u64 {
    DEFAULT_RETRY_INTERVAL.as_secs()
}

/// Default HTTP request timeout, in seconds.
const fn default_request_timeout() -> u64 {
    30
}

/// Default Telegram Bot API base URL.
fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Non-secret runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Homework status endpoint polled every iteration.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Pause between polling iterations in seconds.
    #[serde(default = "default_retry_interval")]
    pub retry_interval: u64,

    /// Timeout for each outbound HTTP request in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Base URL of the Telegram Bot API.
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            retry_interval: default_retry_interval(),
            request_timeout: default_request_timeout(),
            telegram_api_url: default_telegram_api_url(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `homework-bot.json`; falls back to defaults when absent.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            BotError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `homework-bot.json` inside `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the default configuration. An existing file must
    /// parse and pass [`Config::validate`].
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(BotError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| BotError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(BotError::config_validation(
                "endpoint must not be empty",
                "Provide the homework status endpoint URL in your homework-bot.json",
            ));
        }

        if self.retry_interval == 0 {
            return Err(BotError::config_validation(
                "retryInterval must be greater than 0",
                "Set retryInterval to at least 1 second in your homework-bot.json",
            ));
        }

        if self.request_timeout == 0 {
            return Err(BotError::config_validation(
                "requestTimeout must be greater than 0",
                "Set requestTimeout to at least 1 second in your homework-bot.json",
            ));
        }

        if self.telegram_api_url.trim().is_empty() {
            return Err(BotError::config_validation(
                "telegramApiUrl must not be empty",
                "Remove telegramApiUrl from your homework-bot.json to use the public Bot API",
            ));
        }

        Ok(())
    }

    /// Pause between polling iterations.
    #[must_use]
    pub const fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval)
    }

    /// Timeout applied to every outbound request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Secrets required before the polling loop may start.
#[derive(Clone)]
pub struct Credentials {
    /// OAuth token for the homework API.
    pub practicum_token: String,
    /// Telegram bot token.
    pub telegram_token: String,
    /// Chat that receives every notification.
    pub chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Credentials {
    /// Reads the three required variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the three required variables through `lookup`.
    ///
    /// Empty or whitespace-only values count as missing. The error names every
    /// missing variable, not just the first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let practicum_token = read(PRACTICUM_TOKEN_VAR);
        let telegram_token = read(TELEGRAM_TOKEN_VAR);
        let chat_id = read(TELEGRAM_CHAT_ID_VAR);

        match (practicum_token, telegram_token, chat_id) {
            (Some(practicum_token), Some(telegram_token), Some(chat_id)) => Ok(Self {
                practicum_token,
                telegram_token,
                chat_id,
            }),
            (practicum_token, telegram_token, chat_id) => {
                let names = [
                    (PRACTICUM_TOKEN_VAR, practicum_token.is_none()),
                    (TELEGRAM_TOKEN_VAR, telegram_token.is_none()),
                    (TELEGRAM_CHAT_ID_VAR, chat_id.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, missing)| missing.then_some(name))
                .collect();
                Err(BotError::MissingCredentials { names })
            }
        }
    }
}
