//! Homework Review Bot Core
//!
//! Polls the homework status API, validates the payload, translates status
//! codes into chat messages and delivers them.

pub mod api;
pub mod config;
pub mod error;
pub mod notifier;
pub mod poller;
pub mod status;
pub mod validate;

pub use api::{effective_cursor, HomeworkSource, PracticumClient};
pub use config::{
    Config, Credentials, PRACTICUM_TOKEN_VAR, TELEGRAM_CHAT_ID_VAR, TELEGRAM_TOKEN_VAR,
};
pub use error::{BotError, Result};
pub use notifier::{ChatTransport, Notifier};
pub use poller::{
    IterationOutcome, PollState, PollStatus, Poller, DEFAULT_RETRY_INTERVAL, ERROR_PREFIX,
};
pub use status::{parse_status, HomeworkRecord, HomeworkStatus};
pub use validate::{check_response, ValidatedResponse};
