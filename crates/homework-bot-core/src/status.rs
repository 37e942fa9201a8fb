//! Review status codes and their human-readable verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BotError, Result};
use crate::validate::is_truthy;

/// Key holding a homework's display name.
pub const NAME_KEY: &str = "homework_name";

/// Key holding a homework's review status code.
pub const STATUS_KEY: &str = "status";

/// Review status of a homework, as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeworkStatus {
    /// The reviewer accepted the work.
    Approved,
    /// The work is under review.
    Reviewing,
    /// The reviewer returned the work with comments.
    Rejected,
}

impl HomeworkStatus {
    /// Every known status, in display order.
    pub const ALL: [Self; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    /// Wire code used by the API.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable verdict sent to the chat.
    #[must_use]
    pub const fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "The work has been reviewed: the reviewer liked everything. Hooray!",
            Self::Reviewing => "The work has been taken for review by the reviewer.",
            Self::Rejected => "The work has been reviewed: the reviewer has comments.",
        }
    }

    /// Looks up a status by its wire code. Matching is exact.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    /// Comma-separated list of every known code.
    #[must_use]
    pub fn known_codes() -> String {
        Self::ALL
            .iter()
            .map(|status| status.code())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A homework entry after its fields have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeworkRecord {
    /// Display name of the homework.
    pub name: String,
    /// Current review status.
    pub status: HomeworkStatus,
}

impl HomeworkRecord {
    /// Extracts a record from one raw entry of the `homeworks` list.
    ///
    /// `homework_name` and `status` must both be present and non-empty.
    pub fn from_value(record: &Value) -> Result<Self> {
        let field = |key: &str| record.get(key).filter(|v| is_truthy(v));

        let (Some(name), Some(status)) = (field(NAME_KEY), field(STATUS_KEY)) else {
            return Err(BotError::missing_fields(format!(
                "each homework must contain the `{NAME_KEY}` and `{STATUS_KEY}` keys"
            )));
        };

        let name = match name {
            Value::String(name) => name.clone(),
            other => other.to_string(),
        };

        let code = match status {
            Value::String(code) => code.clone(),
            other => other.to_string(),
        };
        let status = HomeworkStatus::from_code(&code)
            .ok_or_else(|| BotError::unexpected_status(code, HomeworkStatus::known_codes()))?;

        Ok(Self { name, status })
    }

    /// Notification text for this record.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Changed review status for \"{}\". {}",
            self.name,
            self.status.verdict()
        )
    }
}

/// Translates one raw homework entry into its notification text.
pub fn parse_status(record: &Value) -> Result<String> {
    HomeworkRecord::from_value(record).map(|record| record.message())
}
