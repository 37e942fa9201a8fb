//! Error types for the homework review bot.
//!
//! This module defines the error hierarchy for all bot operations,
//! including configuration loading, endpoint access, response validation
//! and status translation.

use std::path::PathBuf;

/// A specialized `Result` type for homework bot operations.
pub type Result<T> = std::result::Result<T, BotError>;

/// Errors that can occur while running the homework review bot.
///
/// Runtime variants are caught at the polling iteration boundary and reported
/// to the chat; configuration variants stop the process before polling starts.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in the settings file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your homework-bot.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    /// One or more required environment variables are absent or empty.
    #[error("Missing required environment variable(s): {}", .names.join(", "))]
    MissingCredentials {
        /// Names of the missing variables, in declaration order.
        names: Vec<&'static str>,
    },

    // ========================================================================
    // Endpoint Errors
    // ========================================================================
    /// The homework API could not be reached or answered with a non-200 status.
    #[error("Endpoint unavailable: {message}")]
    EndpointUnavailable {
        /// What went wrong, including the endpoint and status if known.
        message: String,
    },

    // ========================================================================
    // Response Shape Errors
    // ========================================================================
    /// The response has the wrong JSON type somewhere.
    #[error("Malformed API response: {message}")]
    MalformedResponse {
        /// Description of the shape violation.
        message: String,
    },

    /// A required top-level key is missing from the response.
    #[error("Incorrect API response: {message}")]
    IncorrectApiResponse {
        /// Description of the missing key(s).
        message: String,
    },

    // ========================================================================
    // Homework Record Errors
    // ========================================================================
    /// A homework record lacks `homework_name` or `status`.
    #[error("Missing homework fields: {message}")]
    MissingFields {
        /// Description of the missing field(s).
        message: String,
    },

    /// A homework record carries a status code outside the known set.
    #[error("Unexpected homework status '{status}'. Possible statuses: {expected}")]
    UnexpectedStatus {
        /// The status code received.
        status: String,
        /// Comma-separated list of accepted codes.
        expected: String,
    },
}

impl BotError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `EndpointUnavailable` error.
    #[must_use]
    pub fn endpoint_unavailable(message: impl Into<String>) -> Self {
        Self::EndpointUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new `MalformedResponse` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Creates a new `IncorrectApiResponse` error.
    #[must_use]
    pub fn incorrect_response(message: impl Into<String>) -> Self {
        Self::IncorrectApiResponse {
            message: message.into(),
        }
    }

    /// Creates a new `MissingFields` error.
    #[must_use]
    pub fn missing_fields(message: impl Into<String>) -> Self {
        Self::MissingFields {
            message: message.into(),
        }
    }

    /// Creates a new `UnexpectedStatus` error.
    #[must_use]
    pub fn unexpected_status(status: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status: status.into(),
            expected: expected.into(),
        }
    }

    /// Returns `true` if this error must stop the process before polling.
    ///
    /// Everything else is reported from inside the loop and polling continues.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigParseError { .. }
                | Self::ConfigValidationError { .. }
                | Self::MissingCredentials { .. }
        )
    }
}
