//! Shape checks for the raw homework status payload.

use serde_json::Value;

use crate::error::{BotError, Result};

/// Key holding the list of changed homeworks.
pub const HOMEWORKS_KEY: &str = "homeworks";

/// Key holding the server time used as the next cursor.
pub const CURRENT_DATE_KEY: &str = "current_date";

/// A payload that passed [`check_response`].
///
/// Homework entries are still raw JSON; they are parsed one by one by
/// [`parse_status`](crate::status::parse_status).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedResponse {
    /// Changed homeworks, in the order the API reported them.
    pub homeworks: Vec<Value>,
    /// Lower bound for the next poll.
    pub current_date: i64,
}

/// JSON truthiness: null, false, zero, and empty strings/arrays/objects are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Checks that `response` is an object with a `homeworks` array and a
/// `current_date` cursor.
///
/// A missing or falsy `current_date` and a missing or null `homeworks` are
/// both [`BotError::IncorrectApiResponse`]. An empty `homeworks` array is
/// valid. Wrong JSON types are [`BotError::MalformedResponse`].
pub fn check_response(response: &Value) -> Result<ValidatedResponse> {
    let Some(object) = response.as_object() else {
        return Err(BotError::malformed(format!(
            "expected the API response to be an object, got {}",
            type_name(response)
        )));
    };

    let current_date = object.get(CURRENT_DATE_KEY).filter(|v| is_truthy(v));
    let homeworks = object.get(HOMEWORKS_KEY).filter(|v| !v.is_null());

    let (Some(current_date), Some(homeworks)) = (current_date, homeworks) else {
        return Err(BotError::incorrect_response(format!(
            "the API response must contain the `{HOMEWORKS_KEY}` and `{CURRENT_DATE_KEY}` keys"
        )));
    };

    let Some(homeworks) = homeworks.as_array() else {
        return Err(BotError::malformed(format!(
            "`{HOMEWORKS_KEY}` must be a list, got {}",
            type_name(homeworks)
        )));
    };

    let Some(current_date) = current_date.as_i64() else {
        return Err(BotError::malformed(format!(
            "`{CURRENT_DATE_KEY}` must be an integer timestamp, got {}",
            type_name(current_date)
        )));
    };

    Ok(ValidatedResponse {
        homeworks: homeworks.clone(),
        current_date,
    })
}

/// Name of a JSON value's type, for error messages.
pub(crate) const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
