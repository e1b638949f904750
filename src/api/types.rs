//! API request and response types

use crate::transcript::{Transcript, Turn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const INVALID_BODY: &str = "Invalid JSON body";
pub const UPSTREAM_FAILURE: &str = "Failed to get a response from Google Generative AI";

/// Validated body of `POST /ask`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub history: Transcript,
    pub message: String,
}

/// Reasons an `/ask` body is rejected before any upstream call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid JSON body")]
    NotAnObject,
    #[error("Message is required")]
    MessageRequired,
    #[error("History should be an array")]
    HistoryNotArray,
    #[error("History contains an invalid turn")]
    InvalidTurn,
}

impl AskRequest {
    /// Check the shape of a raw JSON body. The body must be an object; the
    /// message is checked first, then the history container, then each turn.
    pub fn from_value(mut body: Value) -> Result<Self, ValidationError> {
        if !body.is_object() {
            return Err(ValidationError::NotAnObject);
        }

        let message = match body.get_mut("message").map(Value::take) {
            Some(Value::String(message)) if !message.trim().is_empty() => message,
            _ => return Err(ValidationError::MessageRequired),
        };

        let history = match body.get_mut("history").map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => return Err(ValidationError::HistoryNotArray),
        };

        let turns = history
            .into_iter()
            .map(serde_json::from_value::<Turn>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ValidationError::InvalidTurn)?;

        if turns.iter().any(|t| t.parts.is_empty()) {
            return Err(ValidationError::InvalidTurn);
        }

        Ok(Self {
            history: Transcript::from(turns),
            message,
        })
    }
}

/// Successful reply
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub data: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
