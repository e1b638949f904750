//! Common types for LLM interactions

use crate::transcript::Transcript;

/// A chat request: a session seeded with `history`, then sent `message`
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub history: Transcript,
    pub message: String,
}

impl ChatRequest {
    pub fn new(history: Transcript, message: impl Into<String>) -> Self {
        Self {
            history,
            message: message.into(),
        }
    }
}

/// Generated reply
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub usage: Usage,
}

impl ChatReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
