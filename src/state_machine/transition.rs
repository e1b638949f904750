//! Pure state transition function

use super::{ClientState, Effect, Event};
use crate::transcript::{Transcript, Turn};
use thiserror::Error;

/// Model turn appended when a relay call fails
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't get a response right now. Please try again.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ClientState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ClientState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("A request is already pending")]
    RequestPending,
    #[error("Received a relay outcome with no request pending")]
    UnexpectedReply,
}

/// Pure transition function
///
/// Given the same state, transcript and event it always produces the same
/// result. `transcript` is the transcript before any effect is applied.
pub fn transition(
    state: &ClientState,
    transcript: &Transcript,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Submission
        // ============================================================
        (ClientState::Idle, Event::Submit { text }) => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyMessage);
            }

            Ok(TransitionResult::new(ClientState::AwaitingReply {
                message: text.clone(),
            })
            .with_effect(Effect::ClearDraft)
            .with_effect(Effect::AppendTurn(Turn::user(text.clone())))
            .with_effect(Effect::ScrollToLatest)
            .with_effect(Effect::SendToRelay {
                history: transcript.clone(),
                message: text,
            }))
        }

        (ClientState::AwaitingReply { .. }, Event::Submit { .. }) => {
            Err(TransitionError::RequestPending)
        }

        // ============================================================
        // Relay outcome
        // ============================================================
        // A blank reply would be an empty turn; treat it as a failure
        (ClientState::AwaitingReply { .. }, Event::ReplyReceived { text })
            if text.trim().is_empty() =>
        {
            Ok(TransitionResult::new(ClientState::Idle)
                .with_effect(Effect::LogFailure {
                    reason: "relay returned an empty reply".to_string(),
                })
                .with_effect(Effect::AppendTurn(Turn::model(FALLBACK_REPLY)))
                .with_effect(Effect::ScrollToLatest))
        }

        (ClientState::AwaitingReply { .. }, Event::ReplyReceived { text }) => {
            Ok(TransitionResult::new(ClientState::Idle)
                .with_effect(Effect::AppendTurn(Turn::model(text)))
                .with_effect(Effect::ScrollToLatest))
        }

        (ClientState::AwaitingReply { .. }, Event::RelayFailed { reason }) => {
            Ok(TransitionResult::new(ClientState::Idle)
                .with_effect(Effect::LogFailure { reason })
                .with_effect(Effect::AppendTurn(Turn::model(FALLBACK_REPLY)))
                .with_effect(Effect::ScrollToLatest))
        }

        (ClientState::Idle, Event::ReplyReceived { .. } | Event::RelayFailed { .. }) => {
            Err(TransitionError::UnexpectedReply)
        }
    }
}
