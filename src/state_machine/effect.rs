//! Effects produced by state transitions

use crate::transcript::{Transcript, Turn};

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Empty the input field
    ClearDraft,

    /// Append a turn to the transcript
    AppendTurn(Turn),

    /// Issue the single outbound call to the relay.
    /// `history` is the transcript as it stood before the new user turn.
    SendToRelay { history: Transcript, message: String },

    /// Bring the newest turn into view
    ScrollToLatest,

    /// Record a failed relay call
    LogFailure { reason: String },
}
