//! Client state types

/// Whether a relay call is outstanding. At most one is ever in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClientState {
    #[default]
    Idle,
    AwaitingReply {
        /// The message the outstanding call carries
        message: String,
    },
}

impl ClientState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ClientState::AwaitingReply { .. })
    }
}
