//! Property-based tests for the client state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::*;
use crate::transcript::{Role, Transcript, Turn};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ?!.]{1,40}",
        Just(String::new()),
        Just("   ".to_string()),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::Submit { text }),
        "[a-zA-Z0-9 ]{0,40}".prop_map(|text| Event::ReplyReceived { text }),
        "[a-z ]{1,20}".prop_map(|reason| Event::RelayFailed { reason }),
    ]
}

// ============================================================================
// Effect interpreter
// ============================================================================

/// Minimal stand-in for the client runtime
#[derive(Default)]
struct Harness {
    state: ClientState,
    transcript: Transcript,
    sent: Vec<(Transcript, String)>,
}

impl Harness {
    fn apply(&mut self, event: Event) -> Result<(), TransitionError> {
        let result = transition(&self.state, &self.transcript, event)?;
        for effect in result.effects {
            match effect {
                Effect::AppendTurn(turn) => self.transcript.push(turn),
                Effect::SendToRelay { history, message } => self.sent.push((history, message)),
                Effect::ClearDraft | Effect::ScrollToLatest | Effect::LogFailure { .. } => {}
            }
        }
        self.state = result.new_state;
        Ok(())
    }
}

proptest! {
    /// Rejected events leave state and transcript untouched; accepted
    /// events only ever extend the transcript.
    #[test]
    fn prop_transcript_is_append_only(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut harness = Harness::default();
        for event in events {
            let before_state = harness.state.clone();
            let before = harness.transcript.clone();

            match harness.apply(event) {
                Ok(()) => {
                    prop_assert!(harness.transcript.len() == before.len() + 1);
                    prop_assert_eq!(&harness.transcript.turns()[..before.len()], before.turns());
                }
                Err(_) => {
                    prop_assert_eq!(&harness.state, &before_state);
                    prop_assert_eq!(&harness.transcript, &before);
                }
            }
        }
    }

    /// Pending exactly while a sent request has not been settled
    #[test]
    fn prop_pending_tracks_outstanding_request(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut harness = Harness::default();
        let mut settled = 0usize;
        for event in events {
            let is_outcome = !matches!(event, Event::Submit { .. });
            if harness.apply(event).is_ok() && is_outcome {
                settled += 1;
            }
            prop_assert_eq!(harness.state.is_pending(), harness.sent.len() > settled);
            prop_assert!(harness.sent.len() <= settled + 1);
        }
    }

    /// Each request carries the transcript as it stood before its user turn,
    /// and turns alternate user/model.
    #[test]
    fn prop_history_is_pre_append(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut harness = Harness::default();
        for event in events {
            let before = harness.transcript.clone();
            let sent_before = harness.sent.len();
            let _ = harness.apply(event);

            if harness.sent.len() > sent_before {
                let (history, message) = harness.sent.last().unwrap();
                let user_turn = Turn::user(message.clone());
                prop_assert_eq!(history, &before);
                prop_assert_eq!(harness.transcript.last(), Some(&user_turn));
            }
        }

        for (i, turn) in harness.transcript.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Model };
            prop_assert_eq!(turn.role, expected);
            prop_assert!(!turn.text().trim().is_empty());
        }
    }

    /// Same inputs, same outputs
    #[test]
    fn prop_transition_is_deterministic(
        events in proptest::collection::vec(arb_event(), 0..10),
        next in arb_event(),
    ) {
        let mut harness = Harness::default();
        for event in events {
            let _ = harness.apply(event);
        }

        let first = transition(&harness.state, &harness.transcript, next.clone());
        let second = transition(&harness.state, &harness.transcript, next);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.new_state, b.new_state);
                prop_assert_eq!(a.effects, b.effects);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "transition was not deterministic"),
        }
    }
}
