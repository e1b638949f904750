//! Conversation client runtime
//!
//! Owns the transcript, the draft and the pending flag. All changes go
//! through the pure state machine; this module only executes effects.

mod relay;
mod terminal;

pub use relay::{ClientError, HttpRelayClient, RelayClient};
pub use terminal::TerminalView;

use crate::state_machine::{transition, ClientState, Effect, Event, TransitionError};
use crate::transcript::Transcript;

/// Where the transcript is shown
pub trait TranscriptView {
    /// Bring the newest turn into view
    fn show_latest(&mut self, transcript: &Transcript);

    /// Called when a relay call starts or settles
    fn pending_changed(&mut self, _pending: bool) {}
}

/// The single outbound call produced by an accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayCall {
    /// Transcript as it stood before the new user turn
    pub history: Transcript,
    pub message: String,
}

pub struct ChatClient<V: TranscriptView> {
    state: ClientState,
    transcript: Transcript,
    draft: String,
    view: V,
}

impl<V: TranscriptView> ChatClient<V> {
    pub fn new(view: V) -> Self {
        Self {
            state: ClientState::Idle,
            transcript: Transcript::new(),
            draft: String::new(),
            view,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Start a turn. The user turn is appended immediately; the returned
    /// call must be settled with [`ChatClient::settle`]. Returns `None`
    /// (and changes nothing) for blank text or while a call is pending.
    pub fn submit(&mut self, text: impl Into<String>) -> Option<RelayCall> {
        self.dispatch(Event::Submit { text: text.into() })
    }

    /// Submit the current draft
    pub fn submit_draft(&mut self) -> Option<RelayCall> {
        let text = self.draft.clone();
        self.submit(text)
    }

    /// Apply the outcome of the outstanding relay call
    pub fn settle(&mut self, outcome: Result<String, ClientError>) {
        let event = match outcome {
            Ok(text) => Event::ReplyReceived { text },
            Err(e) => Event::RelayFailed {
                reason: e.to_string(),
            },
        };
        self.dispatch(event);
    }

    /// Submit, call the relay, and settle
    pub async fn send<R: RelayClient + ?Sized>(&mut self, text: impl Into<String>, relay: &R) {
        if let Some(call) = self.submit(text) {
            let outcome = relay.ask(&call.history, &call.message).await;
            self.settle(outcome);
        }
    }

    /// Send the current draft
    pub async fn send_draft<R: RelayClient + ?Sized>(&mut self, relay: &R) {
        let text = self.draft.clone();
        self.send(text, relay).await;
    }

    fn dispatch(&mut self, event: Event) -> Option<RelayCall> {
        let result = match transition(&self.state, &self.transcript, event) {
            Ok(result) => result,
            Err(TransitionError::EmptyMessage) => return None,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring event");
                return None;
            }
        };

        let was_pending = self.state.is_pending();
        let mut call = None;

        for effect in result.effects {
            match effect {
                Effect::ClearDraft => self.draft.clear(),
                Effect::AppendTurn(turn) => self.transcript.push(turn),
                Effect::ScrollToLatest => self.view.show_latest(&self.transcript),
                Effect::SendToRelay { history, message } => {
                    call = Some(RelayCall { history, message });
                }
                Effect::LogFailure { reason } => {
                    tracing::warn!(reason = %reason, "Error getting response");
                }
            }
        }

        self.state = result.new_state;
        if self.state.is_pending() != was_pending {
            self.view.pending_changed(self.state.is_pending());
        }

        call
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{create_router, AppState};
    use crate::llm::testing::MockLlmService;
    use crate::state_machine::FALLBACK_REPLY;
    use crate::transcript::{Role, Turn};
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use std::sync::{Arc, Mutex};

    /// View that records what it was asked to show
    #[derive(Default)]
    struct RecordingView {
        shown_lengths: Vec<usize>,
        pending: Vec<bool>,
    }

    impl TranscriptView for RecordingView {
        fn show_latest(&mut self, transcript: &Transcript) {
            self.shown_lengths.push(transcript.len());
        }

        fn pending_changed(&mut self, pending: bool) {
            self.pending.push(pending);
        }
    }

    /// Relay that returns queued outcomes and records calls
    struct MockRelay {
        replies: Mutex<Vec<Result<String, ClientError>>>,
        calls: Mutex<Vec<RelayCall>>,
    }

    impl MockRelay {
        fn new(mut replies: Vec<Result<String, ClientError>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RelayClient for MockRelay {
        async fn ask(&self, history: &Transcript, message: &str) -> Result<String, ClientError> {
            self.calls.lock().unwrap().push(RelayCall {
                history: history.clone(),
                message: message.to_string(),
            });
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(ClientError::MalformedPayload("no reply".to_string())))
        }
    }

    fn last_two(client: &ChatClient<RecordingView>) -> Vec<(Role, String)> {
        let turns = client.transcript().turns();
        turns[turns.len() - 2..]
            .iter()
            .map(|t| (t.role, t.text()))
            .collect()
    }

    #[tokio::test]
    async fn test_send_appends_user_then_model() {
        let relay = MockRelay::new(vec![Ok("hello!".to_string())]);
        let mut client = ChatClient::new(RecordingView::default());

        client.send("x", &relay).await;

        assert_eq!(
            last_two(&client),
            vec![
                (Role::User, "x".to_string()),
                (Role::Model, "hello!".to_string())
            ]
        );
        assert!(!client.is_pending());
        assert_eq!(client.view().shown_lengths, vec![1, 2]);
        assert_eq!(client.view().pending, vec![true, false]);
    }

    #[tokio::test]
    async fn test_history_excludes_new_message() {
        let relay = MockRelay::new(vec![Ok("one".to_string()), Ok("two".to_string())]);
        let mut client = ChatClient::new(RecordingView::default());

        client.send("first", &relay).await;
        client.send("second", &relay).await;

        let calls = relay.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].history.is_empty());
        assert_eq!(calls[0].message, "first");
        assert_eq!(
            calls[1].history.turns(),
            &[Turn::user("first"), Turn::model("one")]
        );
        assert_eq!(calls[1].message, "second");
    }

    #[test]
    fn test_pending_gates_second_submit() {
        let mut client = ChatClient::new(RecordingView::default());
        assert!(!client.is_pending());

        let call = client.submit("x").unwrap();
        assert!(call.history.is_empty());
        assert!(client.is_pending());
        assert_eq!(client.transcript().len(), 1);

        // Second submission while pending is a no-op
        assert!(client.submit("y").is_none());
        assert_eq!(client.transcript().len(), 1);
        assert!(client.is_pending());

        client.settle(Ok("reply".to_string()));
        assert!(!client.is_pending());
        assert_eq!(client.transcript().len(), 2);
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut client = ChatClient::new(RecordingView::default());
        client.set_draft("   ");
        assert!(client.submit_draft().is_none());
        assert!(client.transcript().is_empty());
        assert!(!client.is_pending());
        assert_eq!(client.draft(), "   ");
    }

    #[test]
    fn test_draft_cleared_on_submit() {
        let mut client = ChatClient::new(RecordingView::default());
        client.set_draft("hello");
        let call = client.submit_draft().unwrap();
        assert_eq!(call.message, "hello");
        assert_eq!(client.draft(), "");
    }

    #[test]
    fn test_settle_without_pending_is_ignored() {
        let mut client = ChatClient::new(RecordingView::default());
        client.settle(Ok("stray".to_string()));
        assert!(client.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_failure_appends_fallback_and_clears_pending() {
        let relay = MockRelay::new(vec![Err(ClientError::Status {
            status: 500,
            message: Some("Failed".to_string()),
        })]);
        let mut client = ChatClient::new(RecordingView::default());

        client.send("x", &relay).await;

        assert!(!client.is_pending());
        assert_eq!(
            last_two(&client),
            vec![
                (Role::User, "x".to_string()),
                (Role::Model, FALLBACK_REPLY.to_string())
            ]
        );
    }

    // ============================================================
    // Over HTTP
    // ============================================================

    fn local_client(base_url: &str) -> HttpRelayClient {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpRelayClient::with_client(client, base_url)
    }

    async fn spawn_relay(mock: Arc<MockLlmService>) -> String {
        let app = create_router(AppState::new(
            mock,
            HeaderValue::from_static("http://localhost:5173"),
        ));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_round_trip_through_relay() {
        let mock = Arc::new(MockLlmService::new("mock"));
        mock.queue_reply("hi there");
        mock.queue_reply("```python\nprint('ok')\n```");
        let relay = local_client(&spawn_relay(mock.clone()).await);

        let mut client = ChatClient::new(RecordingView::default());
        client.send("hello", &relay).await;
        client.send("code please", &relay).await;

        assert_eq!(
            last_two(&client),
            vec![
                (Role::User, "code please".to_string()),
                (Role::Model, "```python\nprint('ok')\n```".to_string())
            ]
        );

        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].history.turns(),
            &[Turn::user("hello"), Turn::model("hi there")]
        );
    }

    #[tokio::test]
    async fn test_relay_error_surfaces_as_status() {
        let mock = Arc::new(MockLlmService::new("mock"));
        mock.queue_error(crate::llm::LlmError::server_error("boom"));
        let relay = local_client(&spawn_relay(mock).await);

        let err = relay.ask(&Transcript::new(), "hello").await.unwrap_err();
        match err {
            ClientError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message.as_deref(), Some(crate::api::UPSTREAM_FAILURE));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_relay_falls_back() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let relay = local_client(&format!("http://{addr}"));
        let mut client = ChatClient::new(RecordingView::default());
        client.send("x", &relay).await;

        assert!(!client.is_pending());
        assert_eq!(client.transcript().last().unwrap().text(), FALLBACK_REPLY);
    }
}
