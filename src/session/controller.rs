//! Session controller: one request/response cycle.
//!
//! A fresh controller is created for every send. It owns the frame decoder
//! for that response and is the only writer to the open assistant turn.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::handle::{CancelToken, SessionUpdate};
use super::state::{SessionOutcome, SessionPhase};
use crate::error::{AssistError, ErrorContext, StreamError};
use crate::models::{ChatRequest, ClosedTurn, Conversation, ConversationError};
use crate::sse::{DecoderStats, DeltaEvent, FrameDecoder};
use crate::transport::{stream_error_from_http, TransportConnector};

/// Result of running a controller to completion.
#[derive(Debug)]
pub struct SessionRun {
    pub outcome: SessionOutcome,
    pub fragments: usize,
    pub stats: DecoderStats,
}

/// What the read loop decided after a batch of events.
enum Step {
    Continue,
    Finish(SessionOutcome),
}

pub struct SessionController {
    session_id: Uuid,
    phase: SessionPhase,
    decoder: FrameDecoder,
    transport: TransportConnector,
    cancel: CancelToken,
    updates: Option<mpsc::UnboundedSender<SessionUpdate>>,
    /// Released before `Finished` is emitted
    guard: Option<Box<dyn Send>>,
    fragments: usize,
}

impl SessionController {
    pub fn new(transport: TransportConnector, cancel: CancelToken) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            phase: SessionPhase::Idle,
            decoder: FrameDecoder::new(),
            transport,
            cancel,
            updates: None,
            guard: None,
            fragments: 0,
        }
    }

    /// Emit snapshots and the final outcome on `updates`.
    pub fn with_updates(mut self, updates: mpsc::UnboundedSender<SessionUpdate>) -> Self {
        self.updates = Some(updates);
        self
    }

    /// Hold `guard` for the life of the session. It is dropped once the
    /// outcome is final and before observers are told, so a caller reacting
    /// to `Finished` can start the next session right away.
    pub fn with_guard<G>(mut self, guard: G) -> Self
    where
        G: Send + 'static,
    {
        self.guard = Some(Box::new(guard));
        self
    }

    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Append the user turn, send the conversation, and stream the reply
    /// into a new assistant turn.
    pub async fn run(
        mut self,
        conversation: &mut Conversation,
        text: &str,
        auth_token: &str,
    ) -> SessionRun {
        tracing::info!("Session {} started", self.session_id);

        self.transition(SessionPhase::Sending);
        conversation.append_user_turn(text);

        let outcome = self.drive(conversation, auth_token).await;

        if conversation.has_open_turn() {
            match conversation.close_assistant_turn(outcome.discards_empty_turn()) {
                Ok(ClosedTurn::Removed) => {
                    tracing::debug!("Session {}: removed empty assistant turn", self.session_id)
                }
                Ok(ClosedTurn::Kept { fragments }) => tracing::debug!(
                    "Session {}: closed assistant turn with {} fragment(s)",
                    self.session_id,
                    fragments
                ),
                Err(e) => tracing::warn!("Session {}: {}", self.session_id, e),
            }
        }

        self.transition(SessionPhase::Terminal);

        match &outcome {
            SessionOutcome::Failed(err) => tracing::warn!(
                "Session {} failed [{}]: {}",
                self.session_id,
                err.error_code(),
                err
            ),
            other => tracing::info!("Session {} {}", self.session_id, other),
        }

        let stats = self.decoder.stats();
        if stats.requeued > 0 || stats.dropped > 0 {
            tracing::debug!(
                "Session {}: {} line(s), {} re-buffered, {} dropped",
                self.session_id,
                stats.lines,
                stats.requeued,
                stats.dropped
            );
        }

        drop(self.guard.take());
        self.emit(SessionUpdate::Finished(outcome.clone()));

        SessionRun {
            outcome,
            fragments: self.fragments,
            stats,
        }
    }

    async fn drive(&mut self, conversation: &mut Conversation, auth_token: &str) -> SessionOutcome {
        if self.cancel.is_cancelled() {
            return SessionOutcome::Cancelled;
        }

        let request = ChatRequest::from_turns(conversation.history());
        let cancel = self.cancel.clone();

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return SessionOutcome::Cancelled,
            opened = self.transport.open(&request, auth_token) => opened,
        };

        let mut body = match opened {
            Ok(open) => open.body,
            Err(e) => {
                return SessionOutcome::Failed(self.fail(AssistError::from(e), "open_stream"))
            }
        };

        self.transition(SessionPhase::Streaming);
        if let Err(e) = conversation.open_assistant_turn() {
            return SessionOutcome::Failed(self.fail(e.into(), "open_turn"));
        }

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return SessionOutcome::Cancelled,
                next = body.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    tracing::trace!("Session {}: {} byte chunk", self.session_id, chunk.len());
                    self.decoder.push(&chunk);
                    if let Step::Finish(outcome) = self.process_events(conversation) {
                        return outcome;
                    }
                    if self.cancel.is_cancelled() {
                        return SessionOutcome::Cancelled;
                    }
                }
                Some(Err(e)) => {
                    let err = AssistError::from(stream_error_from_http(e));
                    return SessionOutcome::Failed(self.fail(err, "read_stream"));
                }
                None => {
                    self.decoder.finish();
                    return match self.process_events(conversation) {
                        Step::Finish(outcome) => outcome,
                        Step::Continue => SessionOutcome::EndedWithoutTerminal,
                    };
                }
            }
        }
    }

    /// Apply every event the decoder can currently produce, in order.
    fn process_events(&mut self, conversation: &mut Conversation) -> Step {
        while let Some(event) = self.decoder.next_event() {
            match event {
                DeltaEvent::Fragment(text) => {
                    if let Err(e) = self.apply_fragment(conversation, &text) {
                        return Step::Finish(SessionOutcome::Failed(
                            self.fail(e.into(), "append_fragment"),
                        ));
                    }
                }
                DeltaEvent::Metadata => {}
                DeltaEvent::Terminal => return Step::Finish(SessionOutcome::Completed),
                DeltaEvent::ServerError { message, code } => {
                    let err = AssistError::from(StreamError::BackendError { code, message });
                    return Step::Finish(SessionOutcome::Failed(self.fail(err, "server_error")));
                }
            }
        }
        Step::Continue
    }

    fn apply_fragment(
        &mut self,
        conversation: &mut Conversation,
        text: &str,
    ) -> Result<(), ConversationError> {
        let snapshot = conversation.append_fragment(text)?.to_string();
        self.fragments += 1;
        self.emit(SessionUpdate::Snapshot(snapshot));
        Ok(())
    }

    fn fail(&self, err: AssistError, operation: &str) -> AssistError {
        err.with_context(
            ErrorContext::new(operation)
                .with_session_id(self.session_id.to_string())
                .with_component("session"),
        )
    }

    fn emit(&self, update: SessionUpdate) {
        if let Some(updates) = &self.updates {
            // A dropped receiver only means nobody is watching
            let _ = updates.send(update);
        }
    }

    fn transition(&mut self, next: SessionPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!("Session {}: {} -> {}", self.session_id, self.phase, next);
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::error::NetworkError;
    use crate::models::Role;
    use crate::traits::HttpError;
    use bytes::Bytes;
    use std::sync::Arc;

    const URL: &str = "https://api.example.com/chat";

    fn fragment(text: &str) -> String {
        format!(
            "data: {{\"choices\":[{{\"delta\":{{\"content\":\"{}\"}}}}]}}\n",
            text
        )
    }

    fn controller(response: MockResponse) -> SessionController {
        let client = MockHttpClient::with_default(response);
        SessionController::new(
            TransportConnector::new(Arc::new(client), URL),
            CancelToken::new(),
        )
    }

    async fn run(response: MockResponse) -> (SessionRun, Conversation) {
        let mut conversation = Conversation::new();
        let result = controller(response)
            .run(&mut conversation, "hello", "token")
            .await;
        (result, conversation)
    }

    #[tokio::test]
    async fn test_split_fragment_completes() {
        let (result, conversation) = run(MockResponse::chunks([
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel",
            "lo\"}}]}\n",
            "data: [DONE]\n",
        ]))
        .await;

        assert!(matches!(result.outcome, SessionOutcome::Completed));
        assert_eq!(result.fragments, 1);
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.last().unwrap().content, "Hello");
        assert!(!conversation.has_open_turn());
    }

    #[tokio::test]
    async fn test_graceful_eof() {
        let (result, conversation) =
            run(MockResponse::chunks([fragment("Drink "), fragment("water.")])).await;

        assert!(matches!(result.outcome, SessionOutcome::EndedWithoutTerminal));
        assert!(result.outcome.is_success());
        assert_eq!(conversation.last().unwrap().content, "Drink water.");
    }

    #[tokio::test]
    async fn test_terminal_ignores_trailing_bytes() {
        let (result, conversation) = run(MockResponse::chunks([
            format!("{}data: [DONE]\n{}", fragment("A"), fragment("B")),
            fragment("C"),
        ]))
        .await;

        assert!(matches!(result.outcome, SessionOutcome::Completed));
        assert_eq!(conversation.last().unwrap().content, "A");
    }

    #[tokio::test]
    async fn test_status_failure_leaves_no_assistant_turn() {
        let (result, conversation) = run(MockResponse::Status {
            status: 401,
            body: "invalid token".to_string(),
        })
        .await;

        let err = result.outcome.error().unwrap();
        assert!(matches!(
            err.inner(),
            AssistError::Network(NetworkError::HttpStatus { status: 401, .. })
        ));
        assert_eq!(err.context().unwrap().operation, "open_stream");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.count_role(Role::Assistant), 0);
    }

    #[tokio::test]
    async fn test_error_before_first_fragment_removes_turn() {
        let (result, conversation) = run(MockResponse::StreamThenError(
            vec![Bytes::from(": keep-alive\n")],
            HttpError::Io("connection reset".to_string()),
        ))
        .await;

        assert!(result.outcome.is_failed());
        assert_eq!(conversation.count_role(Role::Assistant), 0);
        assert!(!conversation.has_open_turn());
    }

    #[tokio::test]
    async fn test_error_after_fragment_keeps_partial_text() {
        let (result, conversation) = run(MockResponse::StreamThenError(
            vec![Bytes::from(fragment("Partial"))],
            HttpError::Io("connection reset".to_string()),
        ))
        .await;

        let err = result.outcome.error().unwrap();
        assert_eq!(err.error_code(), "E_STREAM_CONN");
        assert_eq!(conversation.last().unwrap().content, "Partial");
        assert!(!conversation.last().unwrap().is_streaming);
    }

    #[tokio::test]
    async fn test_server_error_payload_fails_session() {
        let (result, conversation) = run(MockResponse::chunks([
            "data: {\"error\":{\"message\":\"quota exceeded\",\"code\":\"rate_limit\"}}\n",
        ]))
        .await;

        let err = result.outcome.error().unwrap();
        assert!(matches!(
            err.inner(),
            AssistError::Stream(StreamError::BackendError { code: Some(code), .. }) if code == "rate_limit"
        ));
        assert_eq!(conversation.count_role(Role::Assistant), 0);
    }

    #[tokio::test]
    async fn test_error_envelope_without_message_fails_session() {
        let (result, conversation) = run(MockResponse::chunks([
            fragment("Let me check"),
            "data: {\"error\":{\"code\":\"rate_limit\"}}\n".to_string(),
            "data: [DONE]\n".to_string(),
        ]))
        .await;

        let err = result.outcome.error().unwrap();
        assert!(matches!(
            err.inner(),
            AssistError::Stream(StreamError::BackendError { code: Some(code), message })
                if code == "rate_limit" && message == "rate_limit"
        ));
        assert_eq!(err.context().unwrap().operation, "server_error");
        assert_eq!(conversation.last().unwrap().content, "Let me check");
    }

    #[tokio::test]
    async fn test_snapshots_emitted_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut conversation = Conversation::new();
        controller(MockResponse::chunks([
            fragment("One"),
            fragment(", two"),
            "data: [DONE]\n".to_string(),
        ]))
        .with_updates(tx)
        .run(&mut conversation, "count", "token")
        .await;

        let mut updates = Vec::new();
        while let Some(update) = rx.recv().await {
            updates.push(update);
        }
        assert_eq!(updates.len(), 3);
        assert!(matches!(&updates[0], SessionUpdate::Snapshot(s) if s == "One"));
        assert!(matches!(&updates[1], SessionUpdate::Snapshot(s) if s == "One, two"));
        assert!(matches!(
            &updates[2],
            SessionUpdate::Finished(SessionOutcome::Completed)
        ));
    }

    /// Marks its own release on the update channel
    struct ReleaseMarker(mpsc::UnboundedSender<SessionUpdate>);

    impl Drop for ReleaseMarker {
        fn drop(&mut self) {
            let _ = self.0.send(SessionUpdate::Snapshot("released".to_string()));
        }
    }

    #[tokio::test]
    async fn test_guard_released_before_finished() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut conversation = Conversation::new();
        controller(MockResponse::chunks([fragment("Hi"), "data: [DONE]\n".to_string()]))
            .with_updates(tx.clone())
            .with_guard(ReleaseMarker(tx))
            .run(&mut conversation, "hello", "token")
            .await;

        let mut updates = Vec::new();
        while let Some(update) = rx.recv().await {
            updates.push(update);
        }
        assert_eq!(updates.len(), 3);
        assert!(matches!(&updates[1], SessionUpdate::Snapshot(s) if s == "released"));
        assert!(matches!(
            &updates[2],
            SessionUpdate::Finished(SessionOutcome::Completed)
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        let client = MockHttpClient::with_default(MockResponse::chunks([fragment("x")]));
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut conversation = Conversation::new();
        let result = SessionController::new(
            TransportConnector::new(Arc::new(client.clone()), URL),
            cancel,
        )
        .run(&mut conversation, "hi", "token")
        .await;

        assert!(matches!(result.outcome, SessionOutcome::Cancelled));
        assert_eq!(client.request_count(), 0);
        assert_eq!(conversation.len(), 1);
    }

    #[tokio::test]
    async fn test_request_includes_history_and_new_turn() {
        let client = MockHttpClient::with_default(MockResponse::chunks(["data: [DONE]\n"]));
        let mut conversation = Conversation::new();
        conversation.append_user_turn("first");
        conversation.append_assistant_turn("reply");

        SessionController::new(
            TransportConnector::new(Arc::new(client.clone()), URL),
            CancelToken::new(),
        )
        .run(&mut conversation, "second", "token")
        .await;

        let body = client.get_requests()[0].json().unwrap();
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
        assert_eq!(body["messages"][2]["content"], "second");
        // Completed with no text: the empty turn stays
        assert_eq!(conversation.len(), 4);
    }
}
