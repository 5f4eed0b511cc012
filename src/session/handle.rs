//! Caller-side handle to a running session.
//!
//! The handle receives snapshot updates, can cancel the session, and joins
//! the task to get the conversation back together with the outcome.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::state::SessionOutcome;
use crate::error::{AssistError, AssistResult, StreamError};
use crate::models::Conversation;
use crate::sse::DecoderStats;

/// Update emitted while a session runs.
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    /// Full text of the open assistant turn after a fragment was applied
    Snapshot(String),
    /// The session reached a terminal state; no further updates follow
    Finished(SessionOutcome),
}

/// Shared cancellation flag.
///
/// The read loop checks the flag after each chunk and also wakes up when
/// cancelled while waiting for the next one.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Everything known about a finished session.
#[derive(Debug)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub outcome: SessionOutcome,
    /// The conversation, including the new user turn and any assistant text
    pub conversation: Conversation,
    /// Fragments applied to the assistant turn
    pub fragments: usize,
    pub stats: DecoderStats,
}

impl SessionReport {
    /// Text of the assistant turn produced by this session, if it was kept.
    pub fn reply(&self) -> Option<&str> {
        self.conversation
            .last()
            .filter(|turn| turn.is_assistant())
            .map(|turn| turn.content.as_str())
    }
}

/// Handle to a session running on the tokio runtime.
#[derive(Debug)]
pub struct SessionHandle {
    session_id: Uuid,
    updates: mpsc::UnboundedReceiver<SessionUpdate>,
    cancel: CancelToken,
    task: JoinHandle<SessionReport>,
}

impl SessionHandle {
    pub(crate) fn new(
        session_id: Uuid,
        updates: mpsc::UnboundedReceiver<SessionUpdate>,
        cancel: CancelToken,
        task: JoinHandle<SessionReport>,
    ) -> Self {
        Self {
            session_id,
            updates,
            cancel,
            task,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Next update, or `None` once the session has finished and all
    /// updates were received.
    pub async fn recv(&mut self) -> Option<SessionUpdate> {
        self.updates.recv().await
    }

    /// Stop consuming chunks. Text appended so far is kept.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this session, for handing to signal handlers.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the session task and return its report.
    pub async fn join(self) -> AssistResult<SessionReport> {
        self.task.await.map_err(|e| {
            AssistError::from(StreamError::Other {
                message: format!("session task ended abnormally: {}", e),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_token_wakes_waiter() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!token.is_cancelled());
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter should wake")
            .unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_already_set() {
        let token = CancelToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("already cancelled");
    }

    #[tokio::test]
    async fn test_handle_join_and_updates() {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        let task = tokio::spawn(async move {
            tx.send(SessionUpdate::Snapshot("Hi".to_string())).unwrap();
            tx.send(SessionUpdate::Finished(SessionOutcome::Completed)).unwrap();
            let mut conversation = Conversation::new();
            conversation.append_user_turn("hello");
            conversation.append_assistant_turn("Hi");
            SessionReport {
                session_id: id,
                outcome: SessionOutcome::Completed,
                conversation,
                fragments: 1,
                stats: DecoderStats::default(),
            }
        });

        let mut handle = SessionHandle::new(id, rx, CancelToken::new(), task);
        assert_eq!(handle.session_id(), id);
        assert!(matches!(handle.recv().await, Some(SessionUpdate::Snapshot(s)) if s == "Hi"));
        assert!(matches!(
            handle.recv().await,
            Some(SessionUpdate::Finished(SessionOutcome::Completed))
        ));
        assert!(handle.recv().await.is_none());

        let report = handle.join().await.unwrap();
        assert_eq!(report.reply(), Some("Hi"));
        assert_eq!(report.fragments, 1);
    }

    #[test]
    fn test_report_reply_none_when_last_is_user() {
        let mut conversation = Conversation::new();
        conversation.append_user_turn("hello");
        let report = SessionReport {
            session_id: Uuid::new_v4(),
            outcome: SessionOutcome::Cancelled,
            conversation,
            fragments: 0,
            stats: DecoderStats::default(),
        };
        assert_eq!(report.reply(), None);
    }
}
