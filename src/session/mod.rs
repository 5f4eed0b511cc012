//! Streaming session orchestration.
//!
//! - `state` - SessionPhase and SessionOutcome
//! - `controller` - SessionController, one per send
//! - `handle` - SessionHandle, SessionUpdate, CancelToken, SessionReport

mod controller;
mod handle;
mod state;

pub use controller::{SessionController, SessionRun};
pub use handle::{CancelToken, SessionHandle, SessionReport, SessionUpdate};
pub use state::{SessionOutcome, SessionPhase};

use tokio::sync::mpsc;

use crate::models::Conversation;
use crate::transport::TransportConnector;

/// Run a new session on the tokio runtime.
///
/// The conversation moves into the task and comes back in the report.
/// `guard` is released as soon as the outcome is final, before `Finished`
/// reaches the handle. It is also released if the task is aborted.
pub fn spawn_session<G>(
    transport: TransportConnector,
    mut conversation: Conversation,
    text: String,
    auth_token: String,
    guard: G,
) -> SessionHandle
where
    G: Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancelToken::new();
    let controller = SessionController::new(transport, cancel.clone())
        .with_updates(tx)
        .with_guard(guard);
    let session_id = controller.session_id();

    let task = tokio::spawn(async move {
        let run = controller.run(&mut conversation, &text, &auth_token).await;
        SessionReport {
            session_id,
            outcome: run.outcome,
            conversation,
            fragments: run.fragments,
            stats: run.stats,
        }
    });

    SessionHandle::new(session_id, rx, cancel, task)
}
