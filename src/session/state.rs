//! Session phases and outcomes.

use std::fmt;

use crate::error::AssistError;

/// Lifecycle of one request/response cycle.
///
/// `Idle -> Sending -> Streaming -> Terminal`, or `Sending -> Terminal` when
/// the transport fails before a stream is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Idle,
    Sending,
    Streaming,
    Terminal,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Sending => "sending",
            SessionPhase::Streaming => "streaming",
            SessionPhase::Terminal => "terminal",
        }
    }

    /// Whether moving to `next` is a legal transition.
    pub fn can_transition_to(&self, next: SessionPhase) -> bool {
        matches!(
            (self, next),
            (SessionPhase::Idle, SessionPhase::Sending)
                | (SessionPhase::Sending, SessionPhase::Streaming)
                | (SessionPhase::Sending, SessionPhase::Terminal)
                | (SessionPhase::Streaming, SessionPhase::Terminal)
        )
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a session ended. Terminal states are final.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    /// The terminal token was decoded
    Completed,
    /// The transport closed the stream without a terminal token
    EndedWithoutTerminal,
    /// Transport failure or server error payload
    Failed(AssistError),
    /// The owner cancelled the session; partial text is kept
    Cancelled,
}

impl SessionOutcome {
    /// Completed and ended-without-terminal both count as success.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SessionOutcome::Completed | SessionOutcome::EndedWithoutTerminal
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SessionOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&AssistError> {
        match self {
            SessionOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Whether an assistant turn that never received text is removed.
    pub fn discards_empty_turn(&self) -> bool {
        matches!(self, SessionOutcome::Failed(_) | SessionOutcome::Cancelled)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionOutcome::Completed => "completed",
            SessionOutcome::EndedWithoutTerminal => "ended-without-terminal",
            SessionOutcome::Failed(_) => "failed",
            SessionOutcome::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::Failed(err) => write!(f, "failed: {}", err),
            other => f.write_str(other.label()),
        }
    }
}
