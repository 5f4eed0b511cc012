//! The conversation transcript and its streaming accumulator operations.
//!
//! A `Conversation` is append-only while a session runs. At most one
//! assistant turn is open at a time; fragments are appended to it in the
//! order the session controller parsed them.

use thiserror::Error;

use super::message::{Role, Turn};

/// Errors raised when the accumulator contract is violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    /// `open_assistant_turn` was called while another turn is still open
    #[error("an assistant turn is already open")]
    TurnAlreadyOpen,

    /// A fragment or close arrived with no open assistant turn
    #[error("no assistant turn is open")]
    NoOpenTurn,
}

/// What happened to the open turn when it was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedTurn {
    /// The turn stays in the transcript
    Kept { fragments: usize },
    /// The turn was empty and removed from the transcript
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenTurn {
    index: usize,
    fragments: usize,
}

/// Ordered sequence of turns, owned by the UI context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    turns: Vec<Turn>,
    open: Option<OpenTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a conversation from restored history. Any turn flagged as
    /// streaming is finalized; restored history never has an open turn.
    pub fn from_turns(turns: impl IntoIterator<Item = Turn>) -> Self {
        let turns = turns
            .into_iter()
            .map(|mut turn| {
                turn.finalize();
                turn
            })
            .collect();
        Self { turns, open: None }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Whether an assistant turn is currently receiving fragments.
    pub fn has_open_turn(&self) -> bool {
        self.open.is_some()
    }

    /// The open assistant turn, if any.
    pub fn open_turn(&self) -> Option<&Turn> {
        self.open.map(|open| &self.turns[open.index])
    }

    /// Number of fragments applied to the open turn so far.
    pub fn open_fragment_count(&self) -> usize {
        self.open.map(|open| open.fragments).unwrap_or(0)
    }

    /// Append a finished user turn. Always succeeds.
    pub fn append_user_turn(&mut self, text: impl Into<String>) -> &Turn {
        self.push(Turn::user(text))
    }

    /// Append a finished assistant turn (canned replies).
    pub fn append_assistant_turn(&mut self, text: impl Into<String>) -> &Turn {
        self.push(Turn::assistant(text))
    }

    /// Append an empty assistant turn and mark it open.
    pub fn open_assistant_turn(&mut self) -> Result<&Turn, ConversationError> {
        if self.open.is_some() {
            return Err(ConversationError::TurnAlreadyOpen);
        }
        self.open = Some(OpenTurn {
            index: self.turns.len(),
            fragments: 0,
        });
        Ok(self.push(Turn::streaming_assistant()))
    }

    /// Concatenate a fragment onto the open turn and return the text so far.
    pub fn append_fragment(&mut self, text: &str) -> Result<&str, ConversationError> {
        let open = self.open.as_mut().ok_or(ConversationError::NoOpenTurn)?;
        open.fragments += 1;
        let turn = &mut self.turns[open.index];
        turn.append_token(text);
        Ok(&turn.content)
    }

    /// Close the open turn. When `discard_if_empty` is set and no fragment
    /// was ever applied, the turn is removed instead of left empty.
    pub fn close_assistant_turn(
        &mut self,
        discard_if_empty: bool,
    ) -> Result<ClosedTurn, ConversationError> {
        let open = self.open.take().ok_or(ConversationError::NoOpenTurn)?;

        if discard_if_empty && open.fragments == 0 {
            self.turns.remove(open.index);
            return Ok(ClosedTurn::Removed);
        }

        self.turns[open.index].finalize();
        Ok(ClosedTurn::Kept {
            fragments: open.fragments,
        })
    }

    /// Turns to send as request history, in order.
    pub fn history(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter().filter(|turn| !turn.is_streaming)
    }

    /// Count of turns with the given role.
    pub fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|turn| turn.role == role).count()
    }

    fn push(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }
}
