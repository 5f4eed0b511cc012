mod conversation;
mod message;
mod request;

pub use conversation::{ClosedTurn, Conversation, ConversationError};
pub use message::{Role, Turn};
pub use request::{ChatRequest, RequestMessage};
