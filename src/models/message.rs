use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a turn in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry in the conversation transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// Client-generated identifier, stable for the lifetime of the transcript
    pub id: Uuid,
    /// Who authored the turn
    pub role: Role,
    /// Text body; for an open assistant turn this grows as fragments arrive
    pub content: String,
    /// When the turn was appended
    pub created_at: DateTime<Utc>,
    /// Whether the turn is still receiving fragments
    #[serde(default)]
    pub is_streaming: bool,
}

impl Turn {
    /// Create a finished user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), false)
    }

    /// Create a finished assistant turn (canned replies, restored history)
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), false)
    }

    /// Create an empty assistant turn that is still receiving fragments
    pub fn streaming_assistant() -> Self {
        Self::new(Role::Assistant, String::new(), true)
    }

    fn new(role: Role, content: String, is_streaming: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            created_at: Utc::now(),
            is_streaming,
        }
    }

    /// Append a fragment to the body during streaming
    pub fn append_token(&mut self, token: &str) {
        self.content.push_str(token);
    }

    /// Mark the turn as no longer receiving fragments
    pub fn finalize(&mut self) {
        self.is_streaming = false;
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_turn() {
        let turn = Turn::user("How long is my cycle?");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, "How long is my cycle?");
        assert!(!turn.is_streaming);
        assert!(turn.is_user());
    }

    #[test]
    fn test_streaming_assistant_turn() {
        let mut turn = Turn::streaming_assistant();
        assert!(turn.is_assistant());
        assert!(turn.is_streaming);
        assert!(turn.content.is_empty());

        turn.append_token("Hel");
        turn.append_token("lo");
        assert_eq!(turn.content, "Hello");

        turn.finalize();
        assert!(!turn.is_streaming);
        assert_eq!(turn.content, "Hello");
    }

    #[test]
    fn test_turn_ids_are_unique() {
        let a = Turn::user("a");
        let b = Turn::user("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_turn_deserializes_without_streaming_flag() {
        let json = r#"{
            "id": "6f1c2d9e-2b8a-4f0e-9c35-0d6b9b1f4a11",
            "role": "assistant",
            "content": "Drink water",
            "created_at": "2026-01-15T10:00:00Z"
        }"#;
        let turn: Turn = serde_json::from_str(json).unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert!(!turn.is_streaming);
    }
}
