use serde::{Deserialize, Serialize};

use super::message::{Role, Turn};

/// One message as sent to the chat endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Turn> for RequestMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
        }
    }
}

/// Request body for the streaming chat endpoint: `{ "messages": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChatRequest {
    pub messages: Vec<RequestMessage>,
}

impl ChatRequest {
    /// Build a request from the transcript, oldest turn first.
    ///
    /// Empty assistant turns are skipped; they carry nothing the model can use.
    pub fn from_turns<'a>(turns: impl IntoIterator<Item = &'a Turn>) -> Self {
        let messages = turns
            .into_iter()
            .filter(|turn| !(turn.is_assistant() && turn.content.is_empty()))
            .map(RequestMessage::from)
            .collect();
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_serialization() {
        let turns = vec![Turn::user("Why am I tired?"), Turn::assistant("Let's look at your sleep.")];
        let request = ChatRequest::from_turns(&turns);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "messages": [
                    {"role": "user", "content": "Why am I tired?"},
                    {"role": "assistant", "content": "Let's look at your sleep."}
                ]
            })
        );
    }

    #[test]
    fn test_chat_request_skips_empty_assistant_turns() {
        let turns = vec![Turn::user("q"), Turn::streaming_assistant()];
        let request = ChatRequest::from_turns(&turns);
        assert_eq!(request.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
    }

    #[test]
    fn test_chat_request_keeps_empty_user_turns() {
        let turns = vec![Turn::user("")];
        assert_eq!(ChatRequest::from_turns(&turns).len(), 1);
        assert!(ChatRequest::default().is_empty());
    }
}
