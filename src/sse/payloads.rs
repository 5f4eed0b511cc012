//! Payload deserialization structs
//!
//! Internal structs used to read JSON data payloads from the
//! chat-completions style event stream.

use serde::Deserialize;

/// Message used when an error envelope carries nothing readable
pub(crate) const UNSPECIFIED_ERROR: &str = "unspecified server error";

/// One streamed chunk: `{"choices":[{"delta":{"content":"..."}}]}`
#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct ChunkPayload {
    #[serde(default)]
    pub choices: Vec<ChoicePayload>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct ChoicePayload {
    #[serde(default)]
    pub delta: Option<DeltaPayload>,
}

/// Nested delta payload; some gateways use `text` instead of `content`
#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct DeltaPayload {
    #[serde(default, alias = "text")]
    pub content: Option<String>,
}

/// Value of an `"error"` key: a bare string, an object with any of
/// `message`, `code` and `type`, or anything else
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorPayload {
    Message(String),
    Detailed {
        #[serde(default)]
        message: Option<serde_json::Value>,
        #[serde(default)]
        code: Option<serde_json::Value>,
        #[serde(default, rename = "type")]
        kind: Option<serde_json::Value>,
    },
    Other(serde_json::Value),
}

impl ChunkPayload {
    /// First non-empty content fragment across the choices, if any
    pub fn fragment(self) -> Option<String> {
        self.choices
            .into_iter()
            .filter_map(|choice| choice.delta.and_then(|delta| delta.content))
            .find(|content| !content.is_empty())
    }
}

impl ErrorPayload {
    /// Read the value of an `"error"` key. `null`, `false` and blank
    /// strings mean no error.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null | serde_json::Value::Bool(false) => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            other => serde_json::from_value(other).ok(),
        }
    }

    /// Message and optional code. The message falls back to `type`, then
    /// `code`, then a generic text.
    pub fn into_parts(self) -> (String, Option<String>) {
        match self {
            ErrorPayload::Message(message) => (message, None),
            ErrorPayload::Detailed {
                message,
                code,
                kind,
            } => {
                let code = code.and_then(value_text);
                let kind = kind.and_then(value_text);
                let message = message
                    .and_then(value_text)
                    .or_else(|| kind.clone())
                    .or_else(|| code.clone())
                    .unwrap_or_else(|| UNSPECIFIED_ERROR.to_string());
                (message, code.or(kind))
            }
            ErrorPayload::Other(value) => (
                value_text(value).unwrap_or_else(|| UNSPECIFIED_ERROR.to_string()),
                None,
            ),
        }
    }
}

fn value_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
