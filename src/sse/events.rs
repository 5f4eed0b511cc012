//! Frame and delta event definitions
//!
//! A `Frame` is one classified line of the event stream. A `DeltaEvent` is
//! what a data frame's payload means to the conversation.

use std::fmt;

/// The reserved payload that marks the end of a response.
pub const TERMINAL_TOKEN: &str = "[DONE]";

/// One classified line of the event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// `data:` line, prefix stripped and payload trimmed
    Data(String),
    /// `:`-prefixed keep-alive or comment line
    Comment(String),
    /// Empty or whitespace-only line (event separator)
    Blank,
    /// Any other field (`event:`, `id:`, `retry:`, unknown extensions)
    Unrecognized(String),
}

impl Frame {
    /// Returns the frame kind as a string for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Data(_) => "data",
            Frame::Comment(_) => "comment",
            Frame::Blank => "blank",
            Frame::Unrecognized(_) => "unrecognized",
        }
    }
}

/// Parsed meaning of a data frame payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaEvent {
    /// Incremental text to append to the open assistant turn
    Fragment(String),
    /// Valid payload that carries no text (role announcements, usage, finish reasons)
    Metadata,
    /// The terminal token; no further bytes of this response are read
    Terminal,
    /// The server reported an error inside the stream
    ServerError {
        message: String,
        code: Option<String>,
    },
}

impl DeltaEvent {
    pub fn event_type_name(&self) -> &'static str {
        match self {
            DeltaEvent::Fragment(_) => "fragment",
            DeltaEvent::Metadata => "metadata",
            DeltaEvent::Terminal => "terminal",
            DeltaEvent::ServerError { .. } => "server_error",
        }
    }
}

/// A payload that could not be interpreted yet.
///
/// This is not a failure on its own: the line may have been cut before the
/// rest of its bytes arrived. The decoder re-buffers the line and retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The payload is not syntactically complete JSON
    Incomplete { source: String },
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::Incomplete { source } => {
                write!(f, "Payload not parseable yet: {}", source)
            }
        }
    }
}

impl std::error::Error for PayloadError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_kind() {
        assert_eq!(Frame::Data("x".to_string()).kind(), "data");
        assert_eq!(Frame::Comment("keep-alive".to_string()).kind(), "comment");
        assert_eq!(Frame::Blank.kind(), "blank");
        assert_eq!(Frame::Unrecognized("id: 1".to_string()).kind(), "unrecognized");
    }

    #[test]
    fn test_delta_event_type_name() {
        assert_eq!(DeltaEvent::Fragment("a".to_string()).event_type_name(), "fragment");
        assert_eq!(DeltaEvent::Metadata.event_type_name(), "metadata");
        assert_eq!(DeltaEvent::Terminal.event_type_name(), "terminal");
        assert_eq!(
            DeltaEvent::ServerError {
                message: "m".to_string(),
                code: None
            }
            .event_type_name(),
            "server_error"
        );
    }

    #[test]
    fn test_payload_error_display() {
        let err = PayloadError::Incomplete {
            source: "EOF while parsing a string".to_string(),
        };
        assert!(err.to_string().contains("EOF while parsing"));
    }
}
