//! Streaming-related error types.
//!
//! Only failures that end a session live here. Framing anomalies (blank,
//! comment and unrecognized lines, payloads that do not parse yet) are
//! absorbed by the decoder and never surface as a `StreamError`.

use std::fmt;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The transport failed while the response body was being read.
    ConnectionLost {
        message: String,
    },

    /// The server reported an error inside the event stream.
    BackendError {
        code: Option<String>,
        message: String,
    },

    /// Generic stream error.
    Other {
        message: String,
    },
}

impl StreamError {
    /// Check if this error is likely transient and a manual resend may help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StreamError::ConnectionLost { .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionLost { .. } => {
                "The connection to the assistant was interrupted. Please send your message again."
                    .to_string()
            }
            StreamError::BackendError { message, .. } => {
                format!("The assistant reported an error: {}", message)
            }
            StreamError::Other { message } => format!("Stream error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::BackendError { .. } => "E_STREAM_BACKEND",
            StreamError::Other { .. } => "E_STREAM_OTHER",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
            StreamError::BackendError { code, message } => match code {
                Some(c) => write!(f, "Backend error [{}]: {}", c, message),
                None => write!(f, "Backend error: {}", message),
            },
            StreamError::Other { message } => write!(f, "Stream error: {}", message),
        }
    }
}

impl std::error::Error for StreamError {}
