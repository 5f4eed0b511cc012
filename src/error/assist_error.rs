//! Unified error type for the assistant chat client.
//!
//! `AssistError` consolidates the domain-specific errors into a single enum
//! so the chat surface has one type to categorize, log and present.

use std::fmt;

use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::network::NetworkError;
use super::stream::StreamError;
use crate::models::ConversationError;

/// Unified error type for the assistant chat client.
#[derive(Debug, Clone)]
pub enum AssistError {
    /// Transport-level errors (connection, HTTP status, missing body).
    Network(NetworkError),

    /// Errors that ended a session after the stream was opened.
    Stream(StreamError),

    /// Transcript contract violations.
    Conversation(ConversationError),

    /// A send was attempted while another session is still streaming.
    SessionInFlight,

    /// Invalid or missing configuration.
    Configuration { message: String },

    /// Wrapped error with additional context.
    WithContext {
        error: Box<AssistError>,
        context: ErrorContext,
    },
}

impl AssistError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            AssistError::Network(err) => match err {
                _ if err.is_auth_failure() => ErrorCategory::Auth,
                NetworkError::HttpStatus { status, .. } if *status >= 500 => ErrorCategory::Server,
                NetworkError::MissingBody { .. } => ErrorCategory::Server,
                NetworkError::Cancelled => ErrorCategory::User,
                _ => ErrorCategory::Network,
            },
            AssistError::Stream(err) => match err {
                StreamError::ConnectionLost { .. } => ErrorCategory::Network,
                StreamError::BackendError { .. } | StreamError::Other { .. } => {
                    ErrorCategory::Server
                }
            },
            AssistError::Conversation(_) => ErrorCategory::Client,
            AssistError::SessionInFlight => ErrorCategory::User,
            AssistError::Configuration { .. } => ErrorCategory::Configuration,
            AssistError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if a manual resend is worth offering.
    pub fn is_retryable(&self) -> bool {
        match self {
            AssistError::Network(err) => err.is_retryable(),
            AssistError::Stream(err) => err.is_retryable(),
            AssistError::Conversation(_) => false,
            AssistError::SessionInFlight => false,
            AssistError::Configuration { .. } => false,
            AssistError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            AssistError::Network(err) => err.user_message(),
            AssistError::Stream(err) => err.user_message(),
            AssistError::Conversation(_) => {
                "Something went wrong while updating the conversation.".to_string()
            }
            AssistError::SessionInFlight => {
                "Please wait for the current response to complete before sending another message."
                    .to_string()
            }
            AssistError::Configuration { message } => {
                format!("The assistant is not configured correctly: {}", message)
            }
            AssistError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AssistError::Network(err) => err.error_code(),
            AssistError::Stream(err) => err.error_code(),
            AssistError::Conversation(_) => "E_CONVERSATION",
            AssistError::SessionInFlight => "E_SESSION_BUSY",
            AssistError::Configuration { .. } => "E_CONFIG",
            AssistError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        AssistError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            AssistError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &AssistError {
        match self {
            AssistError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for AssistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssistError::Network(err) => write!(f, "{}", err),
            AssistError::Stream(err) => write!(f, "{}", err),
            AssistError::Conversation(err) => write!(f, "{}", err),
            AssistError::SessionInFlight => write!(f, "A session is already streaming"),
            AssistError::Configuration { message } => write!(f, "Configuration error: {}", message),
            AssistError::WithContext { error, context } => write!(f, "{} ({})", error, context),
        }
    }
}

impl std::error::Error for AssistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssistError::Network(err) => Some(err),
            AssistError::Stream(err) => Some(err),
            AssistError::Conversation(err) => Some(err),
            AssistError::SessionInFlight | AssistError::Configuration { .. } => None,
            AssistError::WithContext { error, .. } => error.source(),
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<NetworkError> for AssistError {
    fn from(err: NetworkError) -> Self {
        AssistError::Network(err)
    }
}

impl From<StreamError> for AssistError {
    fn from(err: StreamError) -> Self {
        AssistError::Stream(err)
    }
}

impl From<ConversationError> for AssistError {
    fn from(err: ConversationError) -> Self {
        AssistError::Conversation(err)
    }
}

impl From<reqwest::Error> for AssistError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        AssistError::Network(super::network::classify_reqwest_error(&err, &url))
    }
}
