//! Result type alias for assistant operations.

use super::assist_error::AssistError;
use super::context::ErrorContext;

/// Type alias for Results using AssistError.
pub type AssistResult<T> = Result<T, AssistError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use wellchat::error::{ErrorContext, ResultExt};
    ///
    /// let stream = transport.open(&history, token).await
    ///     .context(ErrorContext::new("open_stream").with_session_id(&id))?;
    /// ```
    fn context(self, ctx: ErrorContext) -> AssistResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> AssistResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AssistError>,
{
    fn context(self, ctx: ErrorContext) -> AssistResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> AssistResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
