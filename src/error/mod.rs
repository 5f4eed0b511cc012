//! Unified error handling for the assistant chat client.
//!
//! - **Error Categories**: High-level classification for handling decisions
//! - **Domain-specific Errors**: Network (transport) and Stream (mid-session) errors
//! - **Unified Error Type**: `AssistError` consolidates all error types
//! - **Error Context**: Debugging information attached to errors
//! - **Result Type Alias**: `AssistResult<T>` for consistent return types
//!
//! Only transport failures and explicit server error payloads become errors.
//! Framing anomalies are absorbed by the decoder and never reach this module.
//!
//! | Category | Description | Resend helps |
//! |----------|-------------|--------------|
//! | Network | Connection, timeout, dropped stream | Yes |
//! | Auth | Rejected credential | No |
//! | Server | 5xx, error payload, empty body | Yes |
//! | Client | Contract violations | No |
//! | User | Busy session, cancellation | No |
//! | Configuration | Bad endpoint | No |

mod assist_error;
mod category;
mod context;
mod network;
mod result;
mod stream;

pub use assist_error::AssistError;
pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use network::{classify_reqwest_error, NetworkError};
pub use result::{AssistResult, ResultExt};
pub use stream::StreamError;
