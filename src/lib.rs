//! wellchat - streaming client for the wellness assistant chat.
//!
//! Decodes the chat endpoint's event stream into an incrementally growing
//! conversation transcript, with entitlement-based fallback replies.

pub mod adapters;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod error;
pub mod fallback;
pub mod models;
pub mod session;
pub mod sse;
pub mod traits;
pub mod transport;
