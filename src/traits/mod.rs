//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - Streaming HTTP POST
//! - [`EntitlementProvider`] - Per-send streaming entitlement lookup

pub mod entitlement;
pub mod http;

pub use entitlement::{Entitlement, EntitlementError, EntitlementProvider, Tier};
pub use http::{ByteStream, Headers, HttpClient, HttpError, StreamResponse};
