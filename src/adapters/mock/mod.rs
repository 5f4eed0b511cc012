//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with scripted streaming responses
//! - [`MockEntitlement`] - Entitlement provider with per-token answers

pub mod entitlement;
pub mod http;

pub use entitlement::MockEntitlement;
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
