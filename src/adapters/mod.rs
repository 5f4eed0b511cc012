//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`StaticEntitlement`] - Fixed-tier entitlement provider
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Scripted streaming responses
//! - [`mock::MockEntitlement`] - Per-token entitlement answers

pub mod mock;
pub mod reqwest_http;
pub mod static_entitlement;

pub use mock::{MockEntitlement, MockHttpClient};
pub use reqwest_http::ReqwestHttpClient;
pub use static_entitlement::StaticEntitlement;
