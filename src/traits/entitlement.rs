//! Entitlement provider trait abstraction.
//!
//! Consulted once per send, before any network request, to decide whether
//! the caller may use the streaming assistant.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Subscription tier of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Premium,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Premium => "premium",
        }
    }

    /// Parse a tier name, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Tier::Free),
            "premium" => Some(Tier::Premium),
            _ => None,
        }
    }
}

/// Result of an entitlement check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entitlement {
    pub tier: Tier,
}

impl Entitlement {
    pub fn new(tier: Tier) -> Self {
        Self { tier }
    }

    /// Whether the caller may use the streaming assistant.
    pub fn can_stream(&self) -> bool {
        self.tier == Tier::Premium
    }
}

/// Entitlement lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntitlementError {
    /// The token did not identify a caller
    #[error("unknown caller")]
    UnknownCaller,

    /// The entitlement backend could not be reached
    #[error("entitlement lookup failed: {0}")]
    Unavailable(String),
}

/// Trait for entitlement lookups.
#[async_trait]
pub trait EntitlementProvider: Send + Sync {
    /// Look up the caller's entitlement for the given auth token.
    async fn check(&self, auth_token: &str) -> Result<Entitlement, EntitlementError>;
}
