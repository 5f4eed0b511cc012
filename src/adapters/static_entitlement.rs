//! Fixed-tier entitlement provider.
//!
//! Used by the command-line client, where the tier comes from configuration
//! rather than a billing backend.

use async_trait::async_trait;

use crate::traits::{Entitlement, EntitlementError, EntitlementProvider, Tier};

/// Entitlement provider that answers every token with the same tier.
///
/// An empty token is rejected as an unknown caller.
#[derive(Debug, Clone, Copy)]
pub struct StaticEntitlement {
    tier: Tier,
}

impl StaticEntitlement {
    pub fn new(tier: Tier) -> Self {
        Self { tier }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }
}

impl Default for StaticEntitlement {
    fn default() -> Self {
        Self::new(Tier::Free)
    }
}

#[async_trait]
impl EntitlementProvider for StaticEntitlement {
    async fn check(&self, auth_token: &str) -> Result<Entitlement, EntitlementError> {
        if auth_token.trim().is_empty() {
            return Err(EntitlementError::UnknownCaller);
        }
        Ok(Entitlement::new(self.tier))
    }
}
