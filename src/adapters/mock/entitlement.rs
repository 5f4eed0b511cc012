//! Scriptable entitlement provider for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::traits::{Entitlement, EntitlementError, EntitlementProvider, Tier};

/// Entitlement provider with per-token answers and a call counter.
///
/// # Example
///
/// ```ignore
/// use wellchat::adapters::mock::MockEntitlement;
/// use wellchat::traits::Tier;
///
/// let entitlements = MockEntitlement::new(Tier::Free);
/// entitlements.set_tier("premium-token", Tier::Premium);
/// ```
#[derive(Debug, Clone)]
pub struct MockEntitlement {
    default: Arc<Mutex<Result<Entitlement, EntitlementError>>>,
    by_token: Arc<Mutex<HashMap<String, Result<Entitlement, EntitlementError>>>>,
    checks: Arc<Mutex<Vec<String>>>,
}

impl MockEntitlement {
    /// Answer every token with `tier` unless overridden.
    pub fn new(tier: Tier) -> Self {
        Self {
            default: Arc::new(Mutex::new(Ok(Entitlement::new(tier)))),
            by_token: Arc::new(Mutex::new(HashMap::new())),
            checks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every lookup fails with `error` unless overridden per token.
    pub fn failing(error: EntitlementError) -> Self {
        let mock = Self::new(Tier::Free);
        *mock.default.lock().unwrap() = Err(error);
        mock
    }

    pub fn set_tier(&self, token: &str, tier: Tier) {
        self.by_token
            .lock()
            .unwrap()
            .insert(token.to_string(), Ok(Entitlement::new(tier)));
    }

    pub fn set_error(&self, token: &str, error: EntitlementError) {
        self.by_token
            .lock()
            .unwrap()
            .insert(token.to_string(), Err(error));
    }

    /// Tokens checked so far, in order.
    pub fn checked_tokens(&self) -> Vec<String> {
        self.checks.lock().unwrap().clone()
    }
}

impl Default for MockEntitlement {
    fn default() -> Self {
        Self::new(Tier::Free)
    }
}

#[async_trait]
impl EntitlementProvider for MockEntitlement {
    async fn check(&self, auth_token: &str) -> Result<Entitlement, EntitlementError> {
        self.checks.lock().unwrap().push(auth_token.to_string());

        if let Some(answer) = self.by_token.lock().unwrap().get(auth_token) {
            return answer.clone();
        }
        self.default.lock().unwrap().clone()
    }
}
