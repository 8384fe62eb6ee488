//! Gas pricing policy for contract operations.
//!
//! A [`GasPolicy`] resolves the gas price and gas limit to use for a named
//! contract operation. Operations without an override fall back to the
//! policy defaults; looking up an unknown or absent name never fails.

use std::collections::HashMap;

use alloy::primitives::U256;

/// Operation name used to price contract deployments.
pub const DEPLOY_OPERATION: &str = "deploy";

/// Immutable price/limit table keyed by operation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPolicy {
    default_price: U256,
    default_limit: U256,
    price_overrides: HashMap<String, U256>,
    limit_overrides: HashMap<String, U256>,
}

impl GasPolicy {
    /// Policy with defaults only.
    pub fn new(default_price: U256, default_limit: U256) -> Self {
        Self {
            default_price,
            default_limit,
            price_overrides: HashMap::new(),
            limit_overrides: HashMap::new(),
        }
    }

    /// Build a policy from defaults and optional override maps.
    ///
    /// Absent maps are treated as empty.
    pub fn from_parts(
        default_price: U256,
        default_limit: U256,
        price_overrides: Option<HashMap<String, U256>>,
        limit_overrides: Option<HashMap<String, U256>>,
    ) -> Self {
        Self {
            default_price,
            default_limit,
            price_overrides: price_overrides.unwrap_or_default(),
            limit_overrides: limit_overrides.unwrap_or_default(),
        }
    }

    /// Add a price override for `operation`.
    pub fn with_price_override(mut self, operation: impl Into<String>, price: U256) -> Self {
        self.price_overrides.insert(operation.into(), price);
        self
    }

    /// Add a limit override for `operation`.
    pub fn with_limit_override(mut self, operation: impl Into<String>, limit: U256) -> Self {
        self.limit_overrides.insert(operation.into(), limit);
        self
    }

    /// Gas price for `operation`, or the default price.
    pub fn price(&self, operation: Option<&str>) -> U256 {
        operation
            .and_then(|name| self.price_overrides.get(name))
            .copied()
            .unwrap_or(self.default_price)
    }

    /// Gas limit for `operation`, or the default limit.
    pub fn limit(&self, operation: Option<&str>) -> U256 {
        operation
            .and_then(|name| self.limit_overrides.get(name))
            .copied()
            .unwrap_or(self.default_limit)
    }

    pub fn default_price(&self) -> U256 {
        self.default_price
    }

    pub fn default_limit(&self) -> U256 {
        self.default_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const GAS_PRICE: u64 = 20_000_000_000;
    const GAS_LIMIT: u64 = 6_721_975;

    fn notarize_policy() -> GasPolicy {
        GasPolicy::new(U256::from(GAS_PRICE), U256::from(GAS_LIMIT))
            .with_price_override("notarizeDocument", U256::from(10))
            .with_limit_override("notarizeDocument", U256::from(10_000))
    }

    #[test]
    fn test_override_wins_for_known_operation() {
        let policy = notarize_policy();
        assert_eq!(policy.price(Some("notarizeDocument")), U256::from(10));
        assert_eq!(policy.limit(Some("notarizeDocument")), U256::from(10_000));
    }

    #[test]
    fn test_unknown_operation_falls_back_to_default() {
        let policy = notarize_policy();
        assert_eq!(policy.price(Some("unknownOp")), U256::from(GAS_PRICE));
        assert_eq!(policy.limit(Some("unknownOp")), U256::from(GAS_LIMIT));
    }

    #[test]
    fn test_absent_operation_falls_back_to_default() {
        let policy = notarize_policy();
        assert_eq!(policy.price(None), policy.default_price());
        assert_eq!(policy.limit(None), policy.default_limit());
    }

    #[test]
    fn test_absent_override_maps_are_empty() {
        let policy =
            GasPolicy::from_parts(U256::from(GAS_PRICE), U256::from(GAS_LIMIT), None, None);
        assert_eq!(policy.price(Some("notarizeDocument")), U256::from(GAS_PRICE));
        assert_eq!(policy.limit(Some(DEPLOY_OPERATION)), U256::from(GAS_LIMIT));
    }

    #[test]
    fn test_price_and_limit_overrides_are_independent() {
        let mut prices = HashMap::new();
        prices.insert("store".to_string(), U256::from(1));
        let policy = GasPolicy::from_parts(U256::from(2), U256::from(3), Some(prices), None);

        assert_eq!(policy.price(Some("store")), U256::from(1));
        assert_eq!(policy.limit(Some("store")), U256::from(3));
    }

    #[test]
    fn test_shared_across_threads() {
        let policy = Arc::new(notarize_policy());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let policy = policy.clone();
                std::thread::spawn(move || policy.price(Some("notarizeDocument")))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), U256::from(10));
        }
    }
}
