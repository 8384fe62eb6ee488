//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use std::collections::HashMap;
use std::time::Duration;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::blockchain::client::ClientOptions;
use crate::blockchain::gas::GasPolicy;
use crate::blockchain::types::{BlockchainEndpoint, ChainId};

/// Root configuration for the connector.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Node to connect to.
    pub endpoint: EndpointConfig,

    /// Client timeouts and chain settings.
    pub client: ClientConfig,

    /// Gas defaults and per-operation overrides for contract calls.
    pub gas: GasConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub protocol: String,
    pub host: String,
    pub port: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: "8545".to_string(),
        }
    }
}

impl EndpointConfig {
    pub fn to_endpoint(&self) -> BlockchainEndpoint {
        BlockchainEndpoint::new(&self.protocol, &self.host, &self.port)
    }
}

/// Client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub receipt_poll_interval_ms: u64,

    /// Maximum time to wait for a transaction to be mined, in seconds.
    pub receipt_timeout_secs: u64,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 1337 for a local Ganache).
    /// Queried from the node when unset.
    pub chain_id: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_timeout_secs: 10,
            receipt_poll_interval_ms: 1000,
            receipt_timeout_secs: 300,
            chain_id: None,
        }
    }
}

impl ClientConfig {
    pub fn to_options(&self) -> ClientOptions {
        ClientOptions {
            rpc_timeout: Duration::from_secs(self.rpc_timeout_secs),
            receipt_poll_interval: Duration::from_millis(self.receipt_poll_interval_ms),
            receipt_timeout: Duration::from_secs(self.receipt_timeout_secs),
            chain_id: self.chain_id.map(ChainId),
        }
    }
}

/// Gas configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Default gas price in wei.
    pub price: u64,

    /// Default gas limit.
    pub limit: u64,

    /// Gas price per contract function name.
    pub function_prices: HashMap<String, u64>,

    /// Gas limit per contract function name.
    pub function_limits: HashMap<String, u64>,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            price: 20_000_000_000,
            limit: 6_721_975,
            function_prices: HashMap::new(),
            function_limits: HashMap::new(),
        }
    }
}

impl GasConfig {
    pub fn to_policy(&self) -> GasPolicy {
        let widen = |map: &HashMap<String, u64>| {
            map.iter()
                .map(|(name, value)| (name.clone(), U256::from(*value)))
                .collect::<HashMap<_, _>>()
        };
        GasPolicy::from_parts(
            U256::from(self.price),
            U256::from(self.limit),
            Some(widen(&self.function_prices)),
            Some(widen(&self.function_limits)),
        )
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
