//! Blockchain RPC client bound to a single node.
//!
//! # Responsibilities
//! - Hold the transport for one endpoint for the client's whole lifetime
//! - Hold the signing credentials once set
//! - Query chain state (accounts, balances, chain id, block number)
//! - Transfer ether and hand contract bindings their collaborators
//!
//! Every RPC is bounded by [`ClientOptions::rpc_timeout`]; nothing is retried.

use std::collections::HashMap;
use std::future::IntoFuture;
use std::time::Duration;

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::transports::TransportResult;
use tokio::time::timeout;

use crate::blockchain::gas::GasPolicy;
use crate::blockchain::receipt::EthTransactionReceipt;
use crate::blockchain::transaction::TransactionManager;
use crate::blockchain::types::{BlockchainEndpoint, ChainId, ConnectorError, ConnectorResult};
use crate::blockchain::wallet::Credentials;
use crate::observability::metrics;

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Timeouts and chain settings shared by every client a factory builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Deadline for a single RPC round trip.
    pub rpc_timeout: Duration,
    /// Delay between receipt polls while waiting for inclusion.
    pub receipt_poll_interval: Duration,
    /// Deadline for a submitted transaction to be mined.
    pub receipt_timeout: Duration,
    /// Fixed chain id; queried from the node when absent.
    pub chain_id: Option<ChainId>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            rpc_timeout: Duration::from_secs(10),
            receipt_poll_interval: Duration::from_secs(1),
            receipt_timeout: Duration::from_secs(300),
            chain_id: None,
        }
    }
}

/// Run one RPC call under `limit`, mapping transport failures and timeouts to
/// [`ConnectorError::Connection`].
pub(crate) async fn rpc_call<T, F>(method: &'static str, limit: Duration, call: F) -> ConnectorResult<T>
where
    F: IntoFuture<Output = TransportResult<T>>,
{
    match timeout(limit, call).await {
        Ok(Ok(result)) => {
            metrics::record_rpc(method, true);
            Ok(result)
        }
        Ok(Err(e)) => {
            metrics::record_rpc(method, false);
            tracing::warn!(method = method, error = %e, "RPC error");
            Err(ConnectorError::Connection(e.to_string()))
        }
        Err(_) => {
            metrics::record_rpc(method, false);
            tracing::warn!(method = method, "RPC timeout");
            Err(ConnectorError::Connection(format!("RPC timeout after {:?}", limit)))
        }
    }
}

/// Connector bound to one JSON-RPC endpoint.
pub struct BlockchainClient {
    endpoint: BlockchainEndpoint,
    provider: DynProvider,
    credentials: Option<Credentials>,
    options: ClientOptions,
}

impl BlockchainClient {
    /// Bind a client to an already connected provider.
    pub fn new(endpoint: BlockchainEndpoint, provider: DynProvider, options: ClientOptions) -> Self {
        Self {
            endpoint,
            provider,
            credentials: None,
            options,
        }
    }

    /// Install credentials from a hex private key, replacing any previous ones.
    ///
    /// On failure the previous credentials stay in place.
    pub fn set_credentials(&mut self, private_key_hex: &str) -> ConnectorResult<Address> {
        if private_key_hex.trim().is_empty() {
            return Err(ConnectorError::InvalidArgument(
                "private key cannot be empty".to_string(),
            ));
        }
        let credentials = Credentials::from_private_key(private_key_hex)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to set credentials"))?;
        Ok(self.install(credentials))
    }

    /// Install credentials decrypted from a JSON keystore, replacing any
    /// previous ones.
    ///
    /// On failure the previous credentials stay in place.
    pub fn set_credentials_from_keystore(
        &mut self,
        keystore_path: &str,
        passphrase: &str,
    ) -> ConnectorResult<Address> {
        if keystore_path.trim().is_empty() || passphrase.is_empty() {
            return Err(ConnectorError::InvalidArgument(
                "keystore path and passphrase cannot be empty".to_string(),
            ));
        }
        let credentials = Credentials::from_keystore(keystore_path, passphrase)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to set credentials"))?;
        Ok(self.install(credentials))
    }

    fn install(&mut self, credentials: Credentials) -> Address {
        let address = credentials.address();
        self.credentials = Some(credentials);
        tracing::info!(address = %address, endpoint = %self.endpoint, "Credentials set");
        address
    }

    /// Whether transactions can be signed.
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Address of the installed credentials.
    pub fn address(&self) -> Option<Address> {
        self.credentials.as_ref().map(Credentials::address)
    }

    /// Accounts managed by the node.
    pub async fn list_accounts(&self) -> ConnectorResult<Vec<Address>> {
        rpc_call("eth_accounts", self.options.rpc_timeout, self.provider.get_accounts()).await
    }

    /// Balance of `address` at the latest block, in wei.
    pub async fn get_balance_of(&self, address: &str) -> ConnectorResult<U256> {
        let address = parse_address(address)?;
        rpc_call("eth_getBalance", self.options.rpc_timeout, self.provider.get_balance(address)).await
    }

    /// Send `amount` ether (decimal string) to `destination` and wait for the
    /// transfer to be mined.
    pub async fn transfer_ether(
        &self,
        destination: &str,
        amount: &str,
    ) -> ConnectorResult<EthTransactionReceipt> {
        let credentials = self.require_credentials()?;
        let to = parse_address(destination)?;
        let value = parse_amount(amount)?;

        let chain_id = self.chain_id().await?;
        let gas_price = rpc_call("eth_gasPrice", self.options.rpc_timeout, self.provider.get_gas_price()).await?;

        tracing::info!(
            from = %credentials.address(),
            to = %to,
            value_wei = %value,
            "Transferring ether"
        );

        TransactionManager::new(
            self.provider.clone(),
            credentials.clone(),
            chain_id,
            self.options.clone(),
        )
        .send(Some(to), value, Bytes::new(), gas_price, TRANSFER_GAS_LIMIT)
        .await
    }

    /// Transaction manager for contract bindings, signing with this client's
    /// credentials on `chain_id`.
    pub fn transaction_manager(&self, chain_id: impl Into<ChainId>) -> ConnectorResult<TransactionManager> {
        let credentials = self.require_credentials()?;
        Ok(TransactionManager::new(
            self.provider.clone(),
            credentials.clone(),
            chain_id.into(),
            self.options.clone(),
        ))
    }

    /// Gas policy for contract bindings. Absent override maps are empty.
    pub fn create_gas_policy(
        &self,
        default_price: U256,
        default_limit: U256,
        price_overrides: Option<HashMap<String, U256>>,
        limit_overrides: Option<HashMap<String, U256>>,
    ) -> GasPolicy {
        GasPolicy::from_parts(default_price, default_limit, price_overrides, limit_overrides)
    }

    /// Chain id from the options, or from the node.
    pub async fn chain_id(&self) -> ConnectorResult<ChainId> {
        if let Some(chain_id) = self.options.chain_id {
            return Ok(chain_id);
        }
        rpc_call("eth_chainId", self.options.rpc_timeout, self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    /// Verify the node serves the configured chain id.
    pub async fn verify_chain_id(&self) -> ConnectorResult<()> {
        let Some(expected) = self.options.chain_id else {
            return Ok(());
        };
        let actual = rpc_call("eth_chainId", self.options.rpc_timeout, self.provider.get_chain_id()).await?;
        if actual != expected.0 {
            return Err(ConnectorError::PreconditionFailed(format!(
                "Chain ID mismatch: expected {}, got {}",
                expected, actual
            )));
        }
        Ok(())
    }

    /// Get the latest block number.
    pub async fn block_number(&self) -> ConnectorResult<u64> {
        rpc_call("eth_blockNumber", self.options.rpc_timeout, self.provider.get_block_number()).await
    }

    /// Underlying transport handle.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn endpoint(&self) -> &BlockchainEndpoint {
        &self.endpoint
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn require_credentials(&self) -> ConnectorResult<&Credentials> {
        self.credentials.as_ref().ok_or_else(|| {
            ConnectorError::PreconditionFailed("credentials are not set".to_string())
        })
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("endpoint", &self.endpoint.url())
            .field("address", &self.address())
            .field("rpc_timeout", &self.options.rpc_timeout)
            .finish()
    }
}

/// Parse a hex address, rejecting empty or malformed input.
pub fn parse_address(address: &str) -> ConnectorResult<Address> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ConnectorError::InvalidArgument(
            "address cannot be empty".to_string(),
        ));
    }
    address
        .parse()
        .map_err(|e| ConnectorError::InvalidArgument(format!("Invalid address '{}': {}", address, e)))
}

/// Convert a decimal ether amount to wei.
pub fn parse_amount(amount: &str) -> ConnectorResult<U256> {
    let amount = amount.trim();
    if amount.is_empty() || amount.starts_with('-') {
        return Err(ConnectorError::InvalidArgument(format!(
            "Invalid ether amount '{}'",
            amount
        )));
    }
    parse_ether(amount)
        .map_err(|e| ConnectorError::InvalidArgument(format!("Invalid ether amount '{}': {}", amount, e)))
}
