//! Transaction building, signing, and receipt monitoring.
//!
//! # Responsibilities
//! - Build legacy transactions priced by a [`GasPolicy`]
//! - Sign locally and broadcast with `eth_sendRawTransaction`
//! - Wait, bounded, for the transaction to be mined
//! - Recover the revert reason of failed executions

use std::time::Instant;

use alloy::eips::eip2718::Encodable2718;
use alloy::eips::BlockId;
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::sol_types::decode_revert_reason;
use alloy::transports::TransportError;
use tokio::time::{interval, timeout};

use crate::blockchain::client::{rpc_call, ClientOptions};
use crate::blockchain::gas::{GasPolicy, DEPLOY_OPERATION};
use crate::blockchain::receipt::EthTransactionReceipt;
use crate::blockchain::types::{ChainId, ConnectorError, ConnectorResult};
use crate::blockchain::wallet::Credentials;
use crate::observability::metrics;

/// Signs and submits transactions for one set of credentials on one chain.
///
/// This is the collaborator contract bindings use to deploy and invoke
/// contracts; it never encodes ABI itself.
pub struct TransactionManager {
    provider: DynProvider,
    credentials: Credentials,
    chain_id: ChainId,
    options: ClientOptions,
}

impl TransactionManager {
    pub fn new(
        provider: DynProvider,
        credentials: Credentials,
        chain_id: ChainId,
        options: ClientOptions,
    ) -> Self {
        Self {
            provider,
            credentials,
            chain_id,
            options,
        }
    }

    /// Address transactions are sent from.
    pub fn address(&self) -> Address {
        self.credentials.address()
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Deploy a contract from its creation bytecode (constructor args appended).
    pub async fn deploy(
        &self,
        bytecode: Bytes,
        gas: &GasPolicy,
    ) -> ConnectorResult<EthTransactionReceipt> {
        let (gas_price, gas_limit) = resolve_gas(gas, DEPLOY_OPERATION)?;
        let receipt = self
            .send(None, U256::ZERO, bytecode, gas_price, gas_limit)
            .await?;
        if receipt.contract_address().is_none() {
            return Err(ConnectorError::Transaction {
                message: "deployment receipt carries no contract address".to_string(),
                receipt: Some(Box::new(receipt)),
            });
        }
        Ok(receipt)
    }

    /// Invoke a state-changing contract function.
    ///
    /// `function` selects the gas policy entry; `calldata` is the already
    /// encoded call.
    pub async fn execute(
        &self,
        to: Address,
        function: &str,
        calldata: Bytes,
        value: U256,
        gas: &GasPolicy,
    ) -> ConnectorResult<EthTransactionReceipt> {
        let (gas_price, gas_limit) = resolve_gas(gas, function)?;
        self.send(Some(to), value, calldata, gas_price, gas_limit)
            .await
    }

    /// Read-only `eth_call` against the latest block.
    pub async fn call(&self, to: Address, calldata: Bytes) -> ConnectorResult<Bytes> {
        let request = TransactionRequest::default()
            .with_from(self.address())
            .with_to(to)
            .with_input(calldata);
        rpc_call("eth_call", self.options.rpc_timeout, self.provider.call(request)).await
    }

    /// Build, sign and broadcast a transaction, then wait for its receipt.
    ///
    /// `to == None` creates a contract from `input`.
    pub async fn send(
        &self,
        to: Option<Address>,
        value: U256,
        input: Bytes,
        gas_price: u128,
        gas_limit: u64,
    ) -> ConnectorResult<EthTransactionReceipt> {
        let kind = match to {
            None => "deploy",
            Some(_) if input.is_empty() => "transfer",
            Some(_) => "call",
        };
        let result = self.send_inner(to, value, input, gas_price, gas_limit).await;
        metrics::record_transaction(kind, result.is_ok());
        result
    }

    async fn send_inner(
        &self,
        to: Option<Address>,
        value: U256,
        input: Bytes,
        gas_price: u128,
        gas_limit: u64,
    ) -> ConnectorResult<EthTransactionReceipt> {
        let from = self.address();
        let nonce = rpc_call(
            "eth_getTransactionCount",
            self.options.rpc_timeout,
            self.provider.get_transaction_count(from).pending(),
        )
        .await?;

        let base = TransactionRequest::default()
            .with_from(from)
            .with_value(value)
            .with_gas_limit(gas_limit);
        let base = match to {
            Some(to) => base.with_to(to).with_input(input),
            None => base.with_deploy_code(input),
        };

        let tx = base
            .clone()
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_chain_id(self.chain_id.0);

        let envelope = <TransactionRequest as TransactionBuilder<Ethereum>>::build(
            tx,
            &self.credentials.wallet(),
        )
        .await
        .map_err(|e| ConnectorError::transaction(format!("Cannot sign transaction: {}", e)))?;
        let raw = envelope.encoded_2718();

        let pending = match timeout(
            self.options.rpc_timeout,
            self.provider.send_raw_transaction(&raw),
        )
        .await
        {
            Ok(Ok(pending)) => {
                metrics::record_rpc("eth_sendRawTransaction", true);
                pending
            }
            Ok(Err(e)) => {
                metrics::record_rpc("eth_sendRawTransaction", false);
                tracing::warn!(from = %from, nonce = nonce, error = %e, "Transaction rejected");
                return Err(submission_error(e));
            }
            Err(_) => {
                metrics::record_rpc("eth_sendRawTransaction", false);
                return Err(ConnectorError::Connection(format!(
                    "RPC timeout after {:?}",
                    self.options.rpc_timeout
                )));
            }
        };
        let tx_hash = *pending.tx_hash();

        tracing::info!(
            tx_hash = %tx_hash,
            from = %from,
            nonce = nonce,
            chain_id = self.chain_id.0,
            "Transaction submitted"
        );

        let raw_receipt = self.wait_for_receipt(tx_hash).await?;
        let receipt = EthTransactionReceipt::from_rpc(&raw_receipt);

        if !receipt.status() {
            let reason = self.revert_reason(base, raw_receipt.block_number).await;
            let message = match &reason {
                Some(reason) => format!("Transaction {} reverted: {}", tx_hash, reason),
                None => format!("Transaction {} reverted", tx_hash),
            };
            tracing::warn!(tx_hash = %tx_hash, reason = ?reason, "Transaction reverted");
            return Err(ConnectorError::Transaction {
                message,
                receipt: Some(Box::new(receipt.with_revert_reason(reason))),
            });
        }

        tracing::info!(
            tx_hash = %tx_hash,
            block_number = ?receipt.block_number(),
            gas_used = receipt.gas_used(),
            "Transaction mined"
        );
        Ok(receipt)
    }

    /// Poll for the receipt of `tx_hash` until it is mined or the receipt
    /// timeout elapses. Every failure names `tx_hash`, since the transaction
    /// may already be in the node's pool.
    pub async fn wait_for_receipt(&self, tx_hash: TxHash) -> ConnectorResult<TransactionReceipt> {
        let started = Instant::now();
        let deadline = self.options.receipt_timeout;

        let result = timeout(deadline, async {
            let mut ticker = interval(self.options.receipt_poll_interval);

            loop {
                ticker.tick().await;

                match rpc_call(
                    "eth_getTransactionReceipt",
                    self.options.rpc_timeout,
                    self.provider.get_transaction_receipt(tx_hash),
                )
                .await
                {
                    Ok(Some(receipt)) => return Ok(receipt),
                    Ok(None) => tracing::debug!(tx_hash = %tx_hash, "Transaction pending"),
                    Err(e) => {
                        return Err(ConnectorError::transaction(format!(
                            "Transaction {} submitted but receipt polling failed: {}",
                            tx_hash, e
                        )))
                    }
                }
            }
        })
        .await;

        metrics::record_receipt_wait(started.elapsed());

        match result {
            Ok(receipt) => receipt,
            Err(_) => Err(ConnectorError::transaction(format!(
                "Transaction {} not mined within {:?}",
                tx_hash, deadline
            ))),
        }
    }

    /// Replay a reverted transaction as `eth_call` at its block to recover the
    /// `Error(string)` reason.
    async fn revert_reason(&self, request: TransactionRequest, block: Option<u64>) -> Option<String> {
        let block = block.map(BlockId::number).unwrap_or_else(BlockId::latest);
        let replay = self.provider.call(request).block(block);

        let reason = match timeout(self.options.rpc_timeout, replay).await {
            Ok(Ok(output)) => {
                metrics::record_rpc("eth_call", true);
                if output.is_empty() {
                    None
                } else {
                    decode_revert_reason(&output)
                }
            }
            Ok(Err(e)) => {
                metrics::record_rpc("eth_call", false);
                e.as_error_resp().and_then(|payload| {
                    payload
                        .as_revert_data()
                        .filter(|data| !data.is_empty())
                        .and_then(|data| decode_revert_reason(&data))
                        .or_else(|| Some(payload.message.to_string()))
                })
            }
            Err(_) => {
                metrics::record_rpc("eth_call", false);
                None
            }
        };
        reason.filter(|reason| !reason.trim().is_empty())
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

/// Price and limit for `operation`, narrowed to what a transaction carries.
pub(crate) fn resolve_gas(gas: &GasPolicy, operation: &str) -> ConnectorResult<(u128, u64)> {
    let price = gas.price(Some(operation));
    let limit = gas.limit(Some(operation));
    let price = u128::try_from(price).map_err(|_| {
        ConnectorError::InvalidArgument(format!("gas price {} for '{}' exceeds u128", price, operation))
    })?;
    let limit = u64::try_from(limit).map_err(|_| {
        ConnectorError::InvalidArgument(format!("gas limit {} for '{}' exceeds u64", limit, operation))
    })?;
    Ok((price, limit))
}

/// Node-side rejections are transaction failures; anything else is transport.
fn submission_error(e: TransportError) -> ConnectorError {
    match e.as_error_resp() {
        Some(payload) => ConnectorError::transaction(payload.message.to_string()),
        None => ConnectorError::Connection(e.to_string()),
    }
}
