//! Normalized transaction receipts.
//!
//! alloy's RPC receipt type follows the node's wire format and changes with
//! the library. [`EthTransactionReceipt`] is the stable projection handed to
//! callers: every field is copied out when the receipt arrives.

use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash, B256};
use alloy::rpc::types::TransactionReceipt;
use serde::{Deserialize, Serialize};

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthTransactionReceipt {
    transaction_hash: TxHash,
    transaction_index: Option<u64>,
    block_hash: Option<B256>,
    block_number: Option<u64>,
    cumulative_gas_used: u64,
    gas_used: u64,
    contract_address: Option<Address>,
    root: Option<B256>,
    status: bool,
    from: Address,
    to: Option<Address>,
    revert_reason: Option<String>,
    #[serde(rename = "type")]
    tx_type: u8,
    effective_gas_price: u128,
}

impl EthTransactionReceipt {
    /// Copy a node receipt into the normalized form.
    pub fn from_rpc(receipt: &TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            transaction_index: receipt.transaction_index,
            block_hash: receipt.block_hash,
            block_number: receipt.block_number,
            cumulative_gas_used: receipt.cumulative_gas_used(),
            gas_used: receipt.gas_used,
            contract_address: receipt.contract_address,
            root: receipt.state_root(),
            status: receipt.status(),
            from: receipt.from,
            to: receipt.to,
            revert_reason: None,
            tx_type: receipt.inner.tx_type() as u8,
            effective_gas_price: receipt.effective_gas_price,
        }
    }

    /// Attach the decoded reason of a reverted execution.
    pub fn with_revert_reason(mut self, reason: Option<String>) -> Self {
        self.revert_reason = reason;
        self
    }

    pub fn transaction_hash(&self) -> TxHash {
        self.transaction_hash
    }

    pub fn transaction_index(&self) -> Option<u64> {
        self.transaction_index
    }

    pub fn block_hash(&self) -> Option<B256> {
        self.block_hash
    }

    pub fn block_number(&self) -> Option<u64> {
        self.block_number
    }

    pub fn cumulative_gas_used(&self) -> u64 {
        self.cumulative_gas_used
    }

    pub fn gas_used(&self) -> u64 {
        self.gas_used
    }

    /// Address of the created contract; `None` unless this was a deployment.
    pub fn contract_address(&self) -> Option<Address> {
        self.contract_address
    }

    /// Post-transaction state root (pre-Byzantium receipts only).
    pub fn root(&self) -> Option<B256> {
        self.root
    }

    /// `true` when execution succeeded.
    pub fn status(&self) -> bool {
        self.status
    }

    pub fn from(&self) -> Address {
        self.from
    }

    pub fn to(&self) -> Option<Address> {
        self.to
    }

    /// Reason reported by a reverted execution.
    pub fn revert_reason(&self) -> Option<&str> {
        self.revert_reason.as_deref()
    }

    /// EIP-2718 transaction type.
    pub fn tx_type(&self) -> u8 {
        self.tx_type
    }

    pub fn effective_gas_price(&self) -> u128 {
        self.effective_gas_price
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) const TX_HASH: &str =
        "0x5b7a4ff1a3b4a4a0b5f2a6a0d2c07dc6e3c4b5c3f1c5fb44a9fd6ad2f9cbd0e1";
    pub(crate) const BLOCK_HASH: &str =
        "0x2c2b9b4ad3e7e0bb0c7ea3b6e0f3d1b0f8bd5b2dbdb0e1c3b5a9d3f7e1c6a4b2";
    pub(crate) const FROM: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
    pub(crate) const TO: &str = "0x70997970c51812dc3a04c355784cf10b04a7f9a3";

    /// A legacy transfer receipt as a node returns it.
    pub(crate) fn rpc_receipt_json(status: bool, contract_address: Option<&str>) -> serde_json::Value {
        json!({
            "transactionHash": TX_HASH,
            "transactionIndex": "0x0",
            "blockHash": BLOCK_HASH,
            "blockNumber": "0x2",
            "from": FROM,
            "to": if contract_address.is_some() { serde_json::Value::Null } else { json!(TO) },
            "cumulativeGasUsed": "0x5208",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x4a817c800",
            "contractAddress": contract_address,
            "logs": [],
            "logsBloom": format!("0x{}", "0".repeat(512)),
            "type": "0x0",
            "status": if status { "0x1" } else { "0x0" },
        })
    }

    fn parse(value: serde_json::Value) -> TransactionReceipt {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_transfer_receipt_normalization() {
        let raw = parse(rpc_receipt_json(true, None));
        let receipt = EthTransactionReceipt::from_rpc(&raw);

        assert_eq!(receipt.transaction_hash(), TX_HASH.parse::<TxHash>().unwrap());
        assert_eq!(receipt.transaction_index(), Some(0));
        assert_eq!(receipt.block_hash(), Some(BLOCK_HASH.parse().unwrap()));
        assert_eq!(receipt.block_number(), Some(2));
        assert_eq!(receipt.cumulative_gas_used(), 21_000);
        assert_eq!(receipt.gas_used(), 21_000);
        assert_eq!(receipt.from(), FROM.parse::<Address>().unwrap());
        assert_eq!(receipt.to(), Some(TO.parse().unwrap()));
        assert_eq!(receipt.effective_gas_price(), 20_000_000_000);
        assert_eq!(receipt.tx_type(), 0);
        assert!(receipt.status());
        assert!(receipt.contract_address().is_none());
        assert!(receipt.root().is_none());
        assert!(receipt.revert_reason().is_none());
    }

    #[test]
    fn test_deployment_receipt_carries_contract_address() {
        let contract = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
        let raw = parse(rpc_receipt_json(true, Some(contract)));
        let receipt = EthTransactionReceipt::from_rpc(&raw);

        assert_eq!(receipt.contract_address(), Some(contract.parse().unwrap()));
        assert!(receipt.to().is_none());
    }

    #[test]
    fn test_reverted_receipt_with_reason() {
        let raw = parse(rpc_receipt_json(false, None));
        let receipt = EthTransactionReceipt::from_rpc(&raw)
            .with_revert_reason(Some("document already notarized".to_string()));

        assert!(!receipt.status());
        assert_eq!(receipt.revert_reason(), Some("document already notarized"));
    }

    #[test]
    fn test_normalized_receipt_outlives_raw() {
        let receipt = {
            let raw = parse(rpc_receipt_json(true, None));
            EthTransactionReceipt::from_rpc(&raw)
        };
        let json = serde_json::to_string(&receipt).unwrap();
        assert!(json.contains("\"transactionHash\""));
        assert!(json.contains("\"type\":0"));

        let decoded: EthTransactionReceipt = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, receipt);
    }
}
