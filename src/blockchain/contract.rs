//! Deployed contract descriptors.
//!
//! The connector does not interpret ABI. It only records where a contract
//! lives and the receipt that created it, for a storage layer to persist.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::blockchain::receipt::EthTransactionReceipt;
use crate::blockchain::types::{BlockchainEndpoint, ConnectorError, ConnectorResult};

/// A deployed contract as handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartContractDescriptor {
    /// Name of the binding type that deployed the contract.
    pub implementation_name: String,
    /// Caller-chosen contract name.
    pub name: String,
    /// On-chain address.
    pub address: Address,
    /// JSON of the deployment receipt.
    pub deployment_receipt: String,
    /// Node the contract was deployed through.
    pub endpoint: BlockchainEndpoint,
}

impl SmartContractDescriptor {
    /// Describe a contract from its deployment receipt.
    pub fn from_deployment(
        implementation_name: impl Into<String>,
        name: impl Into<String>,
        receipt: &EthTransactionReceipt,
        endpoint: BlockchainEndpoint,
    ) -> ConnectorResult<Self> {
        let address = receipt.contract_address().ok_or_else(|| {
            ConnectorError::InvalidArgument(format!(
                "receipt of {} has no contract address",
                receipt.transaction_hash()
            ))
        })?;
        let deployment_receipt = serde_json::to_string(receipt).map_err(|e| {
            ConnectorError::InvalidArgument(format!("cannot serialize deployment receipt: {}", e))
        })?;

        Ok(Self {
            implementation_name: implementation_name.into(),
            name: name.into(),
            address,
            deployment_receipt,
            endpoint,
        })
    }

    /// Decode the stored deployment receipt.
    pub fn receipt(&self) -> ConnectorResult<EthTransactionReceipt> {
        serde_json::from_str(&self.deployment_receipt).map_err(|e| {
            ConnectorError::InvalidArgument(format!("malformed deployment receipt: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::receipt::tests::rpc_receipt_json;
    use alloy::rpc::types::TransactionReceipt;

    const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

    fn receipt(contract: Option<&str>) -> EthTransactionReceipt {
        let raw: TransactionReceipt = serde_json::from_value(rpc_receipt_json(true, contract)).unwrap();
        EthTransactionReceipt::from_rpc(&raw)
    }

    #[test]
    fn test_descriptor_from_deployment() {
        let endpoint = BlockchainEndpoint::new("http", "localhost", "7547");
        let deployment = receipt(Some(CONTRACT));
        let descriptor = SmartContractDescriptor::from_deployment(
            "DataRegistry",
            "MY_DATA_CERTIFICATION",
            &deployment,
            endpoint.clone(),
        )
        .unwrap();

        assert_eq!(descriptor.address, CONTRACT.parse::<Address>().unwrap());
        assert_eq!(descriptor.endpoint, endpoint);
        assert_eq!(descriptor.receipt().unwrap(), deployment);
    }

    #[test]
    fn test_transfer_receipt_is_not_a_deployment() {
        let err = SmartContractDescriptor::from_deployment(
            "DataRegistry",
            "MY_DATA_CERTIFICATION",
            &receipt(None),
            BlockchainEndpoint::new("http", "localhost", "7547"),
        )
        .unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidArgument(_)));
    }
}
