//! Ethereum JSON-RPC connector library.
//!
//! Submits ether transfers and contract transactions to an Ethereum-compatible
//! node with locally held credentials and returns normalized receipts.

pub mod blockchain;
pub mod config;
pub mod observability;

pub use blockchain::{
    BlockchainClient, BlockchainClientFactory, BlockchainEndpoint, ClientOptions, ConnectorError,
    ConnectorResult, Credentials, EthTransactionReceipt, GasPolicy, SmartContractDescriptor,
    TransactionManager,
};
pub use config::ConnectorConfig;
