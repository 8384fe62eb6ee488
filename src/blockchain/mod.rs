//! Blockchain connectivity and transaction execution.
//!
//! # Data Flow
//! ```text
//! BlockchainEndpoint
//!     → factory.rs (connect transport, build client)
//!     → client.rs (queries, credentials, ether transfers)
//!     → transaction.rs (build, sign, broadcast, wait for receipt)
//!     → receipt.rs (normalize node receipt)
//! ```
//!
//! # Security Constraints
//! - Key material is supplied by the caller, never read from the environment
//! - Never log private keys or passphrases
//! - All RPC calls and receipt waits have configurable timeouts
//! - No retries: every failure is reported once

pub mod client;
pub mod contract;
pub mod factory;
pub mod gas;
pub mod receipt;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{BlockchainClient, ClientOptions};
pub use contract::SmartContractDescriptor;
pub use factory::BlockchainClientFactory;
pub use gas::GasPolicy;
pub use receipt::EthTransactionReceipt;
pub use transaction::TransactionManager;
pub use types::{BlockchainEndpoint, ChainId, ConnectorError, ConnectorResult};
pub use wallet::Credentials;
