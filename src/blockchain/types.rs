//! Chain-specific types and error definitions.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::receipt::EthTransactionReceipt;

/// Transport protocols a node endpoint can be reached over.
pub const SUPPORTED_PROTOCOLS: [&str; 4] = ["http", "https", "ws", "wss"];

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network location of a JSON-RPC node.
///
/// Two endpoints are the same node when host and port match; the protocol is
/// not part of the identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainEndpoint {
    /// Transport protocol: `http`, `https`, `ws` or `wss`.
    pub protocol: String,
    /// Node host name or IP.
    pub host: String,
    /// Node port, kept as text the way it is persisted.
    pub port: String,
}

impl BlockchainEndpoint {
    pub fn new(
        protocol: impl Into<String>,
        host: impl Into<String>,
        port: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
            port: port.into(),
        }
    }

    /// Check that every field is present and the protocol is one we can dial.
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.host.trim().is_empty() {
            return Err(ConnectorError::InvalidArgument(
                "endpoint host cannot be empty".to_string(),
            ));
        }
        if self.port.trim().is_empty() {
            return Err(ConnectorError::InvalidArgument(
                "endpoint port cannot be empty".to_string(),
            ));
        }
        if !SUPPORTED_PROTOCOLS.contains(&self.protocol.as_str()) {
            return Err(ConnectorError::InvalidArgument(format!(
                "unsupported endpoint protocol '{}'",
                self.protocol
            )));
        }
        Ok(())
    }

    /// `protocol://host:port`
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// Whether the endpoint is dialed over a WebSocket.
    pub fn is_websocket(&self) -> bool {
        matches!(self.protocol.as_str(), "ws" | "wss")
    }
}

impl PartialEq for BlockchainEndpoint {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host && self.port == other.port
    }
}

impl Eq for BlockchainEndpoint {}

impl Hash for BlockchainEndpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.host.hash(state);
        self.port.hash(state);
    }
}

impl fmt::Display for BlockchainEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Errors that can occur during connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Missing or malformed input, detected before any network call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation attempted in the wrong state.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Transport or I/O failure talking to the node.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The node accepted the call but the transaction did not execute or mine.
    #[error("Transaction error: {message}")]
    Transaction {
        message: String,
        /// Receipt of the mined transaction, when there is one (reverts).
        receipt: Option<Box<EthTransactionReceipt>>,
    },

    /// Keystore/passphrase mismatch or malformed private key.
    #[error("Credential error: {0}")]
    Credential(String),
}

impl ConnectorError {
    /// Transaction failure without a mined receipt.
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction {
            message: message.into(),
            receipt: None,
        }
    }

    /// Receipt attached to a failed transaction, if it was mined.
    pub fn receipt(&self) -> Option<&EthTransactionReceipt> {
        match self {
            Self::Transaction { receipt, .. } => receipt.as_deref(),
            _ => None,
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
