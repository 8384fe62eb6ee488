//! Signing credentials.
//!
//! # Security
//! - Key material is accepted from the caller, never read from the environment
//! - Keys and passphrases are never logged or serialized
//! - `Debug` output shows the derived address only

use std::fmt;
use std::path::Path;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{ConnectorError, ConnectorResult};

/// Signing identity used to authorize outgoing transactions.
#[derive(Clone)]
pub struct Credentials {
    signer: PrivateKeySigner,
}

impl Credentials {
    /// Create credentials from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> ConnectorResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| ConnectorError::Credential(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Credentials loaded from private key");

        Ok(Self { signer })
    }

    /// Decrypt a JSON keystore (Web3 Secret Storage) with its passphrase.
    pub fn from_keystore(path: impl AsRef<Path>, passphrase: &str) -> ConnectorResult<Self> {
        let path = path.as_ref();
        let signer = PrivateKeySigner::decrypt_keystore(path, passphrase).map_err(|e| {
            ConnectorError::Credential(format!(
                "Cannot decrypt keystore '{}': {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(address = %signer.address(), "Credentials loaded from keystore");

        Ok(Self { signer })
    }

    /// Address derived from the signing key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Wallet usable by alloy transaction builders.
    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
