//! Shared utilities for integration tests.

use std::time::Duration;

use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::mock::Asserter;
use serde_json::json;

use eth_connector::blockchain::types::ChainId;
use eth_connector::{BlockchainClient, BlockchainEndpoint, ClientOptions};

/// Anvil/Hardhat first account.
pub const PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const SENDER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
pub const TX_HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";
pub const BLOCK_HASH: &str = "0x1d59ff54b1eb26b013ce3cb5fc9dab3705b415a67127a003c3e61eb445bb8df2";

/// Options with short polls so receipt waits finish quickly.
pub fn fast_options() -> ClientOptions {
    ClientOptions {
        rpc_timeout: Duration::from_secs(5),
        receipt_poll_interval: Duration::from_millis(10),
        receipt_timeout: Duration::from_secs(5),
        chain_id: Some(ChainId(1337)),
    }
}

/// A client with credentials over alloy's mock transport. Responses are
/// served from the returned asserter in push order.
pub fn mocked_client(options: ClientOptions) -> (BlockchainClient, Asserter) {
    let asserter = Asserter::new();
    let provider = ProviderBuilder::new()
        .connect_mocked_client(asserter.clone())
        .erased();
    let mut client = BlockchainClient::new(
        BlockchainEndpoint::new("http", "localhost", "7547"),
        provider,
        options,
    );
    client.set_credentials(PRIVATE_KEY).unwrap();
    (client, asserter)
}

/// A mined receipt as the node returns it.
pub fn receipt_json(status: bool, to: Option<&str>, contract_address: Option<&str>) -> serde_json::Value {
    json!({
        "transactionHash": TX_HASH,
        "transactionIndex": "0x0",
        "blockHash": BLOCK_HASH,
        "blockNumber": "0x5",
        "from": SENDER,
        "to": to,
        "cumulativeGasUsed": "0x1a2b3",
        "gasUsed": "0x1a2b3",
        "effectiveGasPrice": "0x4a817c800",
        "contractAddress": contract_address,
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "type": "0x0",
        "status": if status { "0x1" } else { "0x0" },
    })
}
