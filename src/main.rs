//! `eth-connector` command line.
//!
//! ```text
//! eth-connector [--config FILE] [--protocol P] [--host H] [--port N] <COMMAND>
//!
//!   accounts                       list node-managed accounts
//!   balance <ADDRESS>              balance in wei at the latest block
//!   transfer <TO> <AMOUNT>         send AMOUNT ether, wait for the receipt
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::json;

use eth_connector::blockchain::{BlockchainClient, BlockchainClientFactory};
use eth_connector::config::{check_config, load_config, ConnectorConfig};
use eth_connector::observability::logging;

#[derive(Parser)]
#[command(name = "eth-connector")]
#[command(about = "Ethereum JSON-RPC connector", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Endpoint protocol (http, https, ws, wss); overrides the config file.
    #[arg(long)]
    protocol: Option<String>,

    /// Endpoint host; overrides the config file.
    #[arg(long)]
    host: Option<String>,

    /// Endpoint port; overrides the config file.
    #[arg(long)]
    port: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List accounts managed by the node
    Accounts,
    /// Show the balance of an address in wei
    Balance { address: String },
    /// Transfer ether and wait for the receipt
    Transfer {
        to: String,
        /// Amount in ether, e.g. 1 or 0.25
        amount: String,
        #[command(flatten)]
        credentials: CredentialArgs,
    },
}

#[derive(Args)]
struct CredentialArgs {
    /// Hex private key of the sender.
    #[arg(long, conflicts_with = "keystore")]
    private_key: Option<String>,

    /// JSON keystore of the sender.
    #[arg(long, requires = "passphrase")]
    keystore: Option<String>,

    /// Keystore passphrase.
    #[arg(long)]
    passphrase: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ConnectorConfig::default(),
    };
    if let Some(protocol) = cli.protocol {
        config.endpoint.protocol = protocol;
    }
    if let Some(host) = cli.host {
        config.endpoint.host = host;
    }
    if let Some(port) = cli.port {
        config.endpoint.port = port;
    }
    let config = check_config(config)?;

    logging::init_logging(&config.observability.log_level);

    let endpoint = config.endpoint.to_endpoint();
    tracing::info!(endpoint = %endpoint, "eth-connector starting");

    let mut factory = BlockchainClientFactory::new(config.client.to_options());
    let mut client = factory.configure(endpoint)?.build().await?;

    match cli.command {
        Commands::Accounts => {
            let accounts = client.list_accounts().await?;
            print_json(&json!({ "accounts": accounts }))?;
        }
        Commands::Balance { address } => {
            let balance = client.get_balance_of(&address).await?;
            print_json(&json!({ "address": address, "balance_wei": balance.to_string() }))?;
        }
        Commands::Transfer {
            to,
            amount,
            credentials,
        } => {
            set_credentials(&mut client, credentials)?;
            let receipt = client.transfer_ether(&to, &amount).await?;
            print_json(&serde_json::to_value(&receipt)?)?;
        }
    }

    Ok(())
}

fn set_credentials(
    client: &mut BlockchainClient,
    args: CredentialArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    match (args.private_key, args.keystore) {
        (Some(key), _) => client.set_credentials(&key)?,
        (None, Some(keystore)) => client
            .set_credentials_from_keystore(&keystore, args.passphrase.as_deref().unwrap_or_default())?,
        (None, None) => return Err("either --private-key or --keystore is required".into()),
    };
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
