//! Client construction for a node endpoint.

use alloy::providers::{DynProvider, Provider, ProviderBuilder, WsConnect};

use crate::blockchain::client::{BlockchainClient, ClientOptions};
use crate::blockchain::types::{BlockchainEndpoint, ConnectorError, ConnectorResult};

/// Builds [`BlockchainClient`]s.
///
/// `configure` + `build` is single-shot: each build consumes the configured
/// endpoint. [`connect`](Self::connect) is the stateless form.
#[derive(Debug, Default)]
pub struct BlockchainClientFactory {
    endpoint: Option<BlockchainEndpoint>,
    options: ClientOptions,
}

impl BlockchainClientFactory {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            endpoint: None,
            options,
        }
    }

    /// Store the endpoint the next [`build`](Self::build) connects to.
    pub fn configure(&mut self, endpoint: BlockchainEndpoint) -> ConnectorResult<&mut Self> {
        endpoint.validate()?;
        self.endpoint = Some(endpoint);
        Ok(self)
    }

    /// Whether an endpoint is waiting to be built.
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Drop the configured endpoint.
    pub fn reset(&mut self) {
        self.endpoint = None;
    }

    /// Connect to the configured endpoint and clear the configuration.
    pub async fn build(&mut self) -> ConnectorResult<BlockchainClient> {
        let endpoint = self.endpoint.take().ok_or_else(|| {
            ConnectorError::PreconditionFailed(
                "no endpoint configured; call configure() before build()".to_string(),
            )
        })?;
        self.connect(endpoint).await
    }

    /// Connect a new client to `endpoint`.
    pub async fn connect(&self, endpoint: BlockchainEndpoint) -> ConnectorResult<BlockchainClient> {
        endpoint.validate()?;
        let url = endpoint.url();

        let provider = if endpoint.is_websocket() {
            ProviderBuilder::new()
                .connect_ws(WsConnect::new(url.clone()))
                .await
                .map_err(|e| ConnectorError::Connection(format!("Cannot connect to '{}': {}", url, e)))?
                .erased()
        } else {
            let rpc_url: url::Url = url
                .parse()
                .map_err(|e| ConnectorError::InvalidArgument(format!("Invalid RPC URL '{}': {}", url, e)))?;
            ProviderBuilder::new().connect_http(rpc_url).erased()
        };

        let client = self.with_provider(endpoint, provider);

        // Verify chain ID matches configuration
        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(endpoint = %url, "Blockchain client initialized");
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = %url,
                    error = %e,
                    "Blockchain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Bind a client to a provider the caller already built.
    pub fn with_provider(&self, endpoint: BlockchainEndpoint, provider: DynProvider) -> BlockchainClient {
        BlockchainClient::new(endpoint, provider, self.options.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn local_endpoint() -> BlockchainEndpoint {
        BlockchainEndpoint::new("http", "127.0.0.1", "7547")
    }

    fn factory() -> BlockchainClientFactory {
        BlockchainClientFactory::new(ClientOptions {
            rpc_timeout: Duration::from_secs(2),
            ..ClientOptions::default()
        })
    }

    #[test]
    fn test_configure_rejects_empty_fields() {
        let mut factory = factory();
        let err = factory
            .configure(BlockchainEndpoint::new("http", "", ""))
            .unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidArgument(_)));
        assert!(!factory.is_configured());
    }

    #[tokio::test]
    async fn test_build_without_configure_fails() {
        let err = factory().build().await.unwrap_err();
        assert!(matches!(err, ConnectorError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn test_build_is_single_shot() {
        // Client creation should succeed even if no node is listening
        let mut factory = factory();
        let client = factory.configure(local_endpoint()).unwrap().build().await.unwrap();
        assert_eq!(client.endpoint(), &local_endpoint());
        assert!(!client.has_credentials());
        assert!(!factory.is_configured());

        let err = factory.build().await.unwrap_err();
        assert!(matches!(err, ConnectorError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn test_connect_is_stateless() {
        let factory = factory();
        let a = factory.connect(local_endpoint()).await.unwrap();
        let b = factory.connect(local_endpoint()).await.unwrap();
        assert_eq!(a.endpoint(), b.endpoint());
    }

    #[tokio::test]
    async fn test_with_provider_applies_options() {
        let asserter = alloy::transports::mock::Asserter::new();
        let provider = ProviderBuilder::new()
            .connect_mocked_client(asserter)
            .erased();
        let client = factory().with_provider(local_endpoint(), provider);
        assert_eq!(client.options().rpc_timeout, Duration::from_secs(2));
        assert_eq!(client.endpoint(), &local_endpoint());
    }

    #[tokio::test]
    async fn test_unreachable_websocket_is_connection_error() {
        let err = factory()
            .connect(BlockchainEndpoint::new("ws", "127.0.0.1", "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::Connection(_)));
    }
}
