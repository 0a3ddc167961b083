//! Network provider
//!
//! The signer only reads connection metadata and fee data from a provider;
//! it never signs through one.

use std::fmt;

use async_trait::async_trait;
use ethers_core::types::U256;
use ethers_providers::{Http, Middleware, Provider};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use super::types::FeeData;

/// Provider configuration
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider URL
    pub url: String,
    /// API key (if required), appended as the last path segment
    pub api_key: Option<String>,
}

impl ProviderConfig {
    /// HTTP provider configuration for `url`
    pub fn http(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
        }
    }

    /// Attach an API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The endpoint including the API key, if any
    pub(crate) fn endpoint(&self) -> String {
        match &self.api_key {
            Some(key) => format!("{}/{}", self.url.trim_end_matches('/'), key),
            None => self.url.clone(),
        }
    }
}

// do not log the api key
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// An externally supplied connection to a network.
///
/// `chain_id` and `url` return metadata that is already known; only
/// `fee_data` may talk to the node.
#[async_trait]
pub trait NetworkProvider: fmt::Debug + Send + Sync {
    /// Chain id of the connected network
    fn chain_id(&self) -> u64;

    /// RPC endpoint of the connected network, without credentials.
    ///
    /// This is the value that appears in logs.
    fn url(&self) -> &str;

    /// HTTP transport the wallet client sends requests through
    fn transport(&self) -> Result<Provider<Http>> {
        build_http_provider(&ProviderConfig::http(self.url()))
    }

    /// Current fee data
    async fn fee_data(&self) -> Result<FeeData>;
}

/// JSON-RPC network connection over HTTP
#[derive(Clone)]
pub struct JsonRpcNetwork {
    provider: Provider<Http>,
    chain_id: u64,
    url: String,
}

impl JsonRpcNetwork {
    /// Connect to the endpoint and read its chain id once
    pub async fn connect(config: &ProviderConfig) -> Result<Self> {
        let provider = build_http_provider(config)?;
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| Error::Provider(format!("Failed to read chain id from {}: {}", config.url, e)))?;
        let chain_id = chain_id_from_node(chain_id)?;

        debug!(chain_id, url = %config.url, "connected to network");

        Ok(Self {
            provider,
            chain_id,
            url: config.url.clone(),
        })
    }

    /// Build a connection for a network whose chain id is already known
    pub fn with_chain_id(config: &ProviderConfig, chain_id: u64) -> Result<Self> {
        let provider = build_http_provider(config)?;
        Ok(Self {
            provider,
            chain_id,
            url: config.url.clone(),
        })
    }

    /// The underlying ethers provider
    pub fn provider(&self) -> &Provider<Http> {
        &self.provider
    }
}

#[async_trait]
impl NetworkProvider for JsonRpcNetwork {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn transport(&self) -> Result<Provider<Http>> {
        Ok(self.provider.clone())
    }

    async fn fee_data(&self) -> Result<FeeData> {
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| Error::Provider(format!("Failed to read gas price: {}", e)))?;

        // Pre-London nodes cannot estimate EIP-1559 fees
        let (max_fee_per_gas, max_priority_fee_per_gas) =
            match self.provider.estimate_eip1559_fees(None).await {
                Ok((max_fee, max_priority_fee)) => (Some(max_fee), Some(max_priority_fee)),
                Err(e) => {
                    warn!(chain_id = self.chain_id, error = %e, "EIP-1559 fee estimation unavailable");
                    (None, None)
                }
            };

        Ok(FeeData {
            gas_price: Some(gas_price),
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }
}

// the transport holds the endpoint with its key
impl fmt::Debug for JsonRpcNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpcNetwork")
            .field("chain_id", &self.chain_id)
            .field("url", &self.url)
            .finish()
    }
}

/// Build an ethers HTTP provider from a configuration
pub(crate) fn build_http_provider(config: &ProviderConfig) -> Result<Provider<Http>> {
    Provider::<Http>::try_from(config.endpoint())
        .map_err(|e| Error::Provider(format!("Invalid provider URL {}: {}", config.url, e)))
}

/// Narrow a node-reported chain id
fn chain_id_from_node(chain_id: U256) -> Result<u64> {
    u64::try_from(chain_id)
        .map_err(|e| Error::Provider(format!("Chain id {} reported by the node is out of range: {}", chain_id, e)))
}
