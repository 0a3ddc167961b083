//! Signer configuration

use std::collections::HashMap;

use tracing::warn;

use crate::chain::{self, ChainDescriptor, MAINNET_CHAIN_ID};
use crate::crypto::mnemonic::MnemonicStrength;
use crate::error::{Error, Result};

/// Derivation path prefix for Ethereum accounts; the account index is appended
pub const DEFAULT_DERIVATION_PATH_PREFIX: &str = "m/44'/60'/0'/0/";

/// Environment variable prefix for per-chain RPC overrides, e.g. `EIP155_RPC_URL_84532`
pub const RPC_URL_ENV_PREFIX: &str = "EIP155_RPC_URL_";

/// Configuration used when constructing an account signer
#[derive(Debug, Clone)]
pub struct SignerConfig {
    /// Chain selected before any `connect`
    pub default_chain_id: u64,
    /// Strength of generated mnemonics
    pub strength: MnemonicStrength,
    /// Account index under `m/44'/60'/0'/0/`
    pub derivation_index: u32,
    /// Full derivation path, overrides `derivation_index` when set
    pub derivation_path: Option<String>,
    /// Optional BIP-39 password
    pub password: Option<String>,
    /// RPC endpoints to use instead of the registry defaults, keyed by chain id
    pub rpc_overrides: HashMap<u64, String>,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            default_chain_id: MAINNET_CHAIN_ID,
            strength: MnemonicStrength::Words12,
            derivation_index: 0,
            derivation_path: None,
            password: None,
            rpc_overrides: HashMap::new(),
        }
    }
}

impl SignerConfig {
    /// Build a configuration from `EIP155_*` environment variables.
    ///
    /// Values that fail to parse fall back to the defaults. RPC overrides for
    /// chains outside the registry are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let default_chain_id = std::env::var("EIP155_DEFAULT_CHAIN_ID")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.default_chain_id);

        let strength = std::env::var("EIP155_MNEMONIC_WORDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.strength);

        let derivation_index = std::env::var("EIP155_DERIVATION_INDEX")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.derivation_index);

        let derivation_path = std::env::var("EIP155_DERIVATION_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let rpc_overrides = rpc_overrides_from_vars(std::env::vars());

        Self {
            default_chain_id,
            strength,
            derivation_index,
            derivation_path,
            password: None,
            rpc_overrides,
        }
    }

    /// Set the default chain
    pub fn with_default_chain(mut self, chain_id: u64) -> Self {
        self.default_chain_id = chain_id;
        self
    }

    /// Use a custom RPC endpoint for a chain
    pub fn with_rpc_override(mut self, chain_id: u64, url: impl Into<String>) -> Self {
        self.rpc_overrides.insert(chain_id, url.into());
        self
    }

    /// The derivation path the account is derived at
    pub fn derivation_path(&self) -> String {
        match &self.derivation_path {
            Some(path) => path.clone(),
            None => format!("{}{}", DEFAULT_DERIVATION_PATH_PREFIX, self.derivation_index),
        }
    }

    /// The RPC endpoint the wallet client uses for a chain
    pub fn rpc_url_for(&self, chain: &ChainDescriptor) -> Result<String> {
        if let Some(url) = self.rpc_overrides.get(&chain.id) {
            return Ok(url.clone());
        }
        chain
            .default_rpc_url()
            .map(str::to_string)
            .ok_or_else(|| Error::Config(format!("No RPC endpoint for chain {}", chain.id)))
    }

    /// Check that the configured values are usable
    pub fn validate(&self) -> Result<()> {
        chain::lookup(self.default_chain_id)?;
        for chain_id in self.rpc_overrides.keys() {
            if !chain::is_supported(*chain_id) {
                return Err(Error::Config(format!("RPC override for unsupported chain {}", chain_id)));
            }
        }
        Ok(())
    }
}

/// Collect `EIP155_RPC_URL_<chain id>` entries for supported chains
fn rpc_overrides_from_vars(vars: impl Iterator<Item = (String, String)>) -> HashMap<u64, String> {
    vars.filter_map(|(key, value)| {
        let chain_id = key.strip_prefix(RPC_URL_ENV_PREFIX)?.parse::<u64>().ok()?;
        if !chain::is_supported(chain_id) {
            warn!(chain_id, "ignoring RPC override for unsupported chain");
            return None;
        }
        Some((chain_id, value))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SignerConfig::default();
        assert_eq!(config.default_chain_id, 1);
        assert_eq!(config.derivation_path(), "m/44'/60'/0'/0/0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derivation_path_override() {
        let mut config = SignerConfig { derivation_index: 3, ..Default::default() };
        assert_eq!(config.derivation_path(), "m/44'/60'/0'/0/3");

        config.derivation_path = Some("m/44'/60'/1'/0/0".to_string());
        assert_eq!(config.derivation_path(), "m/44'/60'/1'/0/0");
    }

    #[test]
    fn test_rpc_override() {
        let config = SignerConfig::default().with_rpc_override(84532, "http://127.0.0.1:8545");
        let base = chain::lookup(84532).unwrap();
        let mainnet = chain::lookup(1).unwrap();

        assert_eq!(config.rpc_url_for(base).unwrap(), "http://127.0.0.1:8545");
        assert_eq!(config.rpc_url_for(mainnet).unwrap(), "https://cloudflare-eth.com");
    }

    #[test]
    fn test_validate_rejects_unsupported_chains() {
        let config = SignerConfig::default().with_default_chain(5);
        assert!(matches!(config.validate(), Err(Error::UnsupportedChain(5))));

        let config = SignerConfig::default().with_rpc_override(137, "http://localhost:8545");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides_skip_unsupported_chains() {
        let vars = vec![
            ("EIP155_RPC_URL_84532".to_string(), "http://127.0.0.1:8545".to_string()),
            ("EIP155_RPC_URL_137".to_string(), "https://polygon-rpc.com".to_string()),
            ("EIP155_RPC_URL_base".to_string(), "http://127.0.0.1:8546".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ];

        let config = SignerConfig {
            rpc_overrides: rpc_overrides_from_vars(vars.into_iter()),
            ..Default::default()
        };
        assert_eq!(config.rpc_overrides.len(), 1);
        assert_eq!(config.rpc_overrides[&84532], "http://127.0.0.1:8545");
        assert!(config.validate().is_ok());
    }
}
