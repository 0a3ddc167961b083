//! Supported EVM networks
//!
//! The signer can only be bound to the chains listed here. Lookups are pure:
//! an unknown id yields [`Error::UnsupportedChain`] and nothing else changes.

use serde::Serialize;

use crate::error::{Error, Result};

/// Native currency metadata of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    /// Display name
    pub name: &'static str,
    /// Ticker symbol
    pub symbol: &'static str,
    /// Number of decimals
    pub decimals: u8,
}

/// Parameters identifying a target network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainDescriptor {
    /// EIP-155 chain id
    pub id: u64,
    /// Display name
    pub name: &'static str,
    /// Native currency
    pub native_currency: NativeCurrency,
    /// Public RPC endpoints, preferred first
    pub rpc_urls: &'static [&'static str],
    /// Block explorer base URL
    pub block_explorer: Option<&'static str>,
    /// Whether this is a test network
    pub testnet: bool,
    /// Whether the chain accepts EIP-1559 fee fields
    pub eip1559: bool,
}

impl ChainDescriptor {
    /// The preferred RPC endpoint
    pub fn default_rpc_url(&self) -> Option<&'static str> {
        self.rpc_urls.first().copied()
    }
}

const ETHER: NativeCurrency = NativeCurrency { name: "Ether", symbol: "ETH", decimals: 18 };
const SEPOLIA_ETHER: NativeCurrency = NativeCurrency { name: "Sepolia Ether", symbol: "ETH", decimals: 18 };

static CHAINS: [ChainDescriptor; 6] = [
    ChainDescriptor {
        id: 1,
        name: "Ethereum",
        native_currency: ETHER,
        rpc_urls: &["https://cloudflare-eth.com"],
        block_explorer: Some("https://etherscan.io"),
        testnet: false,
        eip1559: true,
    },
    ChainDescriptor {
        id: 97,
        name: "Binance Smart Chain Testnet",
        native_currency: NativeCurrency { name: "BNB", symbol: "tBNB", decimals: 18 },
        rpc_urls: &["https://data-seed-prebsc-1-s1.bnbchain.org:8545"],
        block_explorer: Some("https://testnet.bscscan.com"),
        testnet: true,
        eip1559: false,
    },
    ChainDescriptor {
        id: 420,
        name: "Optimism Goerli",
        native_currency: NativeCurrency { name: "Goerli Ether", symbol: "ETH", decimals: 18 },
        rpc_urls: &["https://goerli.optimism.io"],
        block_explorer: Some("https://goerli-optimism.etherscan.io"),
        testnet: true,
        eip1559: true,
    },
    ChainDescriptor {
        id: 84532,
        name: "Base Sepolia",
        native_currency: SEPOLIA_ETHER,
        rpc_urls: &["https://sepolia.base.org"],
        block_explorer: Some("https://sepolia.basescan.org"),
        testnet: true,
        eip1559: true,
    },
    ChainDescriptor {
        id: 534351,
        name: "Scroll Sepolia",
        native_currency: ETHER,
        rpc_urls: &["https://sepolia-rpc.scroll.io"],
        block_explorer: Some("https://sepolia.scrollscan.com"),
        testnet: true,
        eip1559: true,
    },
    ChainDescriptor {
        id: 11155111,
        name: "Sepolia",
        native_currency: SEPOLIA_ETHER,
        rpc_urls: &["https://rpc.sepolia.org"],
        block_explorer: Some("https://sepolia.etherscan.io"),
        testnet: true,
        eip1559: true,
    },
];

/// Chain id of Ethereum mainnet, the default selection
pub const MAINNET_CHAIN_ID: u64 = 1;

/// Look up the descriptor for a chain id
pub fn lookup(chain_id: u64) -> Result<&'static ChainDescriptor> {
    CHAINS
        .iter()
        .find(|chain| chain.id == chain_id)
        .ok_or(Error::UnsupportedChain(chain_id))
}

/// Whether the chain id is in the supported set
pub fn is_supported(chain_id: u64) -> bool {
    lookup(chain_id).is_ok()
}

/// All supported chain ids
pub fn supported_chain_ids() -> Vec<u64> {
    CHAINS.iter().map(|chain| chain.id).collect()
}

/// All supported chain descriptors
pub fn supported_chains() -> &'static [ChainDescriptor] {
    &CHAINS
}
