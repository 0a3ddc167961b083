//! EIP-155 Wallet - account signer for the demo wallet
//!
//! This library wraps one HD account derived from a BIP-39 mnemonic, binds it
//! to one of a fixed set of EVM chains and forwards message, typed-data and
//! transaction signing to the `ethers` wallet client.

pub mod error;
pub mod crypto;
pub mod chain;
pub mod config;
pub mod account;
pub mod transaction;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use account::{AccountSigner, SignerState};
pub use chain::ChainDescriptor;
pub use config::SignerConfig;
pub use transaction::{FeeData, JsonRpcNetwork, NetworkProvider, ProviderConfig, TransactionRequest};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
