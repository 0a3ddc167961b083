//! Error types for the eip155-wallet library

use thiserror::Error;

/// Custom error type for account signer operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Mnemonic error: {0}")]
    Mnemonic(String),

    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// The operation is deliberately not offered by this signer
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A wallet client or network provider is required but not bound
    #[error("Not connected: {0}")]
    NotConnected(String),

    /// The chain id is outside the supported allow-list
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(u64),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Broadcast error: {0}")]
    Broadcast(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for account signer operations
pub type Result<T> = std::result::Result<T, Error>;
