//! Mnemonic handling
//!
//! Key derivation and signing are delegated to `ethers-signers`; this module
//! only generates and checks the BIP-39 phrases the signer is built from.

pub mod mnemonic;

pub use mnemonic::*;
