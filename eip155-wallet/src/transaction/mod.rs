//! Transaction functionality
//!
//! This module provides the transaction request type accepted by the signer
//! and the network provider it reads chain and fee data from.

pub mod types;
pub mod provider;

pub use types::*;
pub use provider::*;
