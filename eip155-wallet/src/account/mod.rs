//! Account management functionality
//!
//! This module provides the HD account signer and the EIP-712 helpers it
//! uses to assemble typed-data requests.

mod signer;
pub mod typed_data;

pub use signer::*;
